//! Algebraic parameter set for a Reed-Solomon code

use std::fmt;

/// Parameters that define one Reed-Solomon code instance
///
/// Encoder and decoder must agree on every field. Changing any of them
/// requires building a new [`RsCodec`](super::RsCodec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RsParameters {
    /// Bits per symbol (the field is GF(2^symsize))
    pub symsize: u32,
    /// Field generator polynomial, including the x^symsize term
    pub gfpoly: u32,
    /// First consecutive root of the code generator polynomial, in index form
    pub fcr: u32,
    /// Primitive element used to step between generator roots, in index form
    pub prim: u32,
    /// Number of parity symbols (generator roots)
    pub nroots: u32,
}

impl RsParameters {
    pub fn new(symsize: u32, gfpoly: u32, fcr: u32, prim: u32, nroots: u32) -> Self {
        Self {
            symsize,
            gfpoly,
            fcr,
            prim,
            nroots,
        }
    }

    /// Number of symbol errors the code can correct, `floor(nroots / 2)`
    pub fn correction_capacity(&self) -> usize {
        self.nroots as usize / 2
    }
}

/// 8-bit symbols over x^8 + x^4 + x^3 + x^2 + 1 with 32 parity symbols
impl Default for RsParameters {
    fn default() -> Self {
        Self::new(8, 0x11D, 0, 1, 32)
    }
}

impl fmt::Display for RsParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "symsize={} gfpoly={:#x} fcr={} prim={} nroots={}",
            self.symsize, self.gfpoly, self.fcr, self.prim, self.nroots
        )
    }
}
