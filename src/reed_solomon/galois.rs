//! Galois Field GF(2^m) arithmetic for the Reed-Solomon codec
//!
//! The field is chosen at runtime: the symbol width `m` and the field generator
//! polynomial come from the caller's
//! [`RsParameters`](crate::reed_solomon::RsParameters). Elements are kept as
//! `u16`, so widths up to 16 bits are representable.
//!
//! Values are stored in two forms:
//! - polynomial ("symbol") form, the value that appears in data buffers
//! - index ("log") form, the exponent `i` such that `alpha^i == value`
//!
//! Zero has no logarithm; its index form is the sentinel [`GaloisField::a0`],
//! which equals `nn = 2^m - 1`.

use super::error::CodecError;

/// Widest symbol the `u16` element representation can carry
pub const MAX_SYMBOL_BITS: u32 = 16;

/// Precomputed log/antilog tables for one GF(2^m)
#[derive(Debug, Clone)]
pub struct GaloisField {
    symsize: u32,
    gfpoly: u32,
    nn: usize,
    /// index form -> polynomial form, `nn + 1` entries (`alpha_to[nn] == 0`)
    alpha_to: Vec<u16>,
    /// polynomial form -> index form, `nn + 1` entries (`index_of[0] == nn`)
    index_of: Vec<u16>,
}

impl GaloisField {
    /// Build the tables for GF(2^`symsize`) generated by `gfpoly`
    ///
    /// Fails when the width is outside `1..=16` or when `gfpoly` is not
    /// primitive (alpha does not cycle through every non-zero element).
    pub fn new(symsize: u32, gfpoly: u32) -> Result<Self, CodecError> {
        if symsize == 0 || symsize > MAX_SYMBOL_BITS {
            return Err(CodecError::UnsupportedSymbolSize { symsize });
        }

        let nn = (1usize << symsize) - 1;
        let mut gf = GaloisField {
            symsize,
            gfpoly,
            nn,
            alpha_to: vec![0; nn + 1],
            index_of: vec![0; nn + 1],
        };
        gf.build_tables()?;
        Ok(gf)
    }

    fn build_tables(&mut self) -> Result<(), CodecError> {
        let high_bit = 1u32 << self.symsize;
        let mut sr = 1u32;

        self.index_of[0] = self.nn as u16;
        self.alpha_to[self.nn] = 0;

        let not_primitive = CodecError::NonPrimitivePolynomial {
            gfpoly: self.gfpoly,
            symsize: self.symsize,
        };

        for i in 0..self.nn {
            self.index_of[sr as usize] = i as u16;
            self.alpha_to[i] = sr as u16;
            sr <<= 1;
            if sr & high_bit != 0 {
                sr ^= self.gfpoly;
            }
            sr &= self.nn as u32;
            // alpha must not return to 1 (or collapse to 0) before nn steps
            if i + 1 < self.nn && sr <= 1 {
                return Err(not_primitive);
            }
        }

        if sr != 1 {
            return Err(not_primitive);
        }
        Ok(())
    }

    /// Symbol width in bits
    #[inline]
    pub fn symsize(&self) -> u32 {
        self.symsize
    }

    /// Field generator polynomial the tables were built from
    #[inline]
    pub fn gfpoly(&self) -> u32 {
        self.gfpoly
    }

    /// Number of non-zero field elements, `2^m - 1`
    #[inline]
    pub fn nn(&self) -> usize {
        self.nn
    }

    /// Index-form sentinel for zero
    #[inline]
    pub fn a0(&self) -> usize {
        self.nn
    }

    /// Reduce an exponent modulo `nn`
    #[inline]
    pub fn modnn(&self, x: usize) -> usize {
        x % self.nn
    }

    /// Polynomial form of `alpha^index` (`index` already reduced, or the sentinel)
    #[inline]
    pub fn alpha_to(&self, index: usize) -> u16 {
        self.alpha_to[index]
    }

    /// Index form of `value`; the sentinel `nn` for zero
    #[inline]
    pub fn index_of(&self, value: u16) -> usize {
        self.index_of[value as usize] as usize
    }

    /// Add two elements - XOR in characteristic 2
    #[inline]
    pub fn add(&self, a: u16, b: u16) -> u16 {
        a ^ b
    }

    /// Multiply two elements in polynomial form
    #[inline]
    pub fn mul(&self, a: u16, b: u16) -> u16 {
        if a == 0 || b == 0 {
            return 0;
        }
        self.alpha_to[self.modnn(self.index_of(a) + self.index_of(b))]
    }

    /// Divide `a` by a non-zero `b`; `None` when `b` is zero
    #[inline]
    pub fn div(&self, a: u16, b: u16) -> Option<u16> {
        if b == 0 {
            return None;
        }
        if a == 0 {
            return Some(0);
        }
        Some(self.alpha_to[self.modnn(self.index_of(a) + self.nn - self.index_of(b))])
    }

    /// Raise `base` to `exponent`
    #[inline]
    pub fn pow(&self, base: u16, exponent: u32) -> u16 {
        if exponent == 0 {
            return 1;
        }
        if base == 0 {
            return 0;
        }
        let log_result = (self.index_of(base) as u64 * exponent as u64) % self.nn as u64;
        self.alpha_to[log_result as usize]
    }

    /// Multiplicative inverse of a non-zero element
    #[inline]
    pub fn inverse(&self, a: u16) -> Option<u16> {
        self.div(1, a)
    }
}

/// Greatest common divisor; zero if either argument is zero
pub fn gcd(mut a: u32, mut b: u32) -> u32 {
    if a != 0 && b != 0 {
        while a != 0 && b != 0 {
            if a > b {
                a %= b;
            } else {
                b %= a;
            }
        }
        a + b
    } else {
        0
    }
}
