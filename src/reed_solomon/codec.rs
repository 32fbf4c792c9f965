//! Reed-Solomon codec over 8-bit symbols
//!
//! A shortened RS(nn, nn - nroots) code with runtime parameters. Encoding
//! produces `nroots` parity symbols for a data block; decoding locates and
//! fixes up to `nroots / 2` symbol errors anywhere in data or parity, in place.
//!
//! Data symbols are bytes. Parity symbols are `u16`, the engine's in-memory
//! symbol representation, so the parity of an 8-bit code always fits the low
//! byte.
//!
//! Decoding uses Berlekamp-Massey to find the error locator, a Chien search for
//! its roots, and Forney's formula for the error values. No erasure positions
//! are accepted.

use smallvec::{smallvec, SmallVec};

use super::error::{CodecError, Result};
use super::galois::{gcd, GaloisField};
use super::params::RsParameters;

/// Symbol width the byte-oriented codec accepts
pub const SYMBOL_BITS: u32 = 8;

/// Per-decode scratch; inline for the common parity counts
type IndexScratch = SmallVec<[usize; 64]>;
type SymbolScratch = SmallVec<[u16; 64]>;

/// A configured Reed-Solomon encoder/decoder
#[derive(Debug, Clone)]
pub struct RsCodec {
    params: RsParameters,
    field: GaloisField,
    /// Code generator polynomial in index form, ascending powers, `nroots + 1` terms
    genpoly: Vec<usize>,
    /// `prim`-th root of unity used to step the Chien search
    iprim: usize,
}

impl RsCodec {
    /// Build a codec, validating every parameter against the field
    pub fn new(params: RsParameters) -> Result<Self> {
        if params.symsize != SYMBOL_BITS {
            return Err(CodecError::UnsupportedSymbolSize {
                symsize: params.symsize,
            });
        }

        let field = GaloisField::new(params.symsize, params.gfpoly)?;
        let nn = field.nn();
        let field_size = (nn + 1) as u32;

        if params.fcr >= field_size {
            return Err(CodecError::InvalidFirstRoot {
                fcr: params.fcr,
                limit: field_size,
            });
        }
        // prim must be invertible modulo nn or the Chien stride never closes
        if params.prim == 0 || params.prim >= field_size || gcd(params.prim, nn as u32) != 1 {
            return Err(CodecError::InvalidPrimitiveElement {
                prim: params.prim,
                nn: nn as u32,
            });
        }
        if params.nroots == 0 || params.nroots as usize >= nn {
            return Err(CodecError::InvalidParityCount {
                nroots: params.nroots,
                limit: nn as u32,
            });
        }

        let prim = params.prim as usize;
        let mut iprim = 1usize;
        while iprim % prim != 0 {
            iprim += nn;
        }
        iprim /= prim;

        let genpoly = build_generator(&field, &params);

        Ok(Self {
            params,
            field,
            genpoly,
            iprim,
        })
    }

    /// Parameters this codec was built from
    pub fn parameters(&self) -> &RsParameters {
        &self.params
    }

    /// Underlying field tables
    pub fn field(&self) -> &GaloisField {
        &self.field
    }

    /// Number of parity symbols per block
    pub fn nroots(&self) -> usize {
        self.params.nroots as usize
    }

    /// Longest data block one codeword can carry
    pub fn max_data_len(&self) -> usize {
        self.field.nn() - self.nroots()
    }

    fn check_lengths(&self, data_len: usize, parity_len: usize) -> Result<()> {
        if parity_len != self.nroots() {
            return Err(CodecError::ParityLength {
                got: parity_len,
                expected: self.nroots(),
            });
        }
        if data_len > self.max_data_len() {
            return Err(CodecError::BlockLength {
                len: data_len,
                max: self.max_data_len(),
            });
        }
        Ok(())
    }

    /// Accumulate parity for `data` into `parity`
    ///
    /// `parity` must hold exactly `nroots` symbols and be zeroed for a fresh
    /// block; existing contents act as the running remainder, so one block may
    /// be encoded in several calls.
    pub fn encode(&self, data: &[u8], parity: &mut [u16]) -> Result<()> {
        self.check_lengths(data.len(), parity.len())?;

        let gf = &self.field;
        let nroots = self.nroots();
        let a0 = gf.a0();
        let mask = gf.nn() as u16;

        for &byte in data {
            let feedback = gf.index_of((byte as u16 ^ parity[0]) & mask);
            if feedback != a0 {
                for j in 1..nroots {
                    parity[j] ^= gf.alpha_to(gf.modnn(feedback + self.genpoly[nroots - j]));
                }
            }
            parity.copy_within(1.., 0);
            parity[nroots - 1] = if feedback != a0 {
                gf.alpha_to(gf.modnn(feedback + self.genpoly[0]))
            } else {
                0
            };
        }

        Ok(())
    }

    /// Correct `data` and `parity` in place
    ///
    /// Returns the number of symbols corrected (zero for a clean block). A
    /// parity symbol with bits set above the symbol width counts as corrected
    /// once those bits are cleared.
    /// Fails with [`CodecError::Uncorrectable`] when the errors exceed what the
    /// parity can locate; the buffers are then left as they were passed in,
    /// apart from parity symbols being masked to the symbol width.
    pub fn decode(&self, data: &mut [u8], parity: &mut [u16]) -> Result<usize> {
        self.check_lengths(data.len(), parity.len())?;

        let gf = &self.field;
        let nn = gf.nn();
        let a0 = gf.a0();
        let nroots = self.nroots();
        let fcr = self.params.fcr as usize;
        let prim = self.params.prim as usize;
        let pad = nn - nroots - data.len();
        let mask = nn as u16;

        let mut widened: IndexScratch = SmallVec::new();
        for (i, p) in parity.iter_mut().enumerate() {
            if *p & !mask != 0 {
                widened.push(i);
                *p &= mask;
            }
        }

        // Syndromes: the received word evaluated at each generator root
        let mut syndromes: SymbolScratch = smallvec![0; nroots];
        let received = data.iter().map(|&b| b as u16).chain(parity.iter().copied());
        for symbol in received {
            for (i, s) in syndromes.iter_mut().enumerate() {
                *s = if *s == 0 {
                    symbol
                } else {
                    symbol ^ gf.alpha_to(gf.modnn(gf.index_of(*s) + (fcr + i) * prim))
                };
            }
        }

        if syndromes.iter().all(|&s| s == 0) {
            return Ok(widened.len());
        }
        let s: IndexScratch = syndromes.iter().map(|&v| gf.index_of(v)).collect();

        // Berlekamp-Massey: lambda in polynomial form, b in index form
        let mut lambda: SymbolScratch = smallvec![0; nroots + 1];
        lambda[0] = 1;
        let mut b: IndexScratch = lambda.iter().map(|&v| gf.index_of(v)).collect();
        let mut t: SymbolScratch = smallvec![0; nroots + 1];
        let mut el = 0usize;

        for r in 1..=nroots {
            let mut discr = 0u16;
            for i in 0..r {
                if lambda[i] != 0 && s[r - i - 1] != a0 {
                    discr ^= gf.alpha_to(gf.modnn(gf.index_of(lambda[i]) + s[r - i - 1]));
                }
            }
            let discr_r = gf.index_of(discr);

            if discr_r == a0 {
                // B(x) <- x * B(x)
                b.copy_within(0..nroots, 1);
                b[0] = a0;
                continue;
            }

            t[0] = lambda[0];
            for i in 0..nroots {
                t[i + 1] = if b[i] != a0 {
                    lambda[i + 1] ^ gf.alpha_to(gf.modnn(discr_r + b[i]))
                } else {
                    lambda[i + 1]
                };
            }
            if 2 * el < r {
                el = r - el;
                for i in 0..=nroots {
                    b[i] = if lambda[i] == 0 {
                        a0
                    } else {
                        gf.modnn(gf.index_of(lambda[i]) + nn - discr_r)
                    };
                }
            } else {
                b.copy_within(0..nroots, 1);
                b[0] = a0;
            }
            lambda.copy_from_slice(&t);
        }

        let lambda: IndexScratch = lambda.iter().map(|&v| gf.index_of(v)).collect();
        let deg_lambda = lambda.iter().rposition(|&l| l != a0).unwrap_or(0);
        // A locator shorter than the register length cannot describe the errors
        if deg_lambda == 0 || deg_lambda != el {
            return Err(CodecError::Uncorrectable);
        }

        // Chien search: roots of lambda give error locations
        let mut reg = lambda.clone();
        let mut roots: IndexScratch = SmallVec::new();
        let mut locations: IndexScratch = SmallVec::new();
        let mut k = self.iprim - 1;
        for i in 1..=nn {
            let mut q = 1u16;
            for j in (1..=deg_lambda).rev() {
                if reg[j] != a0 {
                    reg[j] = gf.modnn(reg[j] + j);
                    q ^= gf.alpha_to(reg[j]);
                }
            }
            if q == 0 {
                roots.push(i);
                locations.push(k);
                if roots.len() == deg_lambda {
                    break;
                }
            }
            k = gf.modnn(k + self.iprim);
        }
        if roots.len() != deg_lambda {
            return Err(CodecError::Uncorrectable);
        }

        // Error evaluator omega(x) = S(x) * lambda(x) mod x^nroots, index form
        let deg_omega = deg_lambda - 1;
        let omega: IndexScratch = (0..=deg_omega)
            .map(|i| {
                let mut tmp = 0u16;
                for j in 0..=i {
                    if s[i - j] != a0 && lambda[j] != a0 {
                        tmp ^= gf.alpha_to(gf.modnn(s[i - j] + lambda[j]));
                    }
                }
                gf.index_of(tmp)
            })
            .collect();

        // Forney: error value = X^(1-fcr) * omega(1/X) / lambda'(1/X)
        let mut corrections: SmallVec<[(usize, u16); 32]> = SmallVec::new();
        for (&root, &location) in roots.iter().zip(locations.iter()) {
            let mut num1 = 0u16;
            for i in (0..=deg_omega).rev() {
                if omega[i] != a0 {
                    num1 ^= gf.alpha_to(gf.modnn(omega[i] + i * root));
                }
            }
            // Every located error has a non-zero magnitude
            if num1 == 0 {
                return Err(CodecError::Uncorrectable);
            }
            let num2 = gf.alpha_to(gf.modnn(root * (fcr + nn - 1)));

            // Odd terms of lambda form its formal derivative
            let mut den = 0u16;
            let top = deg_lambda.min(nroots - 1) & !1;
            for i in (0..=top).rev().step_by(2) {
                if lambda[i + 1] != a0 {
                    den ^= gf.alpha_to(gf.modnn(lambda[i + 1] + i * root));
                }
            }
            if den == 0 {
                return Err(CodecError::Uncorrectable);
            }

            // A root inside the virtual zero padding means a miscorrection
            if location < pad {
                return Err(CodecError::Uncorrectable);
            }

            let value = gf.alpha_to(gf.modnn(
                gf.index_of(num1) + gf.index_of(num2) + nn - gf.index_of(den),
            ));
            corrections.push((location - pad, value));
        }

        let data_len = data.len();
        for &(position, value) in &corrections {
            if position < data_len {
                data[position] ^= value as u8;
            } else {
                parity[position - data_len] ^= value;
            }
        }

        let masked_only = widened
            .iter()
            .filter(|&&i| !corrections.iter().any(|&(pos, _)| pos == data_len + i))
            .count();
        Ok(corrections.len() + masked_only)
    }
}

/// Expand the code generator polynomial prod(x - alpha^((fcr + i) * prim))
fn build_generator(field: &GaloisField, params: &RsParameters) -> Vec<usize> {
    let nroots = params.nroots as usize;
    let prim = params.prim as usize;
    let mut genpoly = vec![0u16; nroots + 1];
    genpoly[0] = 1;

    let mut root = params.fcr as usize * prim;
    for i in 0..nroots {
        genpoly[i + 1] = 1;
        for j in (1..=i).rev() {
            genpoly[j] = if genpoly[j] != 0 {
                genpoly[j - 1] ^ field.alpha_to(field.modnn(field.index_of(genpoly[j]) + root))
            } else {
                genpoly[j - 1]
            };
        }
        genpoly[0] = field.alpha_to(field.modnn(field.index_of(genpoly[0]) + root));
        root += prim;
    }

    genpoly.iter().map(|&g| field.index_of(g)).collect()
}
