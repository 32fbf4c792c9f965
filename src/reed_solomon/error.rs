//! Error types for the Reed-Solomon codec engine

use thiserror::Error;

/// Errors reported by [`RsCodec`](super::RsCodec) construction, encoding and decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Symbol width outside what the codec supports
    #[error("Unsupported symbol size {symsize} bits")]
    UnsupportedSymbolSize { symsize: u32 },

    /// Field generator polynomial does not generate the whole multiplicative group
    #[error("Polynomial {gfpoly:#x} is not primitive for GF(2^{symsize})")]
    NonPrimitivePolynomial { gfpoly: u32, symsize: u32 },

    /// First consecutive root is not a field index
    #[error("First consecutive root {fcr} out of range (must be < {limit})")]
    InvalidFirstRoot { fcr: u32, limit: u32 },

    /// Primitive element is zero, out of range, or shares a factor with 2^m - 1
    #[error("Primitive element {prim} invalid for a field of {nn} non-zero elements")]
    InvalidPrimitiveElement { prim: u32, nn: u32 },

    /// Parity symbol count is zero or does not leave room for data
    #[error("Parity symbol count {nroots} invalid (must be 1..{limit})")]
    InvalidParityCount { nroots: u32, limit: u32 },

    /// Block does not fit the code length, or a region has the wrong size
    #[error("Block of {len} data symbols does not fit (maximum {max})")]
    BlockLength { len: usize, max: usize },

    /// Parity region length differs from the configured parity count
    #[error("Parity region holds {got} symbols, codec expects {expected}")]
    ParityLength { got: usize, expected: usize },

    /// More symbol errors than the parity can locate and fix
    #[error("Uncorrectable block: errors exceed correction capability")]
    Uncorrectable,
}

impl CodecError {
    /// Negative errno-style code, as a C caller of the engine would see it
    pub fn code(&self) -> i32 {
        match self {
            CodecError::UnsupportedSymbolSize { .. }
            | CodecError::NonPrimitivePolynomial { .. }
            | CodecError::InvalidFirstRoot { .. }
            | CodecError::InvalidPrimitiveElement { .. }
            | CodecError::InvalidParityCount { .. }
            | CodecError::ParityLength { .. } => -libc::EINVAL,
            CodecError::BlockLength { .. } => -libc::ERANGE,
            CodecError::Uncorrectable => -libc::EBADMSG,
        }
    }
}

/// Type alias for Result with CodecError
pub type Result<T> = std::result::Result<T, CodecError>;
