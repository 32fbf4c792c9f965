//! Reed-Solomon Error Correction Module
//!
//! This module provides the Galois-field codec engine the session service is
//! built on. Codes are defined at runtime by [`RsParameters`]; a validated
//! [`RsCodec`] computes parity for a data block and corrects a received
//! data + parity block in place.

pub mod codec;
pub mod error;
pub mod galois;
pub mod params;

pub use codec::{RsCodec, SYMBOL_BITS};
pub use error::CodecError;
pub use galois::{gcd, GaloisField};
pub use params::RsParameters;
