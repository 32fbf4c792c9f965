//! Error types for session service operations

use thiserror::Error;

use crate::reed_solomon::CodecError;
use crate::transfer::TransferFault;

/// Errors returned by configuration and endpoint operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// No codec instance is live; configure the service and retry
    #[error("Reed-Solomon parameters not configured")]
    NotConfigured,

    /// The codec engine rejected the parameter set; the service is now unconfigured
    #[error("Codec initialization failed (code {code}): {0}", code = .0.code())]
    CodecInitFailed(#[source] CodecError),

    /// Size or state mismatch; re-encode or resynchronize before retrying
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The block holds more errors than the parity can correct
    #[error("Uncorrectable data: {0}")]
    UncorrectableData(#[source] CodecError),

    /// The session buffer could not be allocated
    #[error("Out of memory allocating {requested} byte session buffer")]
    OutOfMemory { requested: usize },

    /// A caller-supplied region could not be copied
    #[error("I/O fault: {0}")]
    IoFault(#[from] TransferFault),
}

impl ServiceError {
    /// Negative errno a character-device boundary would report for this error
    pub fn errno(&self) -> i32 {
        match self {
            ServiceError::NotConfigured => -libc::EAGAIN,
            ServiceError::CodecInitFailed(err) => err.code(),
            ServiceError::InvalidArgument(_) => -libc::EINVAL,
            ServiceError::UncorrectableData(_) => -libc::EIO,
            ServiceError::OutOfMemory { .. } => -libc::ENOMEM,
            ServiceError::IoFault(_) => -libc::EFAULT,
        }
    }

    /// Whether the same call may succeed later without the caller changing its input
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::NotConfigured)
    }
}

/// Type alias for Result with ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;
