//! Byte transfer across the caller/service boundary
//!
//! Endpoint writes pull bytes from a [`UserSource`] and reads push bytes into a
//! [`UserSink`]. Plain slices and vectors never fault; other implementations
//! (mapped regions, foreign buffers) report a [`TransferFault`] when the region
//! they describe cannot be accessed, and the service surfaces it as an I/O
//! fault without retrying.

use thiserror::Error;

/// A caller-supplied region could not be copied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Bad caller region: {len} bytes at offset {offset} not accessible")]
pub struct TransferFault {
    /// Offset into the region where the copy failed
    pub offset: usize,
    /// Number of bytes that were requested
    pub len: usize,
}

/// Region the service copies data out of
pub trait UserSource {
    /// Number of bytes the caller offers
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `dst.len()` bytes (always `self.len()`) into `dst`
    fn copy_to(&self, dst: &mut [u8]) -> Result<(), TransferFault>;
}

/// Region the service copies data into
pub trait UserSink {
    /// Number of bytes the caller can accept
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy all of `src` (at most `self.len()` bytes) to the start of the region
    fn copy_from(&mut self, src: &[u8]) -> Result<(), TransferFault>;
}

impl UserSource for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_to(&self, dst: &mut [u8]) -> Result<(), TransferFault> {
        if dst.len() != <[u8]>::len(self) {
            return Err(TransferFault {
                offset: 0,
                len: dst.len(),
            });
        }
        dst.copy_from_slice(self);
        Ok(())
    }
}

impl UserSource for Vec<u8> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn copy_to(&self, dst: &mut [u8]) -> Result<(), TransferFault> {
        self.as_slice().copy_to(dst)
    }
}

impl<const N: usize> UserSource for [u8; N] {
    fn len(&self) -> usize {
        N
    }

    fn copy_to(&self, dst: &mut [u8]) -> Result<(), TransferFault> {
        self.as_slice().copy_to(dst)
    }
}

impl UserSink for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_from(&mut self, src: &[u8]) -> Result<(), TransferFault> {
        if src.len() > <[u8]>::len(self) {
            return Err(TransferFault {
                offset: 0,
                len: src.len(),
            });
        }
        self[..src.len()].copy_from_slice(src);
        Ok(())
    }
}

impl<const N: usize> UserSink for [u8; N] {
    fn len(&self) -> usize {
        N
    }

    fn copy_from(&mut self, src: &[u8]) -> Result<(), TransferFault> {
        self.as_mut_slice().copy_from(src)
    }
}

impl UserSink for Vec<u8> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn copy_from(&mut self, src: &[u8]) -> Result<(), TransferFault> {
        self.as_mut_slice().copy_from(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_copies_exactly() {
        let src: &[u8] = b"abc";
        let mut dst = [0u8; 3];
        src.copy_to(&mut dst).unwrap();
        assert_eq!(&dst, b"abc");
    }

    #[test]
    fn test_slice_source_length_mismatch_faults() {
        let src: &[u8] = b"abc";
        let mut dst = [0u8; 2];
        assert_eq!(
            src.copy_to(&mut dst),
            Err(TransferFault { offset: 0, len: 2 })
        );
    }

    #[test]
    fn test_sink_accepts_shorter_source() {
        let mut sink = vec![0u8; 4];
        sink.copy_from(b"xy").unwrap();
        assert_eq!(sink, b"xy\0\0");
        assert!(sink.copy_from(b"too long").is_err());
    }

    #[test]
    fn test_array_impls() {
        let source = [1u8, 2, 3];
        assert_eq!(UserSource::len(&source), 3);
        let mut sink = [0u8; 5];
        sink.copy_from(&source).unwrap();
        assert_eq!(sink, [1, 2, 3, 0, 0]);
    }
}
