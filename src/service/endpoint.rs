//! Encode and decode endpoint handles
//!
//! Each handle behaves like an open file on one of the two endpoints: it has
//! its own read cursor, while the codec and the buffer behind it are shared
//! by every handle of the service.

use super::error::Result;
use super::state::ReadCursor;
use super::{Command, RsService};
use crate::transfer::{UserSink, UserSource};

/// Handle on the encode endpoint
///
/// Writes take raw data; reads return data followed by parity.
pub struct EncodeEndpoint {
    service: RsService,
    cursor: ReadCursor,
}

impl EncodeEndpoint {
    pub(super) fn new(service: RsService) -> Self {
        Self {
            service,
            cursor: ReadCursor::default(),
        }
    }

    /// Encode one data block, replacing whatever block the service held
    ///
    /// Returns the number of data bytes accepted.
    pub fn write<S: UserSource + ?Sized>(&mut self, source: &S) -> Result<usize> {
        let mut state = self.service.lock();
        let written = state.encode(source)?;
        self.cursor = ReadCursor::at_start(state.generation());
        Ok(written)
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<usize> {
        self.write(data)
    }

    /// Read the next part of data ++ parity into `sink`
    ///
    /// Returns zero once the block has been read in full, or if nothing has
    /// been encoded.
    pub fn read<S: UserSink + ?Sized>(&mut self, sink: &mut S) -> Result<usize> {
        let state = self.service.lock();
        state.read_encoded(&mut self.cursor, sink)
    }

    /// Read up to `max_len` bytes into a new vector
    pub fn read_vec(&mut self, max_len: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; max_len];
        let count = self.read(out.as_mut_slice())?;
        out.truncate(count);
        Ok(out)
    }

    /// Read everything left of the current block
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        read_all(|chunk| self.read(chunk))
    }

    pub fn control(&self, command: Command) -> Result<()> {
        self.service.control(command)
    }

    /// Offset of the next read within the current block
    pub fn position(&self) -> usize {
        self.cursor.offset()
    }
}

/// Handle on the decode endpoint
///
/// Writes take a full data ++ parity block of the size the last encode
/// produced; reads return the corrected data.
pub struct DecodeEndpoint {
    service: RsService,
    cursor: ReadCursor,
    last_corrections: Option<usize>,
}

impl DecodeEndpoint {
    pub(super) fn new(service: RsService) -> Self {
        Self {
            service,
            cursor: ReadCursor::default(),
            last_corrections: None,
        }
    }

    /// Correct one received block in place
    ///
    /// Returns the number of block bytes accepted. The number of corrected
    /// symbols is kept for [`last_corrections`](Self::last_corrections).
    pub fn write<S: UserSource + ?Sized>(&mut self, source: &S) -> Result<usize> {
        let mut state = self.service.lock();
        self.last_corrections = None;
        let corrected = state.decode(source)?;
        self.cursor = ReadCursor::at_start(state.generation());
        self.last_corrections = Some(corrected);
        Ok(source.len())
    }

    pub fn write_bytes(&mut self, block: &[u8]) -> Result<usize> {
        self.write(block)
    }

    /// Read the next part of the corrected data into `sink`
    pub fn read<S: UserSink + ?Sized>(&mut self, sink: &mut S) -> Result<usize> {
        let state = self.service.lock();
        state.read_decoded(&mut self.cursor, sink)
    }

    pub fn read_vec(&mut self, max_len: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; max_len];
        let count = self.read(out.as_mut_slice())?;
        out.truncate(count);
        Ok(out)
    }

    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        read_all(|chunk| self.read(chunk))
    }

    pub fn control(&self, command: Command) -> Result<()> {
        self.service.control(command)
    }

    pub fn position(&self) -> usize {
        self.cursor.offset()
    }

    /// Symbols corrected by this handle's last successful decode
    pub fn last_corrections(&self) -> Option<usize> {
        self.last_corrections
    }
}

const READ_CHUNK: usize = 256;

fn read_all<F>(mut read: F) -> Result<Vec<u8>>
where
    F: FnMut(&mut [u8]) -> Result<usize>,
{
    let mut out = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let count = read(&mut chunk)?;
        if count == 0 {
            return Ok(out);
        }
        out.extend_from_slice(&chunk[..count]);
    }
}
