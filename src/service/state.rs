//! Session state guarded by the session lock
//!
//! Holds the live codec, the active parameter set and the shared buffer.
//! Every method here runs with the lock held by the caller.

use log::{debug, error, info};

use super::buffer::{BufferState, ParityLayout, SessionBuffer};
use super::error::{Result, ServiceError};
use crate::reed_solomon::{CodecError, RsCodec, RsParameters};
use crate::transfer::{UserSink, UserSource};

/// Per-handle read position, tied to one buffer generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadCursor {
    generation: u64,
    offset: usize,
}

impl ReadCursor {
    /// Position at the start of the given generation's contents
    pub fn at_start(generation: u64) -> Self {
        Self {
            generation,
            offset: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Restart at zero if the buffer has been replaced since the last read
    fn sync(&mut self, generation: u64) -> usize {
        if self.generation != generation {
            *self = Self::at_start(generation);
        }
        self.offset
    }
}

pub(crate) struct SessionState {
    layout: ParityLayout,
    codec: Option<RsCodec>,
    params: Option<RsParameters>,
    buffer: Option<SessionBuffer>,
    generation: u64,
}

impl SessionState {
    pub(crate) fn new(layout: ParityLayout) -> Self {
        Self {
            layout,
            codec: None,
            params: None,
            buffer: None,
            generation: 0,
        }
    }

    pub(crate) fn parameters(&self) -> Option<RsParameters> {
        self.params
    }

    pub(crate) fn buffer(&self) -> Option<&SessionBuffer> {
        self.buffer.as_ref()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the codec; a failure leaves the service unconfigured
    pub(crate) fn set_parameters(&mut self, params: RsParameters) -> Result<()> {
        // The old instance goes first; there is no rollback to it
        self.codec = None;
        self.params = None;

        match RsCodec::new(params) {
            Ok(codec) => {
                info!("Codec initialized with new parameters ({})", params);
                self.codec = Some(codec);
                self.params = Some(params);
                Ok(())
            }
            Err(err) => {
                error!("Failed to initialize codec ({}): {}", params, err);
                Err(ServiceError::CodecInitFailed(err))
            }
        }
    }

    /// Replace the buffer with `source` plus freshly computed parity
    pub(crate) fn encode<S: UserSource + ?Sized>(&mut self, source: &S) -> Result<usize> {
        let codec = self.codec.as_ref().ok_or(ServiceError::NotConfigured)?;
        let len = source.len();

        if len > codec.max_data_len() {
            return Err(ServiceError::InvalidArgument(format!(
                "{} data bytes exceed the {} byte maximum for {} parity symbols",
                len,
                codec.max_data_len(),
                codec.nroots()
            )));
        }

        self.buffer = None;
        self.generation += 1;

        let mut buffer =
            SessionBuffer::allocate(len, codec.nroots(), self.layout, self.generation)?;
        source.copy_to(buffer.data_region_mut())?;
        // Lengths were checked above, so the codec cannot reject this block
        buffer
            .encode_with(codec)
            .map_err(|err| ServiceError::InvalidArgument(err.to_string()))?;

        info!(
            "Encoded {} bytes with {} parity symbols",
            len,
            codec.nroots()
        );
        self.buffer = Some(buffer);
        Ok(len)
    }

    /// Overwrite the buffer with a received block and correct it in place
    ///
    /// Returns the number of corrected symbols.
    pub(crate) fn decode<S: UserSource + ?Sized>(&mut self, source: &S) -> Result<usize> {
        let codec = self.codec.as_ref().ok_or(ServiceError::NotConfigured)?;
        let len = source.len();

        let buffer = self.buffer.as_mut().ok_or_else(|| {
            ServiceError::InvalidArgument("no encoded block to size the decode against".into())
        })?;

        let expected = buffer.data_len() + self.layout.parity_len(codec.nroots());
        if buffer.len() != expected {
            return Err(ServiceError::InvalidArgument(format!(
                "session buffer of {} bytes is stale for the current parameters (expected {})",
                buffer.len(),
                expected
            )));
        }
        if len != expected {
            return Err(ServiceError::InvalidArgument(format!(
                "decode write of {} bytes, expected {}",
                len, expected
            )));
        }

        self.generation += 1;
        if let Err(fault) = source.copy_to(buffer.bytes_mut()) {
            buffer.mark(BufferState::Rejected, self.generation);
            return Err(fault.into());
        }
        buffer.mark(BufferState::Encoded, self.generation);

        match buffer.correct_with(codec) {
            Ok(corrected) => {
                info!("Decoded data with {} corrections", corrected);
                Ok(corrected)
            }
            Err(err @ CodecError::Uncorrectable) => {
                error!("Decoding failed with error {}", err.code());
                Err(ServiceError::UncorrectableData(err))
            }
            Err(err) => {
                error!("Decoding rejected block: {}", err);
                Err(ServiceError::InvalidArgument(err.to_string()))
            }
        }
    }

    /// Copy from the whole buffer at the cursor
    pub(crate) fn read_encoded<S: UserSink + ?Sized>(
        &self,
        cursor: &mut ReadCursor,
        sink: &mut S,
    ) -> Result<usize> {
        let region: &[u8] = match &self.buffer {
            Some(buffer) if buffer.state() != BufferState::Rejected => buffer.bytes(),
            _ => &[],
        };
        read_region(region, self.generation, cursor, sink)
    }

    /// Copy from the data region at the cursor
    pub(crate) fn read_decoded<S: UserSink + ?Sized>(
        &self,
        cursor: &mut ReadCursor,
        sink: &mut S,
    ) -> Result<usize> {
        let region: &[u8] = match &self.buffer {
            Some(buffer) if buffer.state() != BufferState::Rejected => buffer.data_region(),
            _ => &[],
        };
        read_region(region, self.generation, cursor, sink)
    }

    /// Drop the codec and the buffer
    pub(crate) fn teardown(&mut self) {
        self.codec = None;
        self.params = None;
        self.buffer = None;
        self.generation += 1;
    }
}

fn read_region<S: UserSink + ?Sized>(
    region: &[u8],
    generation: u64,
    cursor: &mut ReadCursor,
    sink: &mut S,
) -> Result<usize> {
    let offset = cursor.sync(generation);
    if offset >= region.len() {
        return Ok(0);
    }

    let count = sink.len().min(region.len() - offset);
    sink.copy_from(&region[offset..offset + count])?;
    cursor.offset += count;

    debug!(
        "Read {} bytes at offset {} of {} (generation {})",
        count,
        offset,
        region.len(),
        generation
    );
    Ok(count)
}
