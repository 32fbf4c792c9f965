//! The shared encode/decode session buffer
//!
//! One owned allocation holds a data region followed by a parity region.
//! The regions are handed out as disjoint slices; parity symbols are converted
//! between their wire bytes and the codec's `u16` symbols according to the
//! service's [`ParityLayout`].

use smallvec::SmallVec;

use super::error::{Result, ServiceError};
use crate::reed_solomon::{CodecError, RsCodec};

/// Byte width of each parity symbol in the session buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParityLayout {
    /// One byte per symbol; blocks are `data_len + nroots` bytes
    #[default]
    Packed,
    /// One native-endian `u16` per symbol, the engine's in-memory form;
    /// blocks are `data_len + 2 * nroots` bytes
    Wide,
}

impl ParityLayout {
    pub fn bytes_per_symbol(self) -> usize {
        match self {
            ParityLayout::Packed => 1,
            ParityLayout::Wide => std::mem::size_of::<u16>(),
        }
    }

    /// Parity region length in bytes for `nroots` symbols
    pub fn parity_len(self, nroots: usize) -> usize {
        nroots * self.bytes_per_symbol()
    }

    fn load(self, region: &[u8], symbols: &mut [u16]) {
        match self {
            ParityLayout::Packed => {
                for (symbol, &byte) in symbols.iter_mut().zip(region) {
                    *symbol = byte as u16;
                }
            }
            ParityLayout::Wide => {
                for (symbol, unit) in symbols.iter_mut().zip(region.chunks_exact(2)) {
                    *symbol = bytemuck::pod_read_unaligned(unit);
                }
            }
        }
    }

    fn store(self, symbols: &[u16], region: &mut [u8]) {
        match self {
            ParityLayout::Packed => {
                for (byte, &symbol) in region.iter_mut().zip(symbols) {
                    *byte = symbol as u8;
                }
            }
            ParityLayout::Wide => {
                for (unit, symbol) in region.chunks_exact_mut(2).zip(symbols) {
                    unit.copy_from_slice(bytemuck::bytes_of(symbol));
                }
            }
        }
    }
}

/// What the buffer currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// Data plus freshly computed parity
    Encoded,
    /// A received block, corrected in place
    Decoded,
    /// Contents untrustworthy after a failed decode or a faulted copy
    Rejected,
}

type ParityScratch = SmallVec<[u16; 64]>;

/// Data region followed by parity region in one allocation
#[derive(Debug)]
pub struct SessionBuffer {
    bytes: Vec<u8>,
    data_len: usize,
    layout: ParityLayout,
    state: BufferState,
    generation: u64,
}

impl SessionBuffer {
    /// Allocate a zeroed buffer sized for `data_len` bytes plus `nroots` parity symbols
    pub fn allocate(
        data_len: usize,
        nroots: usize,
        layout: ParityLayout,
        generation: u64,
    ) -> Result<Self> {
        let requested = data_len
            .checked_add(layout.parity_len(nroots))
            .ok_or(ServiceError::OutOfMemory {
                requested: usize::MAX,
            })?;

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(requested)
            .map_err(|_| ServiceError::OutOfMemory { requested })?;
        bytes.resize(requested, 0);

        Ok(Self {
            bytes,
            data_len,
            layout,
            state: BufferState::Encoded,
            generation,
        })
    }

    /// Total length, data plus parity
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length of the data region
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    pub fn layout(&self) -> ParityLayout {
        self.layout
    }

    pub fn state(&self) -> BufferState {
        self.state
    }

    /// Content version; bumped whenever the bytes are replaced
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of parity symbols the parity region holds
    pub fn parity_symbols(&self) -> usize {
        (self.bytes.len() - self.data_len) / self.layout.bytes_per_symbol()
    }

    /// Whole buffer, data followed by parity
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn data_region(&self) -> &[u8] {
        &self.bytes[..self.data_len]
    }

    pub fn data_region_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[..self.data_len]
    }

    pub fn parity_region(&self) -> &[u8] {
        &self.bytes[self.data_len..]
    }

    /// Both regions at once, as disjoint mutable views
    pub fn regions_mut(&mut self) -> (&mut [u8], &mut [u8]) {
        self.bytes.split_at_mut(self.data_len)
    }

    /// Replace contents with a new generation in the given state
    pub(crate) fn mark(&mut self, state: BufferState, generation: u64) {
        self.state = state;
        self.generation = generation;
    }

    /// Compute parity over the data region into a zeroed parity region
    pub fn encode_with(&mut self, codec: &RsCodec) -> std::result::Result<(), CodecError> {
        let layout = self.layout;
        let (data, parity_bytes) = self.regions_mut();
        let mut parity: ParityScratch = SmallVec::from_elem(0, codec.nroots());
        codec.encode(data, &mut parity)?;
        layout.store(&parity, parity_bytes);
        self.state = BufferState::Encoded;
        Ok(())
    }

    /// Correct the block in place, returning the number of symbols fixed
    ///
    /// On failure the buffer is left `Rejected`.
    pub fn correct_with(&mut self, codec: &RsCodec) -> std::result::Result<usize, CodecError> {
        let layout = self.layout;
        let mut parity: ParityScratch = SmallVec::from_elem(0, self.parity_symbols());
        let (data, parity_bytes) = self.regions_mut();
        layout.load(parity_bytes, &mut parity);

        match codec.decode(data, &mut parity) {
            Ok(corrected) => {
                layout.store(&parity, parity_bytes);
                self.state = BufferState::Decoded;
                Ok(corrected)
            }
            Err(err) => {
                self.state = BufferState::Rejected;
                Err(err)
            }
        }
    }
}
