//! Reed-Solomon session service
//!
//! An [`RsService`] is one instance of the encode/decode pair: a codec built
//! from the active [`RsParameters`], a single shared buffer holding the block
//! in flight, and the session lock around both. Callers talk to it through
//! [`EncodeEndpoint`] and [`DecodeEndpoint`] handles:
//!
//! 1. configure with [`RsService::set_parameters`] (or [`Command::SetParameters`])
//! 2. write data to the encode endpoint, read back data ++ parity
//! 3. write that block to the decode endpoint, read back the corrected data
//!
//! Only one block exists at a time; a new encode discards the previous one.

mod buffer;
mod config;
mod endpoint;
mod error;
mod state;

pub use buffer::{BufferState, ParityLayout, SessionBuffer};
pub use config::{parameters_from_args, ServiceConfig};
pub use endpoint::{DecodeEndpoint, EncodeEndpoint};
pub use error::{Result, ServiceError};
pub use state::ReadCursor;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::reed_solomon::RsParameters;
use state::SessionState;

/// Control commands accepted by either endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Rebuild the codec from a new parameter set
    SetParameters(RsParameters),
}

struct Shared {
    config: ServiceConfig,
    state: Mutex<SessionState>,
}

/// One encode/decode service instance
///
/// Cloning yields another reference to the same instance.
#[derive(Clone)]
pub struct RsService {
    shared: Arc<Shared>,
}

impl RsService {
    /// Bring up an unconfigured service
    pub fn open(config: ServiceConfig) -> Self {
        debug!("Opening service with {:?}", config);
        let state = SessionState::new(config.parity_layout);
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(state),
            }),
        }
    }

    /// Release the codec and the buffer
    ///
    /// Handles still open afterwards see an unconfigured, empty service.
    pub fn close(self) {
        debug!("Closing service");
        self.lock().teardown();
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.shared.config
    }

    /// Acquire the session lock
    ///
    /// Every critical section leaves the state consistent before anything that
    /// can panic, so a poisoned lock is still safe to use.
    pub(crate) fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the active codec
    ///
    /// The previous codec is dropped before the new one is built. If building
    /// fails the service stays unconfigured until a later call succeeds.
    pub fn set_parameters(&self, params: RsParameters) -> Result<()> {
        self.lock().set_parameters(params)
    }

    /// Parameter set of the live codec, if any
    pub fn parameters(&self) -> Option<RsParameters> {
        self.lock().parameters()
    }

    pub fn control(&self, command: Command) -> Result<()> {
        match command {
            Command::SetParameters(params) => self.set_parameters(params),
        }
    }

    /// State of the shared buffer; `None` before the first encode
    pub fn buffer_state(&self) -> Option<BufferState> {
        self.lock().buffer().map(|buffer| buffer.state())
    }

    /// Length of the block the decode endpoint currently expects
    pub fn expected_block_len(&self) -> Option<usize> {
        self.lock().buffer().map(|buffer| buffer.len())
    }

    pub fn open_encoder(&self) -> EncodeEndpoint {
        EncodeEndpoint::new(self.clone())
    }

    pub fn open_decoder(&self) -> DecodeEndpoint {
        DecodeEndpoint::new(self.clone())
    }
}

impl Default for RsService {
    fn default() -> Self {
        Self::open(ServiceConfig::default())
    }
}
