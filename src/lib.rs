//! Reed-Solomon encode/decode session service
//!
//! - [`reed_solomon`] - runtime-configurable GF(2^8) Reed-Solomon codec
//! - [`service`] - the session service: configuration, shared buffer, endpoints
//! - [`transfer`] - byte transfer across the caller boundary

pub mod args;
pub mod reed_solomon;
pub mod service;
pub mod transfer;

pub use args::parse_args;
pub use reed_solomon::{CodecError, RsCodec, RsParameters};
pub use service::{
    Command, DecodeEndpoint, EncodeEndpoint, ParityLayout, RsService, ServiceConfig, ServiceError,
};
pub use transfer::{TransferFault, UserSink, UserSource};
