//! Configuration for a service instance

use super::buffer::ParityLayout;
use crate::reed_solomon::RsParameters;

/// Construction-time options for an [`RsService`](super::RsService)
///
/// These are fixed for the life of the instance; the Reed-Solomon parameters
/// themselves are set at runtime through the endpoints.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Byte width of parity symbols in encoded blocks
    pub parity_layout: ParityLayout,
}

impl ServiceConfig {
    pub fn new(parity_layout: ParityLayout) -> Self {
        Self { parity_layout }
    }

    pub fn from_args(matches: &clap::ArgMatches) -> Self {
        let parity_layout = if matches.get_flag("wide-parity") {
            ParityLayout::Wide
        } else {
            ParityLayout::Packed
        };

        Self::new(parity_layout)
    }
}

/// Read the RS parameter flags, falling back to [`RsParameters::default`]
pub fn parameters_from_args(matches: &clap::ArgMatches) -> RsParameters {
    let defaults = RsParameters::default();
    let get = |name: &str, default: u32| matches.get_one::<u32>(name).copied().unwrap_or(default);

    RsParameters::new(
        get("symsize", defaults.symsize),
        get("gfpoly", defaults.gfpoly),
        get("fcr", defaults.fcr),
        get("prim", defaults.prim),
        get("nroots", defaults.nroots),
    )
}
