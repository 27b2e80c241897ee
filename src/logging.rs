//! Log subscriber installation for hosts.
//!
//! The library only emits `tracing` events. Hosts that have no subscriber of
//! their own can call [`init_logging`] once at startup.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::util::{Error, Result};

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "warn";

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins over `filter`; `filter` wins over [`DEFAULT_FILTER`].
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_logging(filter: Option<&str>) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(filter.unwrap_or(DEFAULT_FILTER))
            .map_err(|e| Error::Config(format!("bad log filter: {}", e)))?,
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true));
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::other(format!("logging already initialized: {}", e)))
}
