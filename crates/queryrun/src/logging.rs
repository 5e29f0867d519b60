//! Subscriber setup for binaries and tests that want to see client events.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::Error;
use crate::error::Result;

/// Installs a global fmt subscriber.
///
/// `RUST_LOG` wins over `default_filter` when it is set. Fails if a global
/// subscriber is already installed.
pub fn init(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| Error::Config(format!("log filter {:?}: {}", default_filter, e)))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()
        .map_err(|e| Error::Config(e.to_string()))
}
