use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::error::RelayError;

/// Installs the global subscriber. `RUST_LOG` is honoured unless `verbose`
/// forces debug output.
///
/// Meant for the host binary; the libraries only emit events.
pub fn init_logging(verbose: bool) -> Result<(), RelayError> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(verbose).with_level(true))
        .try_init()?;
    Ok(())
}
