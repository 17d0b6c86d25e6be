//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// How chatty the process should be about intermediate pipeline steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Log every stage (generated queries, timings, fallbacks)
    #[default]
    Verbose,
    /// Only errors
    Quiet,
}

impl Verbosity {
    /// Default filter directive for this verbosity
    pub fn directive(self) -> &'static str {
        match self {
            Self::Verbose => "info",
            Self::Quiet => "error",
        }
    }
}

/// Initialize tracing subscriber with default configuration
///
/// Honors `RUST_LOG` when set, otherwise logs at `info`.
pub fn init_tracing() {
    init_tracing_with_level(Verbosity::Verbose);
}

/// Initialize tracing with an explicit verbosity.
///
/// `RUST_LOG` still wins when it is set. Calling this twice is a no-op.
pub fn init_tracing_with_level(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();
}
