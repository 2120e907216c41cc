use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("Logging already initialised: {0}")]
    AlreadyInitialised(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs a global fmt subscriber. The library itself only emits
/// `tracing` events; hosts that already own a subscriber skip this.
///
/// `directives` uses `EnvFilter` syntax, e.g. `"garden_tracker_lib=debug"`.
/// An empty string falls back to `RUST_LOG`, then to `warn`.
pub fn init_logging(directives: &str) -> Result<(), LoggingError> {
    let filter = if directives.trim().is_empty() {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    } else {
        tracing_subscriber::EnvFilter::try_new(directives)?
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_names(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_directives() {
        assert!(matches!(
            init_logging("garden_tracker_lib=loud"),
            Err(LoggingError::Filter(_))
        ));
    }
}
