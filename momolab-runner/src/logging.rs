//! Structured logging initialization.

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable selecting the output format (`json` or anything else).
pub const LOG_FORMAT_ENV: &str = "MOMOLAB_LOG_FORMAT";

const DEFAULT_FILTER: &str = "warn,momolab_core=info,momolab_runner=info,momolab=info";

#[derive(Debug, Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct LoggingError(String);

/// Initialize the global subscriber, writing to stderr.
///
/// `RUST_LOG` overrides the default filter. `MOMOLAB_LOG_FORMAT=json` switches
/// to one JSON object per line; otherwise output is compact text.
pub fn init_logging() -> Result<(), LoggingError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let result = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| LoggingError(e.to_string()))
}
