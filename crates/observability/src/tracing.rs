//! Log subscriber setup for storefront processes and tests.

use std::env;

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Selects the log line format: `json` (default) or `compact`.
pub const LOG_FORMAT_ENV: &str = "STOREFRONT_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable single-line output for local runs.
    Compact,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::parse(env::var(LOG_FORMAT_ENV).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("compact") => LogFormat::Compact,
            _ => LogFormat::Json,
        }
    }
}

/// Install the global subscriber using [`LogFormat::from_env`].
///
/// Later calls are no-ops.
pub fn init() {
    init_with(LogFormat::from_env());
}

pub fn init_with(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let _ = match format {
        LogFormat::Json => builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
}
