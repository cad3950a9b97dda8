use tracing_subscriber::EnvFilter;

use crate::configs::LoggingConfig;

/// Initialize the global tracing subscriber from config.
///
/// `RUST_LOG` wins over the configured level when set. Extra per-target
/// directives from `logging.filters` are appended to the base level,
/// e.g. level = "info", filters = "jukelink::player=debug".
pub fn init(config: &LoggingConfig) {
    let log_level = config.level.as_deref().unwrap_or("info");
    let filters = config.filters.as_deref().unwrap_or("");

    let filter_str = if filters.is_empty() {
        log_level.to_string()
    } else {
        format!("{log_level},{filters}")
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_str));

    // Ignore the error if a subscriber is already installed (tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}
