//! Logging bootstrap for NewEngine host binaries.

use newengine_bridge::LogConfig;

/// Installs `env_logger` with the configured filter. `RUST_LOG` directives are applied on top.
///
/// Returns false when a logger was already installed (repeated calls are harmless).
pub fn init(config: &LogConfig) -> bool {
    let mut builder = env_logger::Builder::new();
    builder
        .parse_filters(&config.filter)
        .parse_default_env()
        .format_timestamp_millis()
        .format_target(true);

    match builder.try_init() {
        Ok(()) => {
            log::debug!(target: "newengine_modules_logging", "logger up, filter={}", config.filter);
            true
        }
        Err(_) => false,
    }
}
