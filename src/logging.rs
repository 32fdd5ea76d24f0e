//! Structured logging to stderr.
//!
//! Stdout belongs to the worker once it takes over, so every event goes to
//! stderr without ANSI styling (container log collectors store it verbatim).

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Filter used when the configured directive does not parse.
const FALLBACK_DIRECTIVE: &str = "warn";

/// Build the event filter from a directive such as `info` or
/// `bot_entrypoint=debug,warn`.
pub fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive.trim()).unwrap_or_else(|_| EnvFilter::new(FALLBACK_DIRECTIVE))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(config: &LoggingConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.level))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_directive_is_kept() {
        assert_eq!(
            env_filter(" bot_entrypoint=debug ").to_string(),
            EnvFilter::new("bot_entrypoint=debug").to_string()
        );
    }

    #[test]
    fn invalid_directive_falls_back() {
        assert!(EnvFilter::try_new("bot_entrypoint=loud").is_err());
        assert_eq!(
            env_filter("bot_entrypoint=loud").to_string(),
            EnvFilter::new(FALLBACK_DIRECTIVE).to_string()
        );
    }

    #[test]
    fn init_is_idempotent() {
        let config = LoggingConfig::default();
        init(&config);
        init(&config);
    }
}
