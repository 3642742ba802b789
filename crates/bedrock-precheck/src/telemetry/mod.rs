//! Structured logging
//!
//! JSON lines on stdout, which Lambda forwards to the function's
//! CloudWatch log stream.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter for `level`, falling back to `info` on a bad directive
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|e| {
        eprintln!("Invalid log level {:?} ({}), using info", level, e);
        EnvFilter::new("info")
    })
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_tracing(level: &str) {
    let result = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_target(false),
        )
        .try_init();

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_accepts_directives() {
        assert!(EnvFilter::try_new("debug").is_ok());
        assert!(EnvFilter::try_new("bedrock_precheck=trace,warn").is_ok());
    }

    #[test]
    fn test_env_filter_fallback() {
        assert!(EnvFilter::try_new("bedrock_precheck=loud").is_err());
        assert_eq!(env_filter("bedrock_precheck=loud").to_string(), "info");
    }
}
