//! Tracing setup for the `ael` binary and embedders.
//!
//! `AEL_LOG` takes `EnvFilter` directives, e.g. `debug` or
//! `ael_config_core::resolver=trace,warn`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives
pub const LOG_ENV_VAR: &str = "AEL_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

/// Filter for `raw` directives; blank or invalid input falls back to `info`.
fn filter_from(raw: Option<&str>) -> EnvFilter {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install a stderr subscriber filtered by `AEL_LOG`.
///
/// Only the first call in a process installs anything; later calls, or a
/// subscriber installed by an embedder, leave the existing one in place.
pub fn init() {
    let filter = filter_from(std::env::var(LOG_ENV_VAR).ok().as_deref());
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        tracing::trace!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    fn hint(raw: Option<&str>) -> Option<LevelFilter> {
        filter_from(raw).max_level_hint()
    }

    #[test]
    fn test_default_filter_is_info() {
        assert_eq!(hint(None), Some(LevelFilter::INFO));
        assert_eq!(hint(Some("   ")), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_level_directive() {
        assert_eq!(hint(Some("debug")), Some(LevelFilter::DEBUG));
        assert_eq!(hint(Some(" warn ")), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_per_target_directive() {
        assert_eq!(
            hint(Some("ael_config_core::resolver=trace,warn")),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn test_invalid_directive_falls_back() {
        assert_eq!(hint(Some("ael=loud")), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
