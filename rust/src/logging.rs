//! Logging macros for the engine with verbosity level control.
//!
//! The macros emit `tracing` events and cost a single comparison when the
//! configured verbosity is below their level. Levels:
//! - 0: SILENT (only errors)
//! - 1: CHANGES (task dates fixed, deferrals applied) -> `info`
//! - 2: CHECKS (edge bounds, overload detection) -> `debug`
//! - 3: DEBUG (full algorithm internals) -> `trace`

use tracing_subscriber::EnvFilter;

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1).
///
/// Used for: computed dates, leveling adjustments, dropped references.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            ::tracing::info!($($arg)*);
        }
    };
}

/// Log at CHECKS level (verbosity >= 2).
///
/// Used for: per-edge bounds, overload candidates, ranking decisions.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            ::tracing::debug!($($arg)*);
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
///
/// Used for: graph construction and traversal internals.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            ::tracing::trace!($($arg)*);
        }
    };
}

/// Map a verbosity level to a default `EnvFilter` directive.
fn filter_for(verbosity: u8) -> &'static str {
    match verbosity {
        VERBOSITY_SILENT => "error",
        VERBOSITY_CHANGES => "info",
        VERBOSITY_CHECKS => "debug",
        _ => "trace",
    }
}

/// Install a stderr `tracing` subscriber for callers without one of their own.
///
/// `RUST_LOG` takes precedence over `verbosity`. Returns `false` when a global
/// subscriber was already installed.
pub fn init(verbosity: u8) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(filter_for(verbosity))),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_constants() {
        assert_eq!(VERBOSITY_SILENT, 0);
        assert_eq!(VERBOSITY_CHANGES, 1);
        assert_eq!(VERBOSITY_CHECKS, 2);
        assert_eq!(VERBOSITY_DEBUG, 3);
    }

    #[test]
    fn test_filter_for_levels() {
        assert_eq!(filter_for(0), "error");
        assert_eq!(filter_for(1), "info");
        assert_eq!(filter_for(2), "debug");
        assert_eq!(filter_for(7), "trace");
    }

    #[test]
    fn test_log_macros_compile() {
        // Just verify macros compile and don't panic
        let verbosity = VERBOSITY_DEBUG;
        log_changes!(verbosity, "test {}", 1);
        log_checks!(verbosity, "test {}", 2);
        log_debug!(verbosity, "test {}", 3);
    }

    #[test]
    fn test_init_is_idempotent() {
        init(VERBOSITY_SILENT);
        assert!(!init(VERBOSITY_DEBUG));
    }
}
