//! Common test utilities and logging infrastructure
//!
//! Library code logs through the `log` facade; the subscriber installed here
//! bridges those records into `tracing` so they show up in captured test
//! output.
//!
//! # Environment Variables
//!
//! - `RUST_LOG=debug` - Enable debug logging in tests
//! - `RUST_LOG=qcolor_lens::codec=trace` - Show rejected argument lists
//! - `TEST_LOG_JSON=1` - Output JSON format for CI parsing
//!
//! Not every helper is used by every test binary.

#![allow(dead_code)]

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Initialize test logging. Idempotent.
pub fn init_test_logging() {
    init_test_logging_with_filter("qcolor_lens=debug,test=info");
}

/// Initialize test logging with a fallback filter used when `RUST_LOG` is
/// unset. Only the first call in a process takes effect.
pub fn init_test_logging_with_filter(filter: &str) {
    INIT.call_once(|| {
        let use_json = std::env::var("TEST_LOG_JSON").is_ok();
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

        if use_json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_test_writer())
                .try_init()
                .ok();
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_test_writer()
                        .with_ansi(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_target(true)
                        .compact(),
                )
                .try_init()
                .ok();
        }
    });
}

/// A span guard marking a test phase.
pub fn test_phase(name: &str) -> tracing::span::EnteredSpan {
    let span = tracing::info_span!("test_phase", phase = name);
    tracing::info!(phase = name, "entering test phase");
    span.entered()
}

/// Log test context information.
pub fn log_test_context(test_name: &str, description: &str) {
    tracing::info!(
        test_name = test_name,
        description = description,
        "test context"
    );
}

/// Run `f` with the given environment variables set (`None` removes one),
/// restoring the previous values afterwards.
///
/// Callers must be `#[serial]`: the process environment is shared.
pub fn with_env_vars<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(key, _)| ((*key).to_string(), std::env::var(key).ok()))
        .collect();

    for (key, value) in vars {
        // SAFETY: callers are serialized with `#[serial]`.
        match value {
            Some(v) => unsafe { std::env::set_var(key, v) },
            None => unsafe { std::env::remove_var(key) },
        }
    }

    let result = f();

    for (key, value) in saved {
        // SAFETY: callers are serialized with `#[serial]`.
        match value {
            Some(v) => unsafe { std::env::set_var(&key, v) },
            None => unsafe { std::env::remove_var(&key) },
        }
    }

    result
}

/// A PySide script with the call shapes seen in practice.
pub const SAMPLE_SCRIPT: &str = r##"from PySide6.QtGui import QColor

background = QColor(30, 30, 30)
overlay = QColor(0, 0, 0, 128)
accent = QColor("#3daee9")
shadow = QColor("#00000080")
text = QColor('white')
muted = QColor("darkGray")
unknown = QColor("chartreuse")
broken = QColor(300, 0, 0)
nested = QColor(Qt.GlobalColor(3))
spread = QColor(
    12,
    34,
    56
)
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_phase_logging() {
        init_test_logging();
        {
            let _setup = test_phase("setup");
            tracing::debug!("Setting up test resources");
        }
        {
            let _verify = test_phase("verify");
            tracing::debug!("Verifying results");
        }
    }
}
