//! Stderr tracing for the mission runner, kept apart from the CI log.
//!
//! GitHub Actions reads workflow commands (`::error::`, `::group::`, see
//! `io/workflow`) from stdout; those are product output and ignore `RUST_LOG`.
//! The spans and events recorded here (agent selection, install steps, the
//! primary/fallback attempts) only reach stderr when `RUST_LOG` asks for them.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directive used when `RUST_LOG` is unset, empty or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Filter for a raw `RUST_LOG` value. The error carries the rejected value.
fn filter_for(raw: Option<&str>) -> (EnvFilter, Option<String>) {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => (EnvFilter::new(DEFAULT_DIRECTIVE), None),
        Some(value) => match EnvFilter::try_new(value) {
            Ok(filter) => (filter, None),
            Err(_) => (EnvFilter::new(DEFAULT_DIRECTIVE), Some(value.to_string())),
        },
    }
}

/// Install the stderr subscriber.
///
/// ```bash
/// RUST_LOG=mission_runner=debug mission-runner --mission "audit" --dry-run
/// ```
pub fn init() {
    let raw = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, rejected) = filter_for(raw.as_deref());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    if let Some(value) = rejected {
        warn!(rust_log = %value, "ignoring invalid RUST_LOG, using {DEFAULT_DIRECTIVE}");
    }
}
