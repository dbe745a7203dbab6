//! Tracing subscriber setup.

use crate::config::LoggingSettings;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides `settings.level`. Returns false if a subscriber was
/// already installed, which happens when tests share a process.
pub fn init_logging(settings: &LoggingSettings) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let (json, plain) = if settings.json {
        (Some(fmt::layer().json().with_current_span(true)), None)
    } else {
        (None, Some(fmt::layer().with_target(true)))
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(plain)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(level = %settings.level, json = settings.json, "logging initialized");
    }
    installed
}
