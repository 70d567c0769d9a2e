//! Tracing subscriber setup for hosts embedding a stitch session.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Directive used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "sk_core=info";

/// Install a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(default_directive: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .context("Failed to install tracing subscriber")
}
