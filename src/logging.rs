//! Log output for the `recipe-finder` binary
//!
//! Library code logs through the `log` facade; the subscriber installed here
//! picks those records up and writes them to stderr so stdout stays reserved
//! for command output.

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

/// Our own records at `info`, dependencies (reqwest, hyper, rusqlite) only when they warn.
pub const DEFAULT_FILTER: &str = "warn,recipe_finder=info";

fn filter() -> anyhow::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("build log filter")
}

/// Install the stderr subscriber. `RUST_LOG` replaces the default filter.
pub fn init() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter()?)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize log subscriber: {err}"))?;

    Ok(())
}
