//! Logging initialization

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber. The level argument is the default;
/// RUST_LOG still takes precedence when set.
pub fn init(level: &str, format: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    match format {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        "text" => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        other => return Err(anyhow!("unknown log format: {} (text, json)", other)),
    }
    Ok(())
}
