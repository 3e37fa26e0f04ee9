//! Tracing subscriber setup shared by both binaries.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Map a `--log-level` value to a tracing level; unknown values mean info.
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `level`.
///
/// Logs go to stderr so terminal prompts on stdout stay readable.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(parse_level(level).to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
