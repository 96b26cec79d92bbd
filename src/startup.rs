use crate::components::Orchestrator;
use crate::config::Config;
use crate::error::other_error;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
///
/// Logs go to stderr; stdout carries only the digest.
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| other_error(&format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and validate the configuration file
pub fn load_config(path: &Path) -> miette::Result<Config> {
    match Config::load(path) {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Produce the digest and print it to stdout
pub async fn run(config: Config) -> miette::Result<()> {
    let orchestrator = Orchestrator::new(config)?;
    debug!("Cache directory: {}", orchestrator.cache().dir().display());

    let digest = orchestrator.run().await?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(digest.as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(crate::error::Error::from)?;

    Ok(())
}
