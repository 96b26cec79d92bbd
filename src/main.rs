use gcal_digest::{cli, startup};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    let args = cli::parse(std::env::args().collect());
    info!("Starting gcal-digest with {}", args.config_path.display());

    // Load configuration
    let config = startup::load_config(&args.config_path)?;

    startup::run(config).await
}
