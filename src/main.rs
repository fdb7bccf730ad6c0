mod cli;
mod startup;

use clap::Parser;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    let args = cli::CliArgs::parse();

    // Initialize logging
    startup::init_logging(args.log_level.as_deref())?;

    info!("Starting Jarvis calendar briefing");

    // Load configuration
    let config = startup::load_config(&args)?;

    // Fetch, print and narrate
    startup::run(config, &args).await
}
