//! Searchlens - terminal client for web-search chat and image analysis
//!
#![doc = "Main entry point for the Searchlens application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use searchlens::cli::{Cli, Commands};
use searchlens::commands;
use searchlens::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config = Config::load(cli.config_path(), &cli)?;

    // Validate configuration
    config.validate()?;

    if !config.ui.color {
        colored::control::set_override(false);
    }

    // Execute command
    match cli.command.unwrap_or(Commands::Ui { tab: None }) {
        Commands::Ui { tab } => {
            tracing::info!("Starting interactive UI");
            commands::ui::run_ui(config, tab).await?;
            Ok(())
        }
        Commands::Ask { message } => {
            tracing::info!("Sending single chat message");
            commands::ask::run_ask(config, message).await?;
            Ok(())
        }
        Commands::Analyze { image, question } => {
            tracing::info!("Starting image analysis");
            tracing::debug!("Image path: {}", image.display());
            commands::analyze::run_analyze(config, &image, question).await?;
            Ok(())
        }
        Commands::Health => {
            commands::health::run_health(config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with the UI on stdout.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "searchlens=debug"
    } else {
        "searchlens=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
