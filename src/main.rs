//! Household Assistant - terminal client
//!
#![doc = "Household Assistant - terminal client"]
#![doc = "Main entry point for the household assistant application."]

use anyhow::Result;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use household_assistant::cli::{Cli, Commands};
use household_assistant::commands::{self, records};
use household_assistant::config::Config;
use household_assistant::flow::EntityType;
use household_assistant::gateway::{Gateway, HttpGateway};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::new(&config.gateway)?);

    // Execute command
    match cli.command_or_menu() {
        Commands::Menu => {
            tracing::info!("Starting interactive menu");
            commands::menu::run_menu(config, gateway).await?;
            Ok(())
        }
        Commands::Chat => {
            tracing::info!("Starting interactive chat");
            commands::chat::run_chat(config, gateway).await?;
            Ok(())
        }
        Commands::Chore => {
            tracing::info!("Starting chore flow");
            commands::flow::run_flow(gateway, EntityType::Chore).await?;
            Ok(())
        }
        Commands::Meal => {
            tracing::info!("Starting meal flow");
            commands::flow::run_flow(gateway, EntityType::Meal).await?;
            Ok(())
        }
        Commands::List { kind } => {
            records::list(gateway.as_ref(), kind.into()).await?;
            Ok(())
        }
        Commands::Members { command } => {
            tracing::info!("Starting member command");
            records::handle_members(gateway.as_ref(), command).await?;
            Ok(())
        }
        Commands::Recipes { command } => {
            tracing::info!("Starting recipe command");
            records::handle_recipes(gateway.as_ref(), command).await?;
            Ok(())
        }
        Commands::Health => {
            records::health(gateway.as_ref()).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they stay out of the interactive output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "household_assistant=debug"
    } else {
        "household_assistant=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
