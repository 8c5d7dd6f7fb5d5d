//! Menagerie CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Write the default configuration
//! - `run`     — Headless simulation, printing bus events until Ctrl-C
//! - `serve`   — Simulation plus the HTTP gateway
//! - `step`    — Execute a single action and print the outcome

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "menagerie",
    about = "Menagerie — autonomous social persona simulation",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Onboard,

    /// Run the simulation headless, printing events until Ctrl-C
    Run,

    /// Run the simulation and serve the HTTP gateway
    Serve {
        /// Override the gateway port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Execute a single action against a fresh world and print the outcome
    Step,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Run => commands::run::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Step => commands::step::run().await?,
    }

    Ok(())
}
