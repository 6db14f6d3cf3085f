//! PCN CLI: drive a payment-channel network from a scenario file.
//!
//! Subcommands: init, run, route.

mod commands;
mod logging;
mod scenario;

use clap::{Parser, Subcommand};

/// PCN: multi-hop payments over a network of two-party channels.
#[derive(Parser, Debug)]
#[command(name = "pcn", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a sample scenario file.
    Init(commands::init::InitArgs),
    /// Replay a scenario: register users, open channels, run transfers.
    Run(commands::run::RunArgs),
    /// Print the shortest path between two users of a scenario.
    Route(commands::route::RouteArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Run(args) => commands::run::run(args).await,
        Commands::Route(args) => commands::route::run(args),
    }
}
