// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kup - single-master cluster bring-up

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use kup_core::config::ClusterConfig;
use kup_core::report;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kup",
    version,
    about = "Bring up a fixed-topology, single-master cluster"
)]
struct Cli {
    /// Cluster configuration file
    #[arg(long, global = true, default_value = "kup.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision every machine and bootstrap the cluster
    Up(commands::up::UpArgs),
    /// Show the per-machine provisioning plans
    Plan(commands::plan::PlanArgs),
    /// Print hosts-file entries for the topology
    Hosts,
    /// Print the post-bring-up summary
    Report,
    /// Generate shell completions
    Completions(commands::completions::CompletionsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = ClusterConfig::load(&cli.config)?;

    match cli.command {
        Commands::Up(args) => commands::up::up(args, config).await,

        Commands::Plan(args) => commands::plan::plan(&args, &config),

        Commands::Hosts => {
            for entry in config.topology.hosts_entries() {
                println!("{entry}");
            }
            Ok(())
        }

        Commands::Report => {
            print!("{}", report::summary(&config.topology));
            Ok(())
        }

        Commands::Completions(args) => {
            commands::completions::generate_completions::<Cli>(args.shell, &mut std::io::stdout());
            Ok(())
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kup=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
