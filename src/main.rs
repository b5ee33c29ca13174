// Copyright 2026 Crumb Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crumb::cli;

#[derive(Parser)]
#[command(
    name = "crumb",
    about = "Crumb — cookie and web-storage collector with offline statistics",
    version,
    after_help = "Run 'crumb <command> --help' for details on each command."
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Visit sites and save one cookie/storage snapshot per site
    Collect {
        /// Sites to visit (bare domains or full URLs)
        #[arg(required = true)]
        sites: Vec<String>,
        /// Skip the browser pass (HTTP headers only)
        #[arg(long)]
        no_browser: bool,
        /// Run the browser with a visible window
        #[arg(long)]
        headed: bool,
        /// Seconds to idle after page load before reading cookies
        #[arg(long, default_value = "5")]
        wait: u64,
        /// Per-site timeout in milliseconds (HTTP request and navigation)
        #[arg(long, default_value = "15000")]
        timeout: u64,
        /// Snapshot directory (default: ~/.crumb/snapshots)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Aggregate saved snapshots into a statistics report
    Stats {
        /// Snapshot directory (default: ~/.crumb/snapshots)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// How many entries in the top-names and top-keys lists
        #[arg(long, default_value = "10")]
        top: usize,
        /// Output the snapshot as JSON instead of the text report
        #[arg(long)]
        json: bool,
    },
    /// Export saved snapshots to a CSV file
    Export {
        /// Output CSV path
        out: PathBuf,
        /// Snapshot directory (default: ~/.crumb/snapshots)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "crumb=debug" } else { "crumb=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let result = match cli.command {
        Commands::Collect {
            sites,
            no_browser,
            headed,
            wait,
            timeout,
            dir,
        } => {
            cli::collect_cmd::run(cli::collect_cmd::CollectArgs {
                sites,
                no_browser,
                headed,
                wait_secs: wait,
                timeout_ms: timeout,
                dir,
            })
            .await
        }
        Commands::Stats { dir, top, json } => cli::stats_cmd::run(dir, top, json),
        Commands::Export { out, dir } => cli::export_cmd::run(out, dir),
        Commands::Doctor => cli::doctor::run(),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "crumb", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    result
}
