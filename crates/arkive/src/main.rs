// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Arkive - a Telegram file-archiving bot backed by a GitHub repository.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Arkive - archive Telegram files in a GitHub repository.
#[derive(Parser, Debug)]
#[command(name = "arkive", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the webhook gateway and run the deletion sweep scheduler.
    Serve,
    /// Run one deletion sweep and exit (for external cron).
    Sweep,
    /// Print record count, store size, and deletion queue state.
    Status,
    /// Print the effective configuration with credentials redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => arkive_config::load_and_validate_path(path),
        None => arkive_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            arkive_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Sweep) => serve::run_sweep(config).await,
        Some(Commands::Status) => status::run_status(&config).await,
        Some(Commands::Config) => status::print_config(&config),
        None => {
            println!("arkive: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("arkive: {e}");
        std::process::exit(1);
    }
}
