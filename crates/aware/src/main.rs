// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aware - a conversation-synchronization client for streaming chat
//! backends.
//!
//! This is the binary entry point for the Aware CLI.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod chat;
mod models;
mod status;

/// Aware - conversation client for streaming chat backends.
#[derive(Parser, Debug)]
#[command(name = "aware", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive chat session.
    Chat,
    /// Check the health of every configured adapter.
    Status {
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match aware_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            aware_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Chat) | None => chat::run_chat(config).await,
        Some(Commands::Status { json }) => status::run_status(&config, json).await,
    };

    if let Err(e) = result {
        eprintln!("aware: {e}");
        std::process::exit(1);
    }
}
