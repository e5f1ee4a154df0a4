//! CLI module for FitFlex Chat
//!
//! - `serve`: HTTP chat service
//! - `build-index`: build and persist the knowledge base
//! - `ask`: one question from the terminal

pub mod ask;
pub mod build_index;
pub mod serve;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// FitFlex Chat - retrieval-augmented gym assistant
#[derive(Parser)]
#[command(name = "fitflex-chat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the chat HTTP service
    Serve,

    /// Build the knowledge base from the feature stores and save it
    BuildIndex(build_index::BuildIndexArgs),

    /// Ask a single question and stream the answer to stdout
    Ask(ask::AskArgs),
}

/// `.env`, layered configuration, then logging
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    logging::init_logging(&config.logging);
    Ok(config)
}
