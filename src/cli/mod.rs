//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for portable-case using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// portable-case - Forensic portable case exporter
#[derive(Parser, Debug)]
#[command(name = "portable-case")]
#[command(version, about, long_about = None)]
#[command(author = "Portable Case Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "portable-case.toml",
        env = "PORTABLE_CASE_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PORTABLE_CASE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export tagged items and interesting items into a portable case
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// List tag names and interesting-item sets in the source case
    List(commands::list::ListArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
