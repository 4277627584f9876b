//! Command-line interface
//!
//! Argument parsing and command dispatch. Option flags are optional on
//! purpose: only flags the user actually passed override the config file,
//! which in turn overrides the built-in defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// Media normalization engine
///
/// Probes media files, plans the least destructive transform that satisfies
/// the configured constraints, and drives a single external worker pass.
#[derive(Parser)]
#[command(name = "conform")]
#[command(about = "Normalize media files toward configured container/codec targets")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "CONFORM_LOG", global = true)]
    pub log_level: String,

    /// Logging format (text, json)
    #[arg(long, default_value = "text", global = true)]
    pub log_format: String,

    /// Configuration file (defaults to ./conform.toml when present)
    #[arg(long, env = "CONFORM_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Normalize a media file toward the configured targets
    Convert(args::ConvertArgs),
    /// Extract one representative frame as a PNG
    Thumbnail(args::ThumbnailArgs),
    /// Probe a media file and report its streams
    Inspect(args::InspectArgs),
}
