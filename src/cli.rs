//! Command-line interface for voxline
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Offline streaming speech recognition
#[derive(Parser, Debug)]
#[command(name = "voxline", version, about = "Offline streaming speech recognition")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only print committed lines, no provisional updates
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path of the model directory to load
    #[arg(long, short = 'm', value_name = "DIR")]
    pub model: Option<PathBuf>,

    /// Directory scanned for installed models (used when --model is absent)
    #[arg(long, global = true, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Audio input device name
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Recognize a WAV file instead of the microphone ("-" reads stdin)
    #[arg(long, value_name = "FILE")]
    pub wav: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,

    /// List installed recognition models
    Models,
}
