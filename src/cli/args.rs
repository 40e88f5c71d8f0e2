//! CLI argument definitions.

use super::validators::{parse_confidence, parse_frame_skip};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Detect littering in video and write an annotated copy.
#[derive(Debug, Parser)]
#[command(name = "litterwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Video file to annotate (mp4, mov or avi).
    pub input: Option<PathBuf>,

    /// Options for annotation runs.
    #[command(flatten)]
    pub annotate: AnnotateArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for an annotation run.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct AnnotateArgs {
    /// Confidence threshold passed to the detector (0.0-1.0).
    #[arg(short = 'c', long, value_parser = parse_confidence, env = "LITTERWATCH_CONFIDENCE")]
    pub confidence: Option<f32>,

    /// Run detection on every Nth frame (1-10).
    #[arg(short = 'n', long, value_parser = parse_frame_skip, env = "LITTERWATCH_FRAME_SKIP")]
    pub frame_skip: Option<u32>,

    /// Path to ONNX model file (overrides config).
    #[arg(long, env = "LITTERWATCH_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Path to labels file (overrides config).
    #[arg(long, env = "LITTERWATCH_LABELS_PATH")]
    pub labels_path: Option<PathBuf>,

    /// Directory for the annotated video (default: system temp dir).
    #[arg(short, long, env = "LITTERWATCH_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Copy the finished video here (a file, or a directory to receive the download name).
    #[arg(short, long)]
    pub save: Option<PathBuf>,

    /// Keep the latest analyzed frame in this PNG file while running.
    #[arg(short, long)]
    pub preview: Option<PathBuf>,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Disable the progress bar.
    #[arg(long)]
    pub no_progress: bool,

    /// Suppress progress output and informational logs.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace+ORT info, -vvv: trace everything).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl AnnotateArgs {
    /// Whether to draw a progress bar.
    pub const fn progress_enabled(&self) -> bool {
        !self.quiet && !self.no_progress && !self.json
    }
}
