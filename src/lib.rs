//! Litterwatch - garbage dumping detection for video.
//!
//! Runs a YOLO object detector over the frames of a video, draws the
//! watched detections (`garbage_throw`, `garbage_bag` by default) and writes
//! an annotated copy with the same resolution, frame rate and frame count.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod detect;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod video;

use clap::{CommandFactory, Parser};
use cli::{AnnotateArgs, Cli, Command, ConfigAction};
use config::{Config, config_file_path, load_default_config, save_default_config, validate_config};
use detect::YoloDetector;
use output::{ConsoleObserver, ErrorPayload, EventType, JsonEnvelope};
use pipeline::{AnnotationPipeline, CompletedRun, OutputSettings, SessionParams};
use render::OverlayRenderer;
use std::path::Path;
use tracing::{info, warn};

pub use error::{Error, Result};

/// Main entry point for the litterwatch CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.annotate.verbose, cli.annotate.quiet);

    // Remove half-written videos on interrupt
    if let Err(e) = ctrlc::set_handler(|| {
        output::cleanup_pending_outputs();
        std::process::exit(constants::INTERRUPTED_EXIT_CODE);
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    if let Some(Command::Config { action }) = cli.command {
        return handle_config_command(action);
    }

    let Some(input) = cli.input else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = load_default_config()?;
    annotate(&input, &cli.annotate, config)
}

/// Annotate one video with CLI overrides applied to `config`.
fn annotate(input: &Path, args: &AnnotateArgs, mut config: Config) -> Result<()> {
    let result = annotate_inner(input, args, &mut config);

    if args.json {
        let line = match &result {
            Ok(run) => JsonEnvelope::new(EventType::Result, &run.summary).to_json()?,
            Err(e) => JsonEnvelope::new(EventType::Error, ErrorPayload::from(e)).to_json()?,
        };
        println!("{line}");
    }

    let run = result?;
    if !args.json {
        println!("{}", run.video.path().display());
    }

    if let Some(dest) = &args.save {
        run.video.save_as(dest)?;
    }
    Ok(())
}

fn annotate_inner(input: &Path, args: &AnnotateArgs, config: &mut Config) -> Result<CompletedRun> {
    // Fail on a bad input before the model is loaded.
    video::check_extension(input)?;
    if !input.is_file() {
        return Err(Error::VideoOpen {
            path: input.to_path_buf(),
            source: "file not found".into(),
        });
    }

    if let Some(path) = &args.model_path {
        config.model.path.clone_from(path);
    }
    if let Some(path) = &args.labels_path {
        config.model.labels.clone_from(path);
    }
    validate_config(config)?;

    let params = SessionParams::new(
        args.confidence.unwrap_or(config.defaults.confidence_threshold),
        args.frame_skip.unwrap_or(config.defaults.frame_skip),
    )?;
    info!(
        confidence = params.confidence_threshold(),
        frame_skip = params.frame_skip(),
        "session parameters"
    );

    let detector = YoloDetector::from_config(&config.model)?;
    let renderer = OverlayRenderer::from_config(&config.overlay)?;
    let settings = OutputSettings::resolve(args.output_dir.as_deref(), &config.output);

    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("video");
    let mut observer = ConsoleObserver::new(file_name, args.progress_enabled());
    if let Some(preview) = &args.preview {
        observer = observer.with_preview(preview);
    }

    let mut pipeline = AnnotationPipeline::new(detector, renderer, params);
    pipeline.annotate_file(input, &settings, &mut observer)
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // ORT is chatty at info level; only surface it when asked for.
    let filter_str = if quiet {
        "warn,ort=off".to_string()
    } else {
        match verbose {
            0 => "info,ort=off".to_string(),
            1 => "debug,ort=warn".to_string(),
            2 => "trace,ort=info".to_string(),
            _ => "trace".to_string(),
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let saved_path = save_default_config(&Config::default())?;
                println!("Created configuration file: {}", saved_path.display());
                println!("\nNext steps:");
                println!("  set [model] path and labels to your exported detector");
                println!("  litterwatch street.mp4");
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            let text = toml::to_string_pretty(&config)
                .map_err(|e| Error::ConfigSerialize { source: e })?;
            print!("{text}");
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
