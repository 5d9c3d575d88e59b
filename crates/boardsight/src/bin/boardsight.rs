//! `boardsight` command-line reader.
//!
//! ```bash
//! boardsight read --config boardsight.json --image board.png --mode auto
//! boardsight read --config boardsight.json --width 640 --height 640
//! boardsight models --config boardsight.json
//! ```

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use boardsight::core::RgbImage;
use boardsight::{detect, BoardReadError, BoardRequest, BoardSightConfig, DetectorMode};
use clap::{Args, Parser, Subcommand};
use log::info;

#[derive(Parser, Debug)]
#[command(name = "boardsight", version)]
#[command(about = "Read chess positions from board images with an ensemble of piece detectors")]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect pieces and print the board report as JSON
    Read(ReadArgs),
    /// List configured models and whether they are loaded
    Models {
        /// Path to the JSON configuration
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ReadArgs {
    /// Path to the JSON configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Board image to decode
    #[arg(short, long, conflicts_with_all = ["width", "height"])]
    image: Option<PathBuf>,

    /// Width of a blank image, for replayed detections without pixels
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Height of a blank image
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Detector mode: specialist, generalist, ensemble or auto
    #[arg(short, long)]
    mode: Option<DetectorMode>,

    /// Confidence threshold in (0, 1]
    #[arg(long)]
    conf: Option<f32>,

    /// Also write the report to this file
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Read(args) => read(args),
        Command::Models { config } => models(&config),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    #[cfg(feature = "tracing")]
    boardsight::core::init_tracing(false, level);
    // A logger may already be installed by an embedding process.
    #[cfg(not(feature = "tracing"))]
    let _ = boardsight::core::init_with_level(level);
}

fn config_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new("."))
}

fn read(args: ReadArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = BoardSightConfig::load_json(&args.config)?;
    let reader = config.build_reader(config_dir(&args.config))?;

    let request = BoardRequest {
        image: None,
        confidence_threshold: args.conf,
        mode: args.mode,
    };
    let report = match (&args.image, args.width, args.height) {
        (Some(path), _, _) => detect::read_board_file(&reader, path, request)?,
        (None, Some(w), Some(h)) => {
            let blank = RgbImage::blank(w as usize, h as usize).map_err(BoardReadError::from)?;
            reader.read(BoardRequest {
                image: Some(Arc::new(blank)),
                ..request
            })?
        }
        _ => reader.read(request)?,
    };
    let json = report.to_json_pretty()?;

    let out = args
        .out
        .or_else(|| config.output_path(config_dir(&args.config)));
    if let Some(out) = &out {
        std::fs::write(out, &json)?;
        info!("report written to {}", out.display());
    }
    println!("{json}");
    Ok(())
}

fn models(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = BoardSightConfig::load_json(config_path)?;
    let registry = config.build_registry(config_dir(config_path))?;
    println!("{}", serde_json::to_string_pretty(&registry.describe())?);
    Ok(())
}
