use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use engine_logging::LogDestination;
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "heic2jpeg")]
#[command(
    version,
    about = "Convert HEIC images to JPEG and bundle them into a zip archive",
    long_about = None
)]
pub struct Cli {
    /// Images to convert.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Directory receiving the archive [default: current directory]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// File name of the archive [default: images.zip]
    #[arg(long)]
    pub archive_name: Option<String>,

    /// JPEG quality between 0.0 and 1.0 [default: 0.8]
    #[arg(short, long, value_parser = parse_quality)]
    pub quality: Option<f32>,

    /// HEIF decoder invoked as `<program> <input> <output.png>` [default: heif-dec]
    #[arg(long)]
    pub heif_decoder: Option<PathBuf>,

    /// Also write each preview thumbnail into this directory.
    #[arg(long)]
    pub preview_dir: Option<PathBuf>,

    /// RON settings file [default: ./heic2jpeg.ron when present]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "terminal")]
    pub log: LogTarget,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

fn parse_quality(raw: &str) -> Result<f32, String> {
    let value: f32 = raw
        .parse()
        .map_err(|_| format!("{raw:?} is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("quality must be between 0.0 and 1.0, got {value}"))
    }
}
