//! huffstream: compress and decompress files with a self-describing
//! Huffman code.

mod config;

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use huffstream_core::bitio::{BitReader, BitWriter};
use huffstream_core::metrics::{Direction, Metrics};
use huffstream_core::{compress, decompress};
use thiserror::Error;
use tracing::{debug, error};

use config::{Config, Mode};

/// Exit status for a failed codec run.
const EXIT_FAILURE: u8 = 1;
/// Exit status for a bad command line.
const EXIT_USAGE: u8 = 2;

#[derive(Debug, Error)]
enum RunError {
    #[error("{0}")]
    Usage(String),

    #[error("{} is the source file; refusing to overwrite it", .path.display())]
    SameFile { path: PathBuf },

    #[error("cannot open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("cannot create {}: {source}", .path.display())]
    Create { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Codec(#[from] huffstream_core::Error),
}

impl RunError {
    fn exit_status(&self) -> u8 {
        match self {
            RunError::Usage(_) | RunError::SameFile { .. } => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match configure(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run with --help for usage.");
            return ExitCode::from(e.exit_status());
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match run(&config) {
        Ok(metrics) => {
            if config.print_stats {
                metrics.print_summary();
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(source = %config.source.display(), "{} failed", mode_name(config.mode));
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_status())
        }
    }
}

fn configure(args: &[String]) -> Result<Config, RunError> {
    Config::from_args(args).map_err(RunError::Usage)
}

/// Run the codec over the configured files, removing the destination if
/// the run fails part way.
fn run(config: &Config) -> Result<Metrics, RunError> {
    let source = File::open(&config.source).map_err(|e| RunError::Open {
        path: config.source.clone(),
        source: e,
    })?;
    if same_file(&config.source, &config.destination) {
        return Err(RunError::SameFile {
            path: config.destination.clone(),
        });
    }
    let destination = File::create(&config.destination).map_err(|e| RunError::Create {
        path: config.destination.clone(),
        source: e,
    })?;

    let result = match config.mode {
        Mode::Compress => compress_file(source, destination),
        Mode::Decompress => decompress_file(source, destination),
    };

    if result.is_err() {
        discard(&config.destination);
    }
    let metrics = result?;

    debug!(
        source = %config.source.display(),
        destination = %config.destination.display(),
        raw_bytes = metrics.raw_bytes,
        compressed_bytes = metrics.compressed_bytes,
        "{} finished",
        mode_name(config.mode)
    );
    Ok(metrics)
}

fn compress_file(source: File, destination: File) -> Result<Metrics, RunError> {
    let mut metrics = Metrics::new(Direction::Compress);

    let mut input = BitReader::new(source);
    let (file, report) = compress(&mut input, BitWriter::new(destination))?;
    file.sync_all().map_err(huffstream_core::Error::from)?;

    metrics.record_compress(&report);
    metrics.complete();
    Ok(metrics)
}

fn decompress_file(source: File, destination: File) -> Result<Metrics, RunError> {
    let mut metrics = Metrics::new(Direction::Decompress);
    let compressed_bytes = source.metadata().map_err(huffstream_core::Error::from)?.len();

    let mut input = BitReader::new(source);
    let (file, report) = decompress(&mut input, BitWriter::new(destination))?;
    file.sync_all().map_err(huffstream_core::Error::from)?;

    metrics.record_decompress(&report, compressed_bytes);
    metrics.complete();
    Ok(metrics)
}

/// Whether both paths name one existing file, however they are spelled.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        error!(path = %path.display(), error = %e, "could not remove partial output");
    }
}

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Compress => "compression",
        Mode::Decompress => "decompression",
    }
}
