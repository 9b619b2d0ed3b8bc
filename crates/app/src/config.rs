//! Configuration for the huffstream command line.
//!
//! Handles parsing command-line arguments into a `Config`. The tool takes a
//! mode and two paths; everything else is optional.

use std::path::PathBuf;

use tracing::Level;

/// Which way to run the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compress,
    Decompress,
}

/// Complete configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,

    // === Files ===
    /// File to read
    pub source: PathBuf,

    /// File to write (created or truncated)
    pub destination: PathBuf,

    // === Behavior ===
    /// Number of `-v` flags given
    pub verbosity: u8,

    /// Whether to print the run summary
    pub print_stats: bool,
}

impl Config {
    /// Parse configuration from command-line arguments (program name excluded).
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut positional: Vec<&str> = Vec::new();
        let mut verbosity = 0u8;
        let mut print_stats = false;

        for arg in args {
            match arg.as_str() {
                "-v" | "--verbose" => {
                    verbosity = verbosity.saturating_add(1);
                }
                "-vv" => {
                    verbosity = verbosity.saturating_add(2);
                }
                "--stats" => {
                    print_stats = true;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(format!("unknown argument: {}", flag));
                }
                value => positional.push(value),
            }
        }

        let &[mode, source, destination] = positional.as_slice() else {
            return Err(format!(
                "expected <compress|decompress> <SOURCE> <DEST>, got {} positional arguments",
                positional.len()
            ));
        };

        let mode = match mode {
            "compress" | "c" => Mode::Compress,
            "decompress" | "d" => Mode::Decompress,
            other => return Err(format!("unknown mode: {}", other)),
        };

        let source = PathBuf::from(source);
        let destination = PathBuf::from(destination);
        if source == destination {
            return Err("source and destination must differ".to_string());
        }

        Ok(Config {
            mode,
            source,
            destination,
            verbosity,
            print_stats,
        })
    }

    /// Most verbose level the log subscriber should emit.
    pub fn log_level(&self) -> Level {
        match self.verbosity {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

fn print_help() {
    println!("huffstream: Huffman file compressor");
    println!();
    println!("USAGE:");
    println!("    huffstream compress   <SOURCE> <DEST> [OPTIONS]");
    println!("    huffstream decompress <SOURCE> <DEST> [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Log run details (repeat or use -vv for more)");
    println!("    --stats          Print a summary of the run");
    println!("    --help, -h       Print this help");
    println!();
    println!("EXAMPLES:");
    println!("    huffstream compress book.txt book.huf");
    println!("    huffstream decompress book.huf book.txt --stats");
    println!();
}
