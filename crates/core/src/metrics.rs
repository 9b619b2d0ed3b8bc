//! Metrics collection and reporting for codec runs.
//!
//! A `Metrics` value is filled from the report of one compress or
//! decompress call and knows how to summarize it:
//! - Bytes in and out, and the resulting ratio
//! - Where the bits went (magic, tree header, payload)
//! - Timing and throughput
//!
//! # Thread Safety
//!
//! Each run owns its own `Metrics`; nothing here is shared between calls.

use std::time::{Duration, Instant};

use crate::codec::{CompressReport, DecompressReport, MAGIC_BITS};

/// Direction of a codec run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Compress,
    Decompress,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Compress => "compress",
            Direction::Decompress => "decompress",
        }
    }
}

/// Counters and timing for a single codec run.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub direction: Direction,

    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Input/Output ===
    /// Uncompressed bytes (read when compressing, written when decompressing)
    pub raw_bytes: u64,

    /// Compressed blob size in bytes, padding included
    pub compressed_bytes: u64,

    // === Bit accounting ===
    /// Bits spent on the tree header
    pub header_bits: u64,

    /// Bits spent on codes, end-of-stream code included
    pub payload_bits: u64,

    /// Symbols in the code tree, end-of-stream marker included
    pub distinct_symbols: usize,
}

impl Metrics {
    /// Create new metrics with start time set to now.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            start_time: Instant::now(),
            end_time: None,
            raw_bytes: 0,
            compressed_bytes: 0,
            header_bits: 0,
            payload_bits: 0,
            distinct_symbols: 0,
        }
    }

    /// Record the outcome of a compression run.
    pub fn record_compress(&mut self, report: &CompressReport) {
        self.raw_bytes = report.input_bytes;
        self.compressed_bytes = report.output_bytes();
        self.header_bits = report.header_bits;
        self.payload_bits = report.payload_bits;
        self.distinct_symbols = report.distinct_symbols;
    }

    /// Record the outcome of a decompression run.
    ///
    /// `compressed_bytes` is the size of the source blob, which the report
    /// cannot know when the blob carries trailing data after the padding.
    pub fn record_decompress(&mut self, report: &DecompressReport, compressed_bytes: u64) {
        self.raw_bytes = report.output_bytes;
        self.compressed_bytes = compressed_bytes;
        self.header_bits = report.header_bits;
        self.payload_bits = report.payload_bits;
        self.distinct_symbols = report.distinct_symbols;
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Compression ratio (compressed / raw).
    ///
    /// Returns 0.0 if there was no raw data.
    pub fn compression_ratio(&self) -> f64 {
        if self.raw_bytes == 0 {
            0.0
        } else {
            self.compressed_bytes as f64 / self.raw_bytes as f64
        }
    }

    /// Average payload bits per raw byte (the end-of-stream code is
    /// spread over the input).
    pub fn bits_per_byte(&self) -> f64 {
        if self.raw_bytes == 0 {
            0.0
        } else {
            self.payload_bits as f64 / self.raw_bytes as f64
        }
    }

    /// Raw bytes processed per second.
    pub fn throughput_bps(&self) -> f64 {
        let duration_secs = self.duration().as_secs_f64();
        if duration_secs == 0.0 {
            0.0
        } else {
            self.raw_bytes as f64 / duration_secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        let duration_ms = self.duration().as_millis();

        println!("\n=== {} Summary ===", capitalize(self.direction.as_str()));
        println!("Duration: {} ms", duration_ms);
        println!();

        println!(
            "Raw:        {} bytes ({:.2} MiB)",
            self.raw_bytes,
            self.raw_bytes as f64 / 1024.0 / 1024.0
        );
        println!(
            "Compressed: {} bytes ({:.2} MiB)",
            self.compressed_bytes,
            self.compressed_bytes as f64 / 1024.0 / 1024.0
        );
        println!("Ratio: {:.1}%", self.compression_ratio() * 100.0);
        println!();

        println!("=== Bits ===");
        println!("Magic:   {}", MAGIC_BITS);
        println!("Header:  {} ({} symbols)", self.header_bits, self.distinct_symbols);
        println!("Payload: {} ({:.3} bits/byte)", self.payload_bits, self.bits_per_byte());
        println!();

        println!("=== Performance ===");
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
        println!();
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "direction={}\n\
             duration_ms={}\n\
             raw_bytes={}\n\
             compressed_bytes={}\n\
             compression_ratio={:.4}\n\
             header_bits={}\n\
             payload_bits={}\n\
             distinct_symbols={}\n",
            self.direction.as_str(),
            self.duration().as_millis(),
            self.raw_bytes,
            self.compressed_bytes,
            self.compression_ratio(),
            self.header_bits,
            self.payload_bits,
            self.distinct_symbols,
        )
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
