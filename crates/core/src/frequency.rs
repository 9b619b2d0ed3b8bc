//! Symbol frequency analysis.
//!
//! The first pass over the raw input counts every byte value. The
//! end-of-stream marker is always counted exactly once so the tree always
//! has a leaf for it, even for empty input.

use std::io::{Read, Seek};

use tracing::trace;

use crate::bitio::BitReader;
use crate::error::Result;
use crate::tree::{Symbol, ALPHABET_SIZE, END_OF_STREAM};

/// Occurrence count for every symbol, end-of-stream marker included.
///
/// # Invariants
/// - `counts[END_OF_STREAM]` is always 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
}

impl FrequencyTable {
    /// A table with every byte count at zero and the end marker at one.
    pub fn new() -> Self {
        let mut counts = [0u64; ALPHABET_SIZE];
        counts[END_OF_STREAM as usize] = 1;
        Self { counts }
    }

    /// Count the bytes of an in-memory buffer.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::new();
        for &byte in data {
            table.record(byte);
        }
        table
    }

    /// Scan `input` to exhaustion, 8 bits at a time, then move it back to
    /// where the scan began so the caller can read the same data again.
    pub fn scan<R: Read + Seek>(input: &mut BitReader<R>) -> Result<Self> {
        input.mark()?;
        let mut table = Self::new();
        while let Some(byte) = input.read_byte()? {
            table.record(byte);
        }
        trace!(
            bytes = table.input_len(),
            distinct = table.distinct_symbols(),
            "counted input symbols"
        );
        input.reset()?;
        Ok(table)
    }

    /// Count one more occurrence of `byte`.
    pub fn record(&mut self, byte: u8) {
        self.counts[byte as usize] += 1;
    }

    /// Count for `symbol`; symbols outside the alphabet count zero.
    pub fn count(&self, symbol: Symbol) -> u64 {
        self.counts.get(symbol as usize).copied().unwrap_or(0)
    }

    /// Symbols with a nonzero count, in ascending symbol order.
    pub fn present(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as Symbol, count))
    }

    /// Number of symbols with a nonzero count (end marker included).
    pub fn distinct_symbols(&self) -> usize {
        self.present().count()
    }

    /// Number of raw input bytes counted.
    pub fn input_len(&self) -> u64 {
        self.counts[..END_OF_STREAM as usize].iter().sum()
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_end_marker_forced() {
        let table = FrequencyTable::from_bytes(b"");
        assert_eq!(table.count(END_OF_STREAM), 1);
        assert_eq!(table.distinct_symbols(), 1);
        assert_eq!(table.input_len(), 0);
    }

    #[test]
    fn test_counts() {
        let table = FrequencyTable::from_bytes(b"AAB");
        assert_eq!(table.count(65), 2);
        assert_eq!(table.count(66), 1);
        assert_eq!(table.count(67), 0);
        assert_eq!(table.count(END_OF_STREAM), 1);

        let present: Vec<_> = table.present().collect();
        assert_eq!(present, vec![(65, 2), (66, 1), (END_OF_STREAM, 1)]);
    }

    #[test]
    fn test_out_of_range_symbol_counts_zero() {
        let table = FrequencyTable::from_bytes(b"abc");
        assert_eq!(table.count(300), 0);
    }

    #[test]
    fn test_scan_rewinds_input() {
        let data = b"hello, world".to_vec();
        let mut input = BitReader::new(Cursor::new(data.clone()));

        let table = FrequencyTable::scan(&mut input).unwrap();
        assert_eq!(table, FrequencyTable::from_bytes(&data));

        // Second pass sees the same bytes from the start
        assert_eq!(input.position(), 0);
        assert_eq!(input.read_byte().unwrap(), Some(b'h'));
    }

    #[test]
    fn test_scan_from_offset() {
        let mut cursor = Cursor::new(b"skip:counted".to_vec());
        cursor.set_position(5);
        let mut input = BitReader::new(cursor);

        let table = FrequencyTable::scan(&mut input).unwrap();
        assert_eq!(table, FrequencyTable::from_bytes(b"counted"));
        assert_eq!(input.read_byte().unwrap(), Some(b'c'));
    }

    #[test]
    fn test_all_byte_values() {
        let data: Vec<u8> = (0..=255).collect();
        let table = FrequencyTable::from_bytes(&data);
        assert_eq!(table.distinct_symbols(), 257);
        assert_eq!(table.input_len(), 256);
    }
}
