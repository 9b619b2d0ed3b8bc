//! Bit-level I/O over byte streams.
//!
//! `BitWriter` and `BitReader` are the bit channel the codec runs on. Both
//! operate in MSB-first order: the first bit written to (or read from) a
//! byte is its most significant bit.
//!
//! # Padding Rules
//! - BitWriter: `close` pads the final partial byte with trailing zeros
//! - BitReader: padding bits are indistinguishable from data; the codec's
//!   end-of-stream marker tells the decoder where the payload stops
//!
//! # Example
//! ```
//! use std::io::Cursor;
//! use huffstream_core::bitio::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_bits(0b101, 3).unwrap();  // Write 3 bits: 1, 0, 1
//! writer.write_bits(0b11, 2).unwrap();   // Write 2 bits: 1, 1
//! // Total: 10111 -> padded to 10111000
//!
//! let bytes = writer.close().unwrap();
//! assert_eq!(bytes, vec![0b10111000]);
//!
//! let mut reader = BitReader::new(Cursor::new(bytes));
//! assert_eq!(reader.read_bits(3).unwrap(), Some(0b101));
//! assert_eq!(reader.read_bits(2).unwrap(), Some(0b11));
//! ```

use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};

use crate::error::{BitIoError, Result};

/// Largest bit count accepted by a single read or write.
pub const MAX_BITS_PER_CALL: usize = 64;

/// Writes bits MSB-first into an underlying byte sink.
///
/// Complete bytes are handed to a buffered writer as soon as they fill up;
/// the final partial byte is padded with zeros by [`BitWriter::close`].
///
/// # Invariants
/// - `bit_count` is always < 8
/// - bits of `bit_buffer` below the first `bit_count` are zero
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    inner: BufWriter<W>,
    /// Accumulator for the current partial byte (MSB-aligned)
    bit_buffer: u8,
    /// Number of bits in bit_buffer (0-7)
    bit_count: u8,
    /// Total bits accepted so far
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new BitWriter over `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            inner: BufWriter::new(inner),
            bit_buffer: 0,
            bit_count: 0,
            bits_written: 0,
        }
    }

    /// Write the low `count` bits of `value`, most significant first.
    ///
    /// For example, writing value=0b101 with count=3 writes bits 1, 0, 1 in
    /// that order. Writing zero bits is a no-op.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 64
    /// - `Error::Io` if the underlying sink fails
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > MAX_BITS_PER_CALL {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        let mut remaining = count;
        while remaining > 0 {
            // How many bits fit in the current byte?
            let bits_to_write = remaining.min(8 - self.bit_count as usize);

            // Take the top bits_to_write of what is left
            let shift = remaining - bits_to_write;
            let bits = ((value >> shift) & ((1u64 << bits_to_write) - 1)) as u8;

            self.bit_buffer |= bits << (8 - self.bit_count as usize - bits_to_write);
            self.bit_count += bits_to_write as u8;

            if self.bit_count == 8 {
                self.inner.write_all(&[self.bit_buffer])?;
                self.bit_buffer = 0;
                self.bit_count = 0;
            }

            remaining -= bits_to_write;
        }

        self.bits_written += count as u64;
        Ok(())
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u64, 1)
    }

    /// Total number of bits written so far (excluding padding).
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Pad the final partial byte with zeros, flush, and hand back the sink.
    pub fn close(mut self) -> Result<W> {
        if self.bit_count > 0 {
            self.inner.write_all(&[self.bit_buffer])?;
            self.bit_buffer = 0;
            self.bit_count = 0;
        }
        self.inner
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}

/// Reads bits MSB-first from an underlying byte source.
///
/// A read that asks for more bits than remain returns `Ok(None)` and leaves
/// the remaining bits unread. Over a seekable source, [`BitReader::mark`]
/// records a point that [`BitReader::reset`] returns to.
///
/// # Invariants
/// - `bit_count` < 72 and only the low `bit_count` bits of `bit_buffer` are live
#[derive(Debug)]
pub struct BitReader<R: Read> {
    inner: BufReader<R>,
    /// Bits fetched from `inner` but not yet handed out
    bit_buffer: u128,
    bit_count: u32,
    /// Total bits handed out since construction or the last reset
    position: u64,
    /// Whether `inner` has reported end of input
    exhausted: bool,
    /// Where `reset` returns to
    origin: Mark,
}

/// A saved read point: the byte holding the next unread bit, how many of
/// its leading bits were already consumed, and the bit position there.
#[derive(Debug, Clone, Copy, Default)]
struct Mark {
    byte: u64,
    skip: u32,
    position: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a new BitReader over `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            bit_buffer: 0,
            bit_count: 0,
            position: 0,
            exhausted: false,
            origin: Mark::default(),
        }
    }

    /// Read the next `count` bits as an unsigned integer, first bit most
    /// significant.
    ///
    /// Returns `Ok(None)` if fewer than `count` bits remain before the end
    /// of input. Reading zero bits always succeeds with `Some(0)`.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 64
    /// - `Error::Io` if the underlying source fails
    pub fn read_bits(&mut self, count: usize) -> Result<Option<u64>> {
        if count > MAX_BITS_PER_CALL {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        while (self.bit_count as usize) < count {
            if !self.fetch_byte()? {
                return Ok(None);
            }
        }

        let shift = self.bit_count - count as u32;
        let value = ((self.bit_buffer >> shift) & low_mask(count as u32)) as u64;

        self.bit_count = shift;
        self.bit_buffer &= low_mask(shift);
        self.position += count as u64;

        Ok(Some(value))
    }

    /// Read a single bit, or `None` at end of input.
    pub fn read_bit(&mut self) -> Result<Option<bool>> {
        Ok(self.read_bits(1)?.map(|bit| bit == 1))
    }

    /// Read one 8-bit group, or `None` at end of input.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.read_bits(8)?.map(|byte| byte as u8))
    }

    /// Number of bits handed out so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Unwrap the reader, discarding any buffered bits.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }

    /// Append one byte from the source to the bit buffer, returning false
    /// at end of input.
    fn fetch_byte(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }

        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => {
                    self.exhausted = true;
                    return Ok(false);
                }
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        self.bit_buffer = (self.bit_buffer << 8) | byte[0] as u128;
        self.bit_count += 8;
        Ok(true)
    }
}

impl<R: Read + Seek> BitReader<R> {
    /// Remember the current read point for a later [`BitReader::reset`].
    ///
    /// The point is taken relative to the underlying stream, so a source
    /// that was already positioned before the reader was built is returned
    /// to that position, not to its start.
    pub fn mark(&mut self) -> Result<()> {
        let buffered_bytes = self.bit_count.div_ceil(8);
        let byte = self.inner.stream_position()? - buffered_bytes as u64;
        self.origin = Mark {
            byte,
            skip: buffered_bytes * 8 - self.bit_count,
            position: self.position,
        };
        Ok(())
    }

    /// Return to the last [`BitReader::mark`], or to the start of the
    /// underlying stream if none was taken, for another pass.
    pub fn reset(&mut self) -> Result<()> {
        let Mark {
            byte,
            skip,
            position,
        } = self.origin;

        self.inner.seek(SeekFrom::Start(byte))?;
        self.bit_buffer = 0;
        self.bit_count = 0;
        self.position = position;
        self.exhausted = false;

        // Drop the bits of a partly consumed byte
        if skip > 0 && self.fetch_byte()? {
            self.bit_count -= skip;
            self.bit_buffer &= low_mask(self.bit_count);
        }
        Ok(())
    }
}

fn low_mask(bits: u32) -> u128 {
    if bits >= 128 {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(bytes: &[u8]) -> BitReader<Cursor<Vec<u8>>> {
        BitReader::new(Cursor::new(bytes.to_vec()))
    }

    #[test]
    fn test_write_read_single_byte() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0b10110011, 8).unwrap();

        let bytes = writer.close().unwrap();
        assert_eq!(bytes, vec![0b10110011]);

        let mut reader = reader(&bytes);
        assert_eq!(reader.read_bits(8).unwrap(), Some(0b10110011));
    }

    #[test]
    fn test_write_read_partial_bits() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b11, 2).unwrap();
        writer.write_bits(0b000, 3).unwrap();

        let bytes = writer.close().unwrap();
        assert_eq!(bytes, vec![0b10111000]);

        let mut reader = reader(&bytes);
        assert_eq!(reader.read_bits(3).unwrap(), Some(0b101));
        assert_eq!(reader.read_bits(2).unwrap(), Some(0b11));
        assert_eq!(reader.read_bits(3).unwrap(), Some(0b000));
    }

    #[test]
    fn test_padding() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0b1, 1).unwrap();
        assert_eq!(writer.bits_written(), 1);

        let bytes = writer.close().unwrap();
        assert_eq!(bytes, vec![0b10000000]);
    }

    #[test]
    fn test_multi_byte() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0b1010101111110000, 16).unwrap();

        let bytes = writer.close().unwrap();
        assert_eq!(bytes, vec![0b10101011, 0b11110000]);

        let mut reader = reader(&bytes);
        assert_eq!(reader.read_bits(16).unwrap(), Some(0b1010101111110000));
    }

    #[test]
    fn test_read_past_end() {
        let mut reader = reader(&[0b10101010]);

        assert_eq!(reader.read_bits(8).unwrap(), Some(0b10101010));
        assert_eq!(reader.read_bits(1).unwrap(), None);
        assert_eq!(reader.read_bit().unwrap(), None);
    }

    #[test]
    fn test_short_read_signals_end() {
        let mut reader = reader(&[0xAB, 0xCD]);

        assert_eq!(reader.read_bits(4).unwrap(), Some(0xA));
        // Only 12 bits remain
        assert_eq!(reader.read_bits(32).unwrap(), None);
        assert_eq!(reader.position(), 4);
        assert_eq!(reader.read_bits(12).unwrap(), Some(0xBCD));
    }

    #[test]
    fn test_zero_bits() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0xFF, 0).unwrap();
        let bytes = writer.close().unwrap();
        assert!(bytes.is_empty());

        let mut reader = reader(&[0xFF]);
        assert_eq!(reader.read_bits(0).unwrap(), Some(0));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_64_bit_values() {
        let mut writer = BitWriter::new(Vec::new());
        let val = 0x123456789ABCDEF0u64;
        writer.write_bits(0b1, 1).unwrap();
        writer.write_bits(val, 64).unwrap();

        let bytes = writer.close().unwrap();
        let mut reader = reader(&bytes);
        assert_eq!(reader.read_bits(1).unwrap(), Some(1));
        assert_eq!(reader.read_bits(64).unwrap(), Some(val));
    }

    #[test]
    fn test_invalid_bit_count() {
        let mut writer = BitWriter::new(Vec::new());
        assert!(writer.write_bits(0, 65).is_err());

        let mut reader = reader(&[0u8; 16]);
        assert!(reader.read_bits(65).is_err());
    }

    #[test]
    fn test_bit_by_bit() {
        let mut writer = BitWriter::new(Vec::new());
        for &bit in &[true, false, true, true, false, false, true, false] {
            writer.write_bit(bit).unwrap();
        }

        let bytes = writer.close().unwrap();
        assert_eq!(bytes, vec![0b10110010]);

        let mut reader = reader(&bytes);
        let expected = [true, false, true, true, false, false, true, false];
        for &exp in &expected {
            assert_eq!(reader.read_bit().unwrap(), Some(exp));
        }
        assert_eq!(reader.position(), 8);
    }

    #[test]
    fn test_reads_span_refills() {
        let data: Vec<u8> = (0..20).collect();
        let mut reader = reader(&data);

        let mut out = Vec::new();
        while let Some(byte) = reader.read_byte().unwrap() {
            out.push(byte);
        }
        assert_eq!(out, data);
        assert_eq!(reader.position(), 160);
    }

    #[test]
    fn test_reset() {
        let mut reader = reader(&[0xF0, 0x0F]);
        assert_eq!(reader.read_bits(12).unwrap(), Some(0xF00));

        reader.reset().unwrap();
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_bits(16).unwrap(), Some(0xF00F));
    }

    #[test]
    fn test_reset_to_mark_mid_byte() {
        let mut reader = reader(&[0xA5, 0x3C, 0x96]);
        assert_eq!(reader.read_bits(5).unwrap(), Some(0b10100));

        reader.mark().unwrap();
        assert_eq!(reader.read_bits(19).unwrap(), Some(0b101_0011_1100_1001_0110));
        assert_eq!(reader.read_bit().unwrap(), None);

        reader.reset().unwrap();
        assert_eq!(reader.position(), 5);
        assert_eq!(reader.read_bits(3).unwrap(), Some(0b101));
        assert_eq!(reader.read_bits(16).unwrap(), Some(0x3C96));
    }

    #[test]
    fn test_reset_keeps_source_offset() {
        let mut cursor = Cursor::new(vec![0x11, 0x22, 0x33, 0x44]);
        cursor.set_position(2);

        let mut reader = BitReader::new(cursor);
        reader.mark().unwrap();
        assert_eq!(reader.read_bits(16).unwrap(), Some(0x3344));

        reader.reset().unwrap();
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_byte().unwrap(), Some(0x33));
    }
}
