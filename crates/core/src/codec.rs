//! Compress and decompress pipelines.
//!
//! # Blob Format
//!
//! ```text
//! +--------------------+
//! | magic (32 bits)    |  0xFACE8201
//! +--------------------+
//! | tree header        |  preorder: 0 = internal, 1 + 9-bit symbol = leaf
//! | (variable)         |
//! +--------------------+
//! | payload            |  code of every input byte, in order,
//! | (variable)         |  then the end-of-stream code
//! +--------------------+
//! | padding (0-7 bits) |  zeros up to a byte boundary
//! +--------------------+
//! ```
//!
//! Compression reads its input twice: once to count symbols, once to emit
//! codes. Decompression walks the rebuilt tree one bit at a time and stops
//! at the end-of-stream leaf, so padding bits are never interpreted.
//!
//! On failure the destination is left in an unspecified state and should be
//! discarded; bytes decoded before a truncation have already been handed to
//! the destination's writer.

use std::io::{Cursor, Read, Seek, Write};

use tracing::debug;

use crate::bitio::{BitReader, BitWriter};
use crate::code_table::{Code, CodeTable};
use crate::error::{CodeError, FormatError, Result};
use crate::frequency::FrequencyTable;
use crate::header::{read_header, write_header};
use crate::tree::{build_tree, Node, Symbol, END_OF_STREAM};

/// Format identifier at the start of every compressed blob.
pub const MAGIC: u32 = 0xFACE_8201;

/// Width of the magic number in bits.
pub const MAGIC_BITS: usize = 32;

/// What a compression run consumed and produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressReport {
    /// Raw bytes read on the encoding pass
    pub input_bytes: u64,
    /// Bits spent on the tree header
    pub header_bits: u64,
    /// Bits spent on codes, end-of-stream code included
    pub payload_bits: u64,
    /// Symbols in the tree, end-of-stream marker included
    pub distinct_symbols: usize,
}

impl CompressReport {
    /// Total bits written before padding.
    pub fn total_bits(&self) -> u64 {
        MAGIC_BITS as u64 + self.header_bits + self.payload_bits
    }

    /// Size of the blob in bytes, padding included.
    pub fn output_bytes(&self) -> u64 {
        self.total_bits().div_ceil(8)
    }
}

/// What a decompression run consumed and produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecompressReport {
    /// Bytes written to the destination
    pub output_bytes: u64,
    /// Bits read for the tree header
    pub header_bits: u64,
    /// Bits read for codes, end-of-stream code included
    pub payload_bits: u64,
    /// Leaves in the decoded tree
    pub distinct_symbols: usize,
}

impl DecompressReport {
    /// Bits consumed from the source, excluding trailing padding.
    pub fn total_bits(&self) -> u64 {
        MAGIC_BITS as u64 + self.header_bits + self.payload_bits
    }
}

/// Compress everything `input` holds into `output`.
///
/// `input` is scanned to the end, rewound, and read again. `output` is
/// padded to a byte boundary and flushed; the underlying sink is returned
/// with the run report.
pub fn compress<R, W>(input: &mut BitReader<R>, mut output: BitWriter<W>) -> Result<(W, CompressReport)>
where
    R: Read + Seek,
    W: Write,
{
    let freqs = FrequencyTable::scan(input)?;
    let tree = build_tree(&freqs);
    let codes = CodeTable::from_tree(&tree)?;

    output.write_bits(MAGIC as u64, MAGIC_BITS)?;
    write_header(&tree, &mut output)?;
    let header_end = output.bits_written();

    let mut input_bytes = 0u64;
    while let Some(byte) = input.read_byte()? {
        code_for(&codes, byte as Symbol)?.write_to(&mut output)?;
        input_bytes += 1;
    }
    code_for(&codes, END_OF_STREAM)?.write_to(&mut output)?;

    let report = CompressReport {
        input_bytes,
        header_bits: header_end - MAGIC_BITS as u64,
        payload_bits: output.bits_written() - header_end,
        distinct_symbols: codes.len(),
    };
    let sink = output.close()?;

    debug!(
        input_bytes = report.input_bytes,
        header_bits = report.header_bits,
        payload_bits = report.payload_bits,
        output_bytes = report.output_bytes(),
        distinct_symbols = report.distinct_symbols,
        "compressed stream"
    );
    Ok((sink, report))
}

/// Decompress a blob from `input` into `output`.
///
/// # Errors
/// - `FormatError::BadMagic` if the first 32 bits are not [`MAGIC`]
/// - `FormatError::CorruptHeader` if the tree header cannot be rebuilt
/// - `FormatError::TruncatedStream` if input ends before the end-of-stream code
pub fn decompress<R, W>(input: &mut BitReader<R>, mut output: BitWriter<W>) -> Result<(W, DecompressReport)>
where
    R: Read,
    W: Write,
{
    let start = input.position();
    match input.read_bits(MAGIC_BITS)? {
        Some(value) if value == MAGIC as u64 => {}
        actual => {
            return Err(FormatError::BadMagic {
                expected: MAGIC,
                actual: actual.map(|value| value as u32),
            }
            .into())
        }
    }

    let tree = read_header(input)?;
    let header_end = input.position();

    let output_bytes = decode_payload(&tree, input, &mut output)?;

    let report = DecompressReport {
        output_bytes,
        header_bits: header_end - start - MAGIC_BITS as u64,
        payload_bits: input.position() - header_end,
        distinct_symbols: tree.leaf_count(),
    };
    let sink = output.close()?;

    debug!(
        output_bytes = report.output_bytes,
        header_bits = report.header_bits,
        payload_bits = report.payload_bits,
        distinct_symbols = report.distinct_symbols,
        "decompressed stream"
    );
    Ok((sink, report))
}

/// Compress an in-memory buffer.
pub fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut input = BitReader::new(Cursor::new(data));
    let (blob, _) = compress(&mut input, BitWriter::new(Vec::new()))?;
    Ok(blob)
}

/// Decompress an in-memory blob.
pub fn decompress_bytes(blob: &[u8]) -> Result<Vec<u8>> {
    let mut input = BitReader::new(Cursor::new(blob));
    let (data, _) = decompress(&mut input, BitWriter::new(Vec::new()))?;
    Ok(data)
}

/// The input changed between the two passes if a byte has no code.
fn code_for(codes: &CodeTable, symbol: Symbol) -> Result<&Code> {
    codes
        .get(symbol)
        .ok_or_else(|| CodeError::MissingCode { symbol }.into())
}

/// Decode symbols until the end-of-stream leaf, returning the number of
/// bytes written.
fn decode_payload<R: Read, W: Write>(
    root: &Node,
    input: &mut BitReader<R>,
    output: &mut BitWriter<W>,
) -> Result<u64> {
    let mut walk = SymbolWalk::new(root);
    let mut decoded = 0u64;

    while !walk.is_done() {
        let Some(bit) = input.read_bit()? else {
            return Err(FormatError::TruncatedStream {
                position: input.position(),
                decoded,
            }
            .into());
        };

        match walk.step(bit) {
            Some(END_OF_STREAM) | None => {}
            Some(symbol) => {
                output.write_bits(symbol as u64, 8)?;
                decoded += 1;
            }
        }
    }

    Ok(decoded)
}

/// Position of the decoder in the code tree.
#[derive(Debug, Clone, Copy)]
enum Walk<'t> {
    AtRoot,
    /// Inside the tree, below an internal node with these children
    AtInternal(&'t Node, &'t Node),
    Done,
}

/// Bit-driven walk from the root to a leaf and back.
///
/// A tree whose root is a leaf has only the end-of-stream symbol (the
/// header reader guarantees it is present), so such a walk starts out done
/// and consumes no bits.
#[derive(Debug)]
struct SymbolWalk<'t> {
    root: &'t Node,
    state: Walk<'t>,
}

impl<'t> SymbolWalk<'t> {
    fn new(root: &'t Node) -> Self {
        let state = if root.is_leaf() { Walk::Done } else { Walk::AtRoot };
        Self { root, state }
    }

    fn is_done(&self) -> bool {
        matches!(self.state, Walk::Done)
    }

    /// Follow one bit (0 = left, 1 = right). Returns the symbol of the leaf
    /// reached, if any; reaching the end-of-stream leaf finishes the walk.
    fn step(&mut self, bit: bool) -> Option<Symbol> {
        let (left, right) = match self.state {
            Walk::AtRoot => match self.root {
                Node::Internal { left, right, .. } => (&**left, &**right),
                Node::Leaf { .. } => return None,
            },
            Walk::AtInternal(left, right) => (left, right),
            Walk::Done => return None,
        };

        let next = if bit { right } else { left };
        match next {
            Node::Leaf { symbol, .. } => {
                self.state = if *symbol == END_OF_STREAM {
                    Walk::Done
                } else {
                    Walk::AtRoot
                };
                Some(*symbol)
            }
            Node::Internal { left, right, .. } => {
                self.state = Walk::AtInternal(&**left, &**right);
                None
            }
        }
    }
}
