//! Tree header serialization.
//!
//! The header is a preorder walk of the code tree:
//!
//! ```text
//! internal node:  0 <left subtree> <right subtree>
//! leaf:           1 <symbol: 9 bits, MSB first>
//! ```
//!
//! Nine bits are needed because symbols run from 0 to 256 inclusive. Leaf
//! weights are not transmitted; a decoded tree carries weight 0 throughout.
//! For the tree built from `"AAB"` the header is 32 bits:
//!
//! ```text
//! 0 1 001000001 0 1 001000010 1 100000000
//!   'A'             'B'         end marker
//! ```

use std::io::{Read, Write};

use crate::bitio::{BitReader, BitWriter};
use crate::error::{FormatError, HeaderFault, Result};
use crate::tree::{Node, ALPHABET_SIZE, END_OF_STREAM};

/// Width of a leaf symbol in the header.
pub const SYMBOL_BITS: usize = 9;

/// Deepest level a leaf can sit at in a tree over the full alphabet.
pub const MAX_TREE_DEPTH: usize = ALPHABET_SIZE - 1;

/// Append the preorder encoding of `root` to `out`.
pub fn write_header<W: Write>(root: &Node, out: &mut BitWriter<W>) -> Result<()> {
    match root {
        Node::Leaf { symbol, .. } => {
            out.write_bit(true)?;
            out.write_bits(*symbol as u64, SYMBOL_BITS)
        }
        Node::Internal { left, right, .. } => {
            out.write_bit(false)?;
            write_header(left, out)?;
            write_header(right, out)
        }
    }
}

/// Number of bits [`write_header`] emits for `root`.
pub fn header_bits(root: &Node) -> u64 {
    match root {
        Node::Leaf { .. } => 1 + SYMBOL_BITS as u64,
        Node::Internal { left, right, .. } => 1 + header_bits(left) + header_bits(right),
    }
}

/// Rebuild a code tree from its preorder encoding.
///
/// # Errors
/// `FormatError::CorruptHeader` if the input ends mid-header, or if the
/// encoded tree could not have come from a valid alphabet: a symbol above
/// 256, a symbol on two leaves, more than [`MAX_TREE_DEPTH`] levels, or no
/// end-of-stream leaf.
pub fn read_header<R: Read>(input: &mut BitReader<R>) -> Result<Node> {
    let mut reader = HeaderReader {
        input,
        seen: [false; ALPHABET_SIZE],
    };
    let root = reader.read_node(0)?;

    if !reader.seen[END_OF_STREAM as usize] {
        return Err(reader.corrupt(HeaderFault::MissingEndMarker));
    }
    Ok(root)
}

struct HeaderReader<'a, R: Read> {
    input: &'a mut BitReader<R>,
    /// Symbols already placed on a leaf
    seen: [bool; ALPHABET_SIZE],
}

impl<R: Read> HeaderReader<'_, R> {
    fn read_node(&mut self, depth: usize) -> Result<Node> {
        if depth > MAX_TREE_DEPTH {
            return Err(self.corrupt(HeaderFault::TooDeep(MAX_TREE_DEPTH)));
        }

        let Some(is_leaf) = self.input.read_bit()? else {
            return Err(self.corrupt(HeaderFault::UnexpectedEof));
        };

        if !is_leaf {
            let left = self.read_node(depth + 1)?;
            let right = self.read_node(depth + 1)?;
            return Ok(Node::merge(left, right));
        }

        let Some(raw) = self.input.read_bits(SYMBOL_BITS)? else {
            return Err(self.corrupt(HeaderFault::UnexpectedEof));
        };
        let symbol = raw as u16;
        if symbol > END_OF_STREAM {
            return Err(self.corrupt(HeaderFault::SymbolOutOfRange(symbol)));
        }
        if std::mem::replace(&mut self.seen[symbol as usize], true) {
            return Err(self.corrupt(HeaderFault::DuplicateSymbol(symbol)));
        }
        Ok(Node::leaf(symbol, 0))
    }

    fn corrupt(&self, fault: HeaderFault) -> crate::error::Error {
        FormatError::CorruptHeader {
            position: self.input.position(),
            fault,
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::frequency::FrequencyTable;
    use crate::tree::{build_tree, Symbol};
    use std::io::Cursor;

    fn encode(root: &Node) -> Vec<u8> {
        let mut writer = BitWriter::new(Vec::new());
        write_header(root, &mut writer).unwrap();
        assert_eq!(writer.bits_written(), header_bits(root));
        writer.close().unwrap()
    }

    fn decode(bytes: Vec<u8>) -> Result<Node> {
        read_header(&mut BitReader::new(Cursor::new(bytes)))
    }

    /// Encode a raw bit string such as "0 1 001000001" (spaces ignored).
    fn bits(text: &str) -> Vec<u8> {
        let mut writer = BitWriter::new(Vec::new());
        for c in text.chars().filter(|c| !c.is_whitespace()) {
            writer.write_bit(c == '1').unwrap();
        }
        writer.close().unwrap()
    }

    fn fault_of(result: Result<Node>) -> HeaderFault {
        match result {
            Err(Error::Format(FormatError::CorruptHeader { fault, .. })) => fault,
            other => panic!("expected corrupt header, got {other:?}"),
        }
    }

    #[test]
    fn test_aab_layout() {
        let tree = build_tree(&FrequencyTable::from_bytes(b"AAB"));
        let expected = bits("0 1 001000001 0 1 001000010 1 100000000");
        assert_eq!(encode(&tree), expected);
        assert_eq!(header_bits(&tree), 32);
    }

    #[test]
    fn test_round_trip_preserves_shape() {
        let tree = build_tree(&FrequencyTable::from_bytes(
            b"It was the best of times, it was the worst of times",
        ));
        let decoded = decode(encode(&tree)).unwrap();

        assert_eq!(decoded.leaf_depths(), tree.leaf_depths());
        assert_eq!(decoded.weight(), 0);
    }

    #[test]
    fn test_single_leaf() {
        let tree = Node::leaf(END_OF_STREAM, 1);
        assert_eq!(header_bits(&tree), 10);
        assert_eq!(decode(encode(&tree)).unwrap(), Node::leaf(END_OF_STREAM, 0));
    }

    #[test]
    fn test_full_alphabet() {
        let data: Vec<u8> = (0..=255).collect();
        let tree = build_tree(&FrequencyTable::from_bytes(&data));
        let decoded = decode(encode(&tree)).unwrap();

        assert_eq!(decoded.leaf_count(), 257);
        assert_eq!(decoded.leaf_depths(), tree.leaf_depths());
    }

    #[test]
    fn test_truncated_header() {
        let full = bits("0 1 001000001 0 1 001000010 1 100000000");
        // Keep two of the four bytes: 'B' loses most of its symbol
        let result = decode(full[..2].to_vec());
        assert_eq!(fault_of(result), HeaderFault::UnexpectedEof);

        assert_eq!(fault_of(decode(Vec::new())), HeaderFault::UnexpectedEof);
    }

    #[test]
    fn test_symbol_out_of_range() {
        let result = decode(bits("1 111111111"));
        assert_eq!(fault_of(result), HeaderFault::SymbolOutOfRange(511));
    }

    #[test]
    fn test_duplicate_symbol() {
        let result = decode(bits("0 1 100000000 1 100000000"));
        assert_eq!(fault_of(result), HeaderFault::DuplicateSymbol(END_OF_STREAM));
    }

    #[test]
    fn test_missing_end_marker() {
        let result = decode(bits("0 1 001000001 1 001000010"));
        assert_eq!(fault_of(result), HeaderFault::MissingEndMarker);
    }

    #[test]
    fn test_too_deep() {
        // 300 internal-node bits in a row can never describe a real tree
        let result = decode(vec![0u8; 300 / 8 + 1]);
        assert_eq!(fault_of(result), HeaderFault::TooDeep(MAX_TREE_DEPTH));
    }

    #[test]
    fn test_leaf_symbols_survive() {
        let tree = build_tree(&FrequencyTable::from_bytes(b"\x00\xff\x80"));
        let decoded = decode(encode(&tree)).unwrap();

        let mut symbols: Vec<Symbol> = decoded.leaf_depths().into_iter().map(|(s, _)| s).collect();
        symbols.sort_unstable();
        assert_eq!(symbols, vec![0x00, 0x80, 0xff, END_OF_STREAM]);
    }
}
