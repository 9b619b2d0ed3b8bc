//! Symbol-to-code mapping derived from a code tree.
//!
//! A symbol's code is the path from the root to its leaf: 0 for every step
//! to a left child, 1 for every step to a right child. Because each code
//! ends at a distinct leaf, no code is a prefix of another.

use std::fmt;
use std::io::Write;

use crate::bitio::{BitWriter, MAX_BITS_PER_CALL};
use crate::error::{CodeError, Result};
use crate::tree::{Node, Symbol, ALPHABET_SIZE};

/// Longest code a [`Code`] can hold.
///
/// With 64-bit counts no Huffman tree gets anywhere close: a leaf at depth
/// `d` needs a total weight of at least the `d+2`th Fibonacci number.
pub const MAX_CODE_LEN: usize = 128;

/// A variable-length code word, stored right-aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Code {
    bits: u128,
    len: u8,
}

impl Code {
    /// The zero-length code (a tree made of one leaf).
    pub const EMPTY: Code = Code { bits: 0, len: 0 };

    /// Build a code from its first `len` bits, given MSB-first.
    pub(crate) fn new(bits: u128, len: usize) -> Self {
        debug_assert!(len <= MAX_CODE_LEN);
        Self {
            bits,
            len: len as u8,
        }
    }

    /// This code with one more bit appended.
    fn push(self, bit: bool) -> Self {
        Self::new((self.bits << 1) | bit as u128, self.len() + 1)
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bit `index`, counting from the first bit of the code.
    pub fn bit(&self, index: usize) -> bool {
        (self.bits >> (self.len() - 1 - index)) & 1 == 1
    }

    /// Whether this code is a prefix of `other` (every code is a prefix of itself).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        if self.len > other.len {
            return false;
        }
        let shift = (other.len - self.len) as u32;
        other.bits.checked_shr(shift).unwrap_or(0) == self.bits
    }

    /// Append this code to `out`, splitting it into bit-channel sized pieces.
    pub fn write_to<W: Write>(&self, out: &mut BitWriter<W>) -> Result<()> {
        let mut remaining = self.len();
        while remaining > 0 {
            let take = remaining.min(MAX_BITS_PER_CALL);
            let shift = remaining - take;
            let piece = (self.bits >> shift) as u64 & mask64(take);
            out.write_bits(piece, take)?;
            remaining -= take;
        }
        Ok(())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len() {
            f.write_str(if self.bit(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

fn mask64(bits: usize) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Code for every leaf of a tree, indexed by symbol.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: Vec<Option<Code>>,
}

impl CodeTable {
    /// Derive the code of every leaf reachable from `root`.
    ///
    /// # Errors
    /// `CodeError::CodeTooLong` if a leaf lies deeper than [`MAX_CODE_LEN`].
    pub fn from_tree(root: &Node) -> Result<Self> {
        let mut table = Self {
            codes: vec![None; ALPHABET_SIZE],
        };
        table.assign(root, Code::EMPTY)?;
        Ok(table)
    }

    fn assign(&mut self, node: &Node, path: Code) -> Result<()> {
        match node {
            Node::Leaf { symbol, .. } => {
                if let Some(slot) = self.codes.get_mut(*symbol as usize) {
                    *slot = Some(path);
                }
                Ok(())
            }
            Node::Internal { left, right, .. } => {
                if path.len() == MAX_CODE_LEN {
                    return Err(CodeError::CodeTooLong {
                        symbol: first_symbol(node),
                        length: path.len() + 1,
                        max: MAX_CODE_LEN,
                    }
                    .into());
                }
                self.assign(left, path.push(false))?;
                self.assign(right, path.push(true))
            }
        }
    }

    /// Code for `symbol`, if the tree has a leaf for it.
    pub fn get(&self, symbol: Symbol) -> Option<&Code> {
        self.codes.get(symbol as usize).and_then(Option::as_ref)
    }

    /// All assigned codes in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_ref().map(|c| (symbol as Symbol, c)))
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Leftmost leaf symbol below `node`, used to name a too-deep subtree.
fn first_symbol(node: &Node) -> Symbol {
    match node {
        Node::Leaf { symbol, .. } => *symbol,
        Node::Internal { left, .. } => first_symbol(left),
    }
}
