//! Huffman code tree and its construction.
//!
//! Leaves carry a symbol (a byte value or the end-of-stream marker) and its
//! weight; internal nodes own exactly two children. The builder is the
//! textbook greedy merge over a min-heap.
//!
//! # Tie-breaking
//!
//! Nodes of equal weight leave the heap in insertion order: leaves in
//! ascending symbol order first, then merged nodes in the order they were
//! created. The resulting tree is therefore reproducible for a given
//! frequency table, but other equally optimal trees exist.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::trace;

use crate::frequency::FrequencyTable;

/// An encodable unit: a byte value 0-255 or [`END_OF_STREAM`].
pub type Symbol = u16;

/// Sentinel symbol that terminates every payload.
pub const END_OF_STREAM: Symbol = 256;

/// Number of symbols in the alphabet (256 byte values plus the end marker).
pub const ALPHABET_SIZE: usize = 257;

/// A node of the code tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: Symbol,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn leaf(symbol: Symbol, weight: u64) -> Self {
        Node::Leaf { symbol, weight }
    }

    /// Combine two subtrees; `left` is reached with bit 0, `right` with bit 1.
    pub fn merge(left: Node, right: Node) -> Self {
        Node::Internal {
            weight: left.weight() + right.weight(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Depth of every leaf, in left-to-right order.
    pub fn leaf_depths(&self) -> Vec<(Symbol, usize)> {
        let mut depths = Vec::new();
        self.collect_depths(0, &mut depths);
        depths
    }

    fn collect_depths(&self, depth: usize, out: &mut Vec<(Symbol, usize)>) {
        match self {
            Node::Leaf { symbol, .. } => out.push((*symbol, depth)),
            Node::Internal { left, right, .. } => {
                left.collect_depths(depth + 1, out);
                right.collect_depths(depth + 1, out);
            }
        }
    }
}

/// Heap entry ordered by weight, then by insertion sequence.
#[derive(Debug)]
struct Pending {
    weight: u64,
    seq: usize,
    node: Node,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Build an optimal code tree from symbol counts.
///
/// Every symbol with a nonzero count becomes a leaf. Since the end marker
/// is always counted, the tree has at least one leaf; with only that leaf
/// the root is the leaf itself.
pub fn build_tree(freqs: &FrequencyTable) -> Node {
    let mut heap: BinaryHeap<Reverse<Pending>> = BinaryHeap::new();
    let mut seq = 0;

    for (symbol, count) in freqs.present() {
        heap.push(Reverse(Pending {
            weight: count,
            seq,
            node: Node::leaf(symbol, count),
        }));
        seq += 1;
    }

    loop {
        let Some(Reverse(first)) = heap.pop() else {
            // Unreachable while the end marker is forced into the table
            return Node::leaf(END_OF_STREAM, 1);
        };
        let Some(Reverse(second)) = heap.pop() else {
            trace!(weight = first.weight, "built code tree");
            return first.node;
        };

        let merged = Node::merge(first.node, second.node);
        heap.push(Reverse(Pending {
            weight: merged.weight(),
            seq,
            node: merged,
        }));
        seq += 1;
    }
}
