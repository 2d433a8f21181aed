//! Huffman tree construction.
//!
//! ## Tie-breaking
//!
//! The priority queue orders nodes by `(weight, sequence)`. Leaves take
//! sequence numbers in ascending symbol order; each merged node takes the
//! next number after every node created before it. The first node popped
//! in a merge becomes the left child. The same input therefore always
//! yields the same tree.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::io::Read;

use colden_core::{Error, Result};
use tracing::debug;

/// Number of distinct byte symbols.
pub const ALPHABET_SIZE: usize = 256;

/// Occurrence count of every byte value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
    total: u64,
}

impl FrequencyTable {
    /// Create an all-zero table.
    pub fn new() -> Self {
        Self {
            counts: [0; ALPHABET_SIZE],
            total: 0,
        }
    }

    /// Count every byte in one pass.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::new();
        table.update(data);
        table
    }

    /// Count every byte of a stream without holding it in memory.
    pub fn from_reader<R: Read>(mut reader: R, buffer_size: usize) -> Result<Self> {
        let mut table = Self::new();
        let mut chunk = vec![0u8; buffer_size.max(1)];
        loop {
            let n = match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            table.update(&chunk[..n]);
        }
        Ok(table)
    }

    /// Add more bytes to the counts.
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[byte as usize] += 1;
        }
        self.total += data.len() as u64;
    }

    /// Occurrences of one symbol.
    #[inline]
    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Total bytes counted.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of symbols with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Check if nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Iterate `(symbol, count)` for present symbols, ascending by symbol.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// A node of a Huffman tree.
///
/// Weights are only known for freshly built trees; deserialized trees carry
/// `None` because weights are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        weight: Option<u64>,
    },
    Internal {
        left: Box<Node>,
        right: Box<Node>,
        weight: Option<u64>,
    },
}

impl Node {
    /// Create a leaf.
    pub fn leaf(symbol: u8, weight: Option<u64>) -> Self {
        Node::Leaf { symbol, weight }
    }

    /// Merge two subtrees under a new internal node.
    pub fn merge(left: Node, right: Node) -> Self {
        let weight = match (left.weight(), right.weight()) {
            (Some(a), Some(b)) => Some(a + b),
            _ => None,
        };
        Node::Internal {
            left: Box::new(left),
            right: Box::new(right),
            weight,
        }
    }

    /// Check for a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// The symbol of a leaf.
    pub fn symbol(&self) -> Option<u8> {
        match self {
            Node::Leaf { symbol, .. } => Some(*symbol),
            Node::Internal { .. } => None,
        }
    }

    /// Weight, if the tree was built from frequencies.
    pub fn weight(&self) -> Option<u64> {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    /// Left and right children of an internal node.
    pub fn children(&self) -> Option<(&Node, &Node)> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { left, right, .. } => Some((left, right)),
        }
    }

    /// Sorted symbols of every leaf beneath this node.
    pub fn symbols(&self) -> Vec<u8> {
        let mut symbols = Vec::new();
        self.collect_symbols(&mut symbols);
        symbols.sort_unstable();
        symbols
    }

    fn collect_symbols(&self, out: &mut Vec<u8>) {
        match self {
            Node::Leaf { symbol, .. } => out.push(*symbol),
            Node::Internal { left, right, .. } => {
                left.collect_symbols(out);
                right.collect_symbols(out);
            }
        }
    }

    /// Number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Priority queue entry; `BinaryHeap` is a max-heap, so entries are
/// wrapped in `Reverse`.
struct Pending {
    weight: u64,
    sequence: usize,
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
        (self.weight, self.sequence).cmp(&(other.weight, other.sequence))
    }
}

/// A Huffman coding tree; exclusively owns its nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Wrap an existing root.
    pub fn from_root(root: Node) -> Self {
        Self { root }
    }

    /// Count frequencies and build a tree.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::build(&FrequencyTable::from_bytes(data))
    }

    /// Build a tree from a frequency table.
    pub fn build(frequencies: &FrequencyTable) -> Result<Self> {
        if frequencies.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut heap: BinaryHeap<Reverse<Pending>> = frequencies
            .iter()
            .enumerate()
            .map(|(sequence, (symbol, count))| {
                Reverse(Pending {
                    weight: count,
                    sequence,
                    node: Node::leaf(symbol, Some(count)),
                })
            })
            .collect();
        let mut next_sequence = heap.len();

        while let Some(Reverse(first)) = heap.pop() {
            let Some(Reverse(second)) = heap.pop() else {
                let root = first.node;
                debug!(
                    symbols = frequencies.distinct(),
                    depth = root.depth(),
                    "built huffman tree"
                );
                return Ok(Self { root });
            };
            heap.push(Reverse(Pending {
                weight: first.weight + second.weight,
                sequence: next_sequence,
                node: Node::merge(first.node, second.node),
            }));
            next_sequence += 1;
        }

        // Non-empty table always leaves one node behind
        Err(Error::EmptyInput)
    }

    /// The root node.
    #[inline]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Consume the tree, returning its root.
    pub fn into_root(self) -> Node {
        self.root
    }

    /// Number of leaves (distinct symbols).
    pub fn symbol_count(&self) -> usize {
        self.root.symbols().len()
    }

    /// Longest codeword length in bits.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Check if the tree covers `symbol`.
    pub fn contains(&self, symbol: u8) -> bool {
        self.root.symbols().binary_search(&symbol).is_ok()
    }
}
