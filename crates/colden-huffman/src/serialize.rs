//! Bit-level tree serialization.
//!
//! Preorder, no weights:
//!
//! ```text
//! Leaf     := 0 <symbol: 8 bits, MSB first>
//! Internal := 1 <left> <right>
//! ```

use colden_core::{Error, Result};

use crate::bits::BitBuffer;
use crate::table::MAX_CODE_BITS;
use crate::tree::{HuffmanTree, Node};

/// Serialize a tree into a fresh bit buffer.
pub fn serialize_tree(tree: &HuffmanTree) -> BitBuffer {
    // 9 bits per leaf, 1 per internal node
    let mut bits = BitBuffer::with_capacity(tree.root().node_count() * 9);
    write_node(tree.root(), &mut bits);
    bits
}

fn write_node(node: &Node, bits: &mut BitBuffer) {
    match node {
        Node::Leaf { symbol, .. } => {
            bits.push(false);
            bits.push_byte(*symbol);
        }
        Node::Internal { left, right, .. } => {
            bits.push(true);
            write_node(left, bits);
            write_node(right, bits);
        }
    }
}

/// Deserialize a tree starting at bit 0.
///
/// Returns the tree and the number of bits it occupied. Trailing bits
/// (byte padding, or whatever follows the tree) are not inspected.
pub fn deserialize_tree(bits: &BitBuffer) -> Result<(HuffmanTree, usize)> {
    let mut reader = TreeReader {
        bits,
        pos: 0,
        seen: [false; 256],
    };
    let root = reader.read_node(0)?;
    Ok((HuffmanTree::from_root(root), reader.pos))
}

struct TreeReader<'a> {
    bits: &'a BitBuffer,
    pos: usize,
    seen: [bool; 256],
}

impl TreeReader<'_> {
    fn read_node(&mut self, depth: usize) -> Result<Node> {
        if self.pos >= self.bits.len() {
            return Err(Error::truncated_tree(self.pos));
        }
        let internal = self.bits.get(self.pos)?;
        self.pos += 1;

        if !internal {
            if self.pos + 8 > self.bits.len() {
                return Err(Error::truncated_tree(self.pos));
            }
            let symbol = self.bits.read_byte(self.pos)?;
            self.pos += 8;
            if std::mem::replace(&mut self.seen[symbol as usize], true) {
                return Err(Error::invalid_tree(format!(
                    "symbol 0x{:02x} appears in more than one leaf",
                    symbol
                )));
            }
            return Ok(Node::leaf(symbol, None));
        }

        if depth >= MAX_CODE_BITS {
            return Err(Error::invalid_tree(format!(
                "nesting deeper than {} levels",
                MAX_CODE_BITS
            )));
        }
        let left = self.read_node(depth + 1)?;
        let right = self.read_node(depth + 1)?;
        Ok(Node::merge(left, right))
    }
}

impl HuffmanTree {
    /// Serialize to zero-padded bytes, as stored in an artifact header.
    pub fn to_bytes(&self) -> Vec<u8> {
        serialize_tree(self).into_bytes()
    }

    /// Deserialize from header bytes, ignoring trailing padding.
    pub fn from_serialized(bytes: &[u8]) -> Result<Self> {
        deserialize_tree(&BitBuffer::from_bytes(bytes)).map(|(tree, _)| tree)
    }
}
