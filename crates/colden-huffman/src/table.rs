//! Flattened symbol -> codeword table.
//!
//! Built once per compression pass by a single depth-first walk over the
//! tree, so encoding a byte is one array lookup instead of a tree descent.

use colden_core::{Error, Result};

use crate::bits::BitBuffer;
use crate::tree::{HuffmanTree, Node};

/// Deepest codeword a 256-symbol tree can produce.
pub const MAX_CODE_BITS: usize = 255;

const WORDS: usize = (MAX_CODE_BITS + 1) / 32;

/// Up to 32 codeword bits, right-aligned in `bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub bits: u32,
    pub len: u8,
}

/// A root-to-leaf path: left edges are `0`, right edges are `1`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Codeword {
    // MSB-first, 32 bits per word
    words: [u32; WORDS],
    len: u16,
}

impl Codeword {
    /// The zero-length codeword of a single-leaf tree.
    pub const EMPTY: Codeword = Codeword {
        words: [0; WORDS],
        len: 0,
    };

    /// Number of bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Check for the zero-length codeword.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read bit `index` (0 = first edge from the root).
    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        debug_assert!(index < self.len());
        self.words[index / 32] & (0x8000_0000 >> (index % 32)) != 0
    }

    /// Split into chunks of at most 32 bits, in order.
    pub fn chunks(&self) -> impl Iterator<Item = Chunk> + '_ {
        let len = self.len();
        (0..len.div_ceil(32)).map(move |i| {
            let width = (len - i * 32).min(32);
            Chunk {
                bits: if width == 32 {
                    self.words[i]
                } else {
                    self.words[i] >> (32 - width)
                },
                len: width as u8,
            }
        })
    }

    /// Copy the bits into a [`BitBuffer`].
    pub fn to_bits(&self) -> BitBuffer {
        (0..self.len()).map(|i| self.bit(i)).collect()
    }

    fn push(&mut self, bit: bool) {
        let index = self.len as usize;
        let mask = 0x8000_0000 >> (index % 32);
        if bit {
            self.words[index / 32] |= mask;
        } else {
            self.words[index / 32] &= !mask;
        }
        self.len += 1;
    }

    fn pop(&mut self) {
        self.len -= 1;
    }
}

impl std::fmt::Debug for Codeword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Codeword(")?;
        for i in 0..self.len() {
            write!(f, "{}", self.bit(i) as u8)?;
        }
        write!(f, ")")
    }
}

/// Symbol -> codeword lookup for one compression pass.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: [Option<Codeword>; 256],
}

impl CodeTable {
    /// Flatten a tree with one depth-first traversal.
    pub fn from_tree(tree: &HuffmanTree) -> Result<Self> {
        let mut table = CodeTable { codes: [None; 256] };
        let mut path = Codeword::EMPTY;
        table.visit(tree.root(), &mut path, 0)?;
        Ok(table)
    }

    fn visit(&mut self, node: &Node, path: &mut Codeword, depth: usize) -> Result<()> {
        match node {
            Node::Leaf { symbol, .. } => {
                self.codes[*symbol as usize] = Some(*path);
                Ok(())
            }
            Node::Internal { left, right, .. } => {
                if depth >= MAX_CODE_BITS {
                    return Err(Error::invalid_tree(format!(
                        "codeword longer than {} bits",
                        MAX_CODE_BITS
                    )));
                }
                path.push(false);
                self.visit(left, path, depth + 1)?;
                path.pop();
                path.push(true);
                self.visit(right, path, depth + 1)?;
                path.pop();
                Ok(())
            }
        }
    }

    /// Look up a symbol's codeword.
    #[inline]
    pub fn get(&self, symbol: u8) -> Result<&Codeword> {
        self.codes[symbol as usize]
            .as_ref()
            .ok_or(Error::UnknownSymbol { symbol })
    }

    /// Check whether the tree covers `symbol`.
    #[inline]
    pub fn contains(&self, symbol: u8) -> bool {
        self.codes[symbol as usize].is_some()
    }

    /// Number of symbols with a codeword.
    pub fn len(&self) -> usize {
        self.codes.iter().filter(|code| code.is_some()).count()
    }

    /// Check if the table covers no symbols.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate `(symbol, codeword)` in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Codeword)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_ref().map(|c| (symbol as u8, c)))
    }

    /// Total encoded size in bits for data with the given frequencies.
    pub fn encoded_bits(&self, frequencies: &crate::tree::FrequencyTable) -> u64 {
        self.iter()
            .map(|(symbol, code)| frequencies.count(symbol) * code.len() as u64)
            .sum()
    }
}
