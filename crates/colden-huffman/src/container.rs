//! Artifact container framing.
//!
//! ## Layout
//!
//! ```text
//! offset 0..4    magic   31 41 59 26
//! offset 4..N    serialized tree, zero padded to a byte
//! offset N..N+3  marker  ff ff ff
//! offset N+3..   body    (u32 BE length, packed codewords)
//! ```
//!
//! [`Artifact::parse`] locates the marker by scanning, which is what every
//! existing artifact was written for. A tree whose own bytes contain
//! `ff ff ff` defeats the scan; [`decode_artifact`] recovers from that by
//! decoding the tree directly and checking the marker right after it.

use std::io::Write;

use colden_core::{Error, Result};
use tracing::debug;

use crate::bits::BitBuffer;
use crate::serialize::deserialize_tree;
use crate::tree::HuffmanTree;

/// Leading magic number.
pub const MAGIC: [u8; 4] = [0x31, 0x41, 0x59, 0x26];

/// Separator between the tree and the body.
pub const MARKER: [u8; 3] = [0xFF; 3];

/// Smallest viable artifact: magic (4), a one-leaf tree (2), marker (3) and
/// at least one body byte, so anything of 10 bytes or fewer is rejected.
pub const MIN_ARTIFACT_LEN: usize = 11;

const TREE_OFFSET: usize = MAGIC.len();

// 256 leaves at 9 bits plus 255 internal nodes at 1 bit
const MAX_TREE_BYTES: usize = (256 * 9 + 255 + 7) / 8;

/// An immutable framed artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    bytes: Vec<u8>,
    marker_index: usize,
}

impl Artifact {
    /// Frame a tree and an already compressed body.
    pub fn build(tree: &HuffmanTree, body: &[u8]) -> Self {
        let tree_bytes = tree.to_bytes();
        let mut bytes =
            Vec::with_capacity(TREE_OFFSET + tree_bytes.len() + MARKER.len() + body.len());
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&tree_bytes);
        let marker_index = bytes.len();
        bytes.extend_from_slice(&MARKER);
        bytes.extend_from_slice(body);
        Self {
            bytes,
            marker_index,
        }
    }

    /// Split an artifact at the first marker after the magic number.
    ///
    /// The magic number itself is not checked.
    pub fn parse(bytes: Vec<u8>) -> Result<Self> {
        let marker_index = find_marker(&bytes)?;
        Ok(Self {
            bytes,
            marker_index,
        })
    }

    /// Split an artifact using the tree's own length.
    ///
    /// Validates the magic number and requires the marker immediately after
    /// the padded tree, so marker-like bytes inside the tree are harmless.
    pub fn parse_exact(bytes: Vec<u8>) -> Result<Self> {
        let (_, marker_index) = exact_header(&bytes)?;
        Ok(Self {
            bytes,
            marker_index,
        })
    }

    /// The serialized tree section.
    pub fn tree_bytes(&self) -> &[u8] {
        &self.bytes[TREE_OFFSET..self.marker_index]
    }

    /// Everything after the marker.
    pub fn body(&self) -> &[u8] {
        &self.bytes[self.marker_index + MARKER.len()..]
    }

    /// Byte offset of the marker.
    pub fn marker_index(&self) -> usize {
        self.marker_index
    }

    /// Deserialize the tree section.
    pub fn tree(&self) -> Result<HuffmanTree> {
        HuffmanTree::from_serialized(self.tree_bytes())
    }

    /// The full artifact.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the artifact, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Write magic, tree and marker; the body follows separately.
    ///
    /// Returns the number of header bytes written.
    pub fn write_header<W: Write>(mut writer: W, tree: &HuffmanTree) -> Result<usize> {
        let tree_bytes = tree.to_bytes();
        writer.write_all(&MAGIC)?;
        writer.write_all(&tree_bytes)?;
        writer.write_all(&MARKER)?;
        Ok(TREE_OFFSET + tree_bytes.len() + MARKER.len())
    }
}

/// Parse an artifact and decode its tree, recovering from a false marker.
pub fn decode_artifact(bytes: Vec<u8>) -> Result<(Artifact, HuffmanTree)> {
    let (tree, body_start) = decode_header(&bytes)?;
    let artifact = Artifact {
        bytes,
        marker_index: body_start - MARKER.len(),
    };
    Ok((artifact, tree))
}

/// Decode the header of an artifact held in memory.
///
/// Returns the tree and the offset at which the body starts.
pub fn decode_header(bytes: &[u8]) -> Result<(HuffmanTree, usize)> {
    let scanned = find_marker(bytes)?;
    match HuffmanTree::from_serialized(&bytes[TREE_OFFSET..scanned]) {
        Ok(tree) => Ok((tree, scanned + MARKER.len())),
        Err(Error::TruncatedTree { bit_offset }) => {
            debug!(
                scanned,
                bit_offset, "tree cut short by marker scan, decoding header exactly"
            );
            let (tree, marker_index) = exact_header(bytes)?;
            Ok((tree, marker_index + MARKER.len()))
        }
        Err(e) => Err(e),
    }
}

fn check_len(bytes: &[u8]) -> Result<()> {
    if bytes.len() < MIN_ARTIFACT_LEN {
        return Err(Error::TooShort { len: bytes.len() });
    }
    Ok(())
}

fn find_marker(bytes: &[u8]) -> Result<usize> {
    check_len(bytes)?;
    bytes[TREE_OFFSET..]
        .windows(MARKER.len())
        .position(|window| window == MARKER)
        .map(|pos| pos + TREE_OFFSET)
        .ok_or(Error::MarkerNotFound)
}

fn exact_header(bytes: &[u8]) -> Result<(HuffmanTree, usize)> {
    check_len(bytes)?;
    let mut found = [0u8; 4];
    found.copy_from_slice(&bytes[..TREE_OFFSET]);
    if found != MAGIC {
        return Err(Error::InvalidMagic { found });
    }

    let end = bytes.len().min(TREE_OFFSET + MAX_TREE_BYTES);
    let (tree, consumed) = deserialize_tree(&BitBuffer::from_bytes(&bytes[TREE_OFFSET..end]))?;
    let marker_index = TREE_OFFSET + consumed.div_ceil(8);
    if bytes.get(marker_index..marker_index + MARKER.len()) != Some(&MARKER[..]) {
        return Err(Error::MarkerNotFound);
    }
    Ok((tree, marker_index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{compress, expand};
    use crate::tree::Node;

    const SCENARIO: [u8; 15] = [
        0x31, 0x41, 0x59, 0x26, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x01, 0x00,
    ];

    #[test]
    fn test_scenario_parse() {
        let artifact = Artifact::parse(SCENARIO.to_vec()).unwrap();
        assert_eq!(artifact.marker_index(), 7);
        assert_eq!(artifact.tree_bytes(), &[0, 0, 0]);
        assert_eq!(artifact.body(), &[0, 0, 0, 1, 0]);

        // A lone leaf for symbol 0 and a body of length one
        let tree = artifact.tree().unwrap();
        assert_eq!(tree.root(), &Node::leaf(0, None));
        assert_eq!(expand(&tree, artifact.body()).unwrap(), vec![0]);
    }

    #[test]
    fn test_too_short() {
        for len in 0..=10 {
            let bytes = vec![0xFF; len];
            assert!(matches!(
                Artifact::parse(bytes.clone()),
                Err(Error::TooShort { len: l }) if l == len
            ));
            assert!(matches!(
                decode_artifact(bytes),
                Err(Error::TooShort { .. })
            ));
        }
    }

    #[test]
    fn test_marker_not_found() {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[0x00, 0xFF, 0xFF, 0x00, 0xFF, 0xFF, 0x01, 0x02]);
        assert!(matches!(
            Artifact::parse(bytes),
            Err(Error::MarkerNotFound)
        ));
    }

    #[test]
    fn test_marker_inside_magic_is_ignored() {
        // Scanning starts after the magic number
        let mut bytes = vec![0xFF, 0xFF, 0xFF, 0xFF];
        bytes.extend_from_slice(&[0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00]);
        let artifact = Artifact::parse(bytes).unwrap();
        assert_eq!(artifact.marker_index(), 6);
    }

    fn roundtrip_with_leaves(data: &[u8], leaves: usize) {
        let tree = HuffmanTree::from_bytes(data).unwrap();
        assert_eq!(tree.symbol_count(), leaves);
        let body = compress(&tree, data).unwrap();
        let built = Artifact::build(&tree, &body);

        let parsed = Artifact::parse(built.as_bytes().to_vec()).unwrap();
        assert_eq!(parsed, built);
        assert_eq!(parsed.tree_bytes(), tree.to_bytes().as_slice());
        assert_eq!(parsed.body(), body.as_slice());

        let decoded = parsed.tree().unwrap();
        assert_eq!(expand(&decoded, parsed.body()).unwrap(), data);
    }

    #[test]
    fn test_parse_build_identity() {
        roundtrip_with_leaves(b"zzzzzz", 1);
        roundtrip_with_leaves(b"xyyyxy", 2);
        let all: Vec<u8> = (0..=255u8).cycle().take(1024).collect();
        roundtrip_with_leaves(&all, 256);
    }

    #[test]
    fn test_write_header_matches_build() {
        let tree = HuffmanTree::from_bytes(b"header").unwrap();
        let mut header = Vec::new();
        let n = Artifact::write_header(&mut header, &tree).unwrap();
        assert_eq!(n, header.len());

        let built = Artifact::build(&tree, &[9, 9]);
        assert_eq!(&built.as_bytes()[..n], header.as_slice());
        assert_eq!(built.marker_index(), n - MARKER.len());
    }

    /// A left spine of 30 internal nodes serializes to 30 leading 1 bits,
    /// so the tree bytes begin with `ff ff ff`.
    fn spine_tree() -> HuffmanTree {
        let mut node = Node::leaf(0, None);
        for symbol in 1..=30u8 {
            node = Node::merge(node, Node::leaf(symbol, None));
        }
        HuffmanTree::from_root(node)
    }

    #[test]
    fn test_false_marker_recovery() {
        let tree = spine_tree();
        assert_eq!(&tree.to_bytes()[..3], &MARKER);

        let data: Vec<u8> = (0..=30u8).cycle().take(200).collect();
        let body = compress(&tree, &data).unwrap();
        let built = Artifact::build(&tree, &body);

        // The plain scan stops at the false marker
        let scanned = Artifact::parse(built.as_bytes().to_vec()).unwrap();
        assert_eq!(scanned.marker_index(), 4);
        assert!(matches!(scanned.tree(), Err(Error::TruncatedTree { .. })));

        let exact = Artifact::parse_exact(built.as_bytes().to_vec()).unwrap();
        assert_eq!(exact.marker_index(), built.marker_index());

        let (artifact, decoded) = decode_artifact(built.into_bytes()).unwrap();
        assert_eq!(artifact.body(), body.as_slice());
        assert_eq!(expand(&decoded, artifact.body()).unwrap(), data);
    }

    #[test]
    fn test_parse_exact_checks_magic() {
        let mut bytes = SCENARIO.to_vec();
        bytes[0] = 0x30;
        assert!(matches!(
            Artifact::parse_exact(bytes.clone()),
            Err(Error::InvalidMagic { found: [0x30, 0x41, 0x59, 0x26] })
        ));
        // The compatible scan does not look at the magic
        assert!(Artifact::parse(bytes).is_ok());
    }

    #[test]
    fn test_parse_exact_requires_adjacent_marker() {
        // A leaf tree pads to 2 bytes; this header carries a third
        assert!(matches!(
            Artifact::parse_exact(SCENARIO.to_vec()),
            Err(Error::MarkerNotFound)
        ));

        let mut bytes = SCENARIO.to_vec();
        bytes.remove(6);
        let artifact = Artifact::parse_exact(bytes).unwrap();
        assert_eq!(artifact.marker_index(), 6);
        assert_eq!(artifact.body(), &[0, 0, 0, 1, 0]);
    }
}
