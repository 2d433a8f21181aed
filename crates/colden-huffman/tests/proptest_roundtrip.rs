//! Property-based tests for the Huffman codec.
//!
//! These tests verify that coding properties hold across a wide range of inputs:
//! - compress then expand reproduces any non-empty input
//! - tree serialization is lossless apart from weights
//! - bulk and per-byte bit writes agree at every alignment
//! - artifacts always parse back to their parts
//!
//! Run with: cargo test -p colden-huffman --test proptest_roundtrip

use proptest::prelude::*;

use colden_core::{Compressor, Decompressor};
use colden_huffman::{
    compress, decode_artifact, deserialize_tree, expand, serialize_tree, Artifact, BitBuffer,
    BitWriter, CodeTable, FrequencyTable, HuffmanCodec, HuffmanTree,
};

/// Strategy for non-empty inputs drawn from a narrow alphabet.
fn skewed_input_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop_oneof![8 => 0u8..4, 2 => 4u8..32, 1 => any::<u8>()], 1..2048)
}

/// Strategy for arbitrary non-empty inputs.
fn any_input_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..2048)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        max_shrink_iters: 200,
        ..ProptestConfig::default()
    })]

    /// Property: expanding a compressed body yields the original bytes.
    #[test]
    fn prop_body_roundtrip(data in skewed_input_strategy()) {
        let tree = HuffmanTree::from_bytes(&data).unwrap();
        let body = compress(&tree, &data).unwrap();
        prop_assert_eq!(expand(&tree, &body).unwrap(), data);
    }

    /// Property: the full artifact codec round trips arbitrary input.
    #[test]
    fn prop_codec_roundtrip(data in any_input_strategy()) {
        let codec = HuffmanCodec::new();
        let artifact = codec.compress(&data).unwrap();
        prop_assert_eq!(codec.decompress(&artifact).unwrap(), data);
    }

    /// Property: the body never exceeds the length prefix plus the optimal
    /// bit count rounded up.
    #[test]
    fn prop_body_size_matches_code_lengths(data in skewed_input_strategy()) {
        let frequencies = FrequencyTable::from_bytes(&data);
        let tree = HuffmanTree::build(&frequencies).unwrap();
        let table = CodeTable::from_tree(&tree).unwrap();
        let body = compress(&tree, &data).unwrap();

        let bits = table.encoded_bits(&frequencies);
        prop_assert_eq!(body.len() as u64, 4 + bits.div_ceil(8));
        // Never worse than 8 bits per symbol
        prop_assert!(bits <= 8 * data.len() as u64);
    }

    /// Property: deserializing a serialized tree preserves shape and symbols.
    #[test]
    fn prop_tree_serialization(data in any_input_strategy()) {
        let tree = HuffmanTree::from_bytes(&data).unwrap();
        let bits = serialize_tree(&tree);
        let (decoded, consumed) = deserialize_tree(&bits).unwrap();

        prop_assert_eq!(consumed, bits.len());
        prop_assert_eq!(decoded.to_bytes(), tree.to_bytes());
        prop_assert_eq!(decoded.root().symbols(), tree.root().symbols());
        prop_assert_eq!(decoded.root().weight(), None);
    }

    /// Property: codes are assigned to exactly the distinct input symbols.
    #[test]
    fn prop_code_table_covers_input(data in any_input_strategy()) {
        let frequencies = FrequencyTable::from_bytes(&data);
        let table = CodeTable::from_tree(&HuffmanTree::build(&frequencies).unwrap()).unwrap();
        prop_assert_eq!(table.len(), frequencies.distinct());
        for byte in 0..=255u8 {
            prop_assert_eq!(table.contains(byte), frequencies.count(byte) > 0);
        }
    }

    /// Property: write_bytes equals one write_byte per element at any alignment.
    #[test]
    fn prop_write_bytes_alignment(
        prefix in prop::collection::vec(any::<bool>(), 0..8),
        data in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut bulk = BitWriter::new(Vec::new());
        let mut single = BitWriter::new(Vec::new());
        for &bit in &prefix {
            bulk.write_bit(bit).unwrap();
            single.write_bit(bit).unwrap();
        }
        bulk.write_bytes(&data).unwrap();
        for &byte in &data {
            single.write_byte(byte).unwrap();
        }
        prop_assert_eq!(bulk.finish().unwrap(), single.finish().unwrap());
    }

    /// Property: BitWriter output equals the zero-padded BitBuffer of the same bits.
    #[test]
    fn prop_writer_matches_buffer(bits in prop::collection::vec(any::<bool>(), 0..512)) {
        let buffer: BitBuffer = bits.iter().copied().collect();
        let mut writer = BitWriter::new(Vec::new());
        for &bit in &bits {
            writer.write_bit(bit).unwrap();
        }
        prop_assert_eq!(writer.finish().unwrap(), buffer.to_bytes());
    }

    /// Property: read_byte sees any byte pushed at any offset.
    #[test]
    fn prop_read_byte_any_offset(
        prefix in prop::collection::vec(any::<bool>(), 0..16),
        value in any::<u8>(),
    ) {
        let mut buffer: BitBuffer = prefix.iter().copied().collect();
        buffer.push_byte(value);
        prop_assert_eq!(buffer.read_byte(prefix.len()).unwrap(), value);
    }

    /// Property: building then parsing an artifact recovers tree and body.
    #[test]
    fn prop_artifact_parts(data in any_input_strategy()) {
        let tree = HuffmanTree::from_bytes(&data).unwrap();
        let body = compress(&tree, &data).unwrap();
        let built = Artifact::build(&tree, &body);

        let (artifact, decoded) = decode_artifact(built.as_bytes().to_vec()).unwrap();
        prop_assert_eq!(artifact.body(), body.as_slice());
        prop_assert_eq!(decoded.to_bytes(), tree.to_bytes());
    }

    /// Property: truncating a body never panics and yields a prefix.
    #[test]
    fn prop_truncated_body_is_prefix(data in skewed_input_strategy(), cut in 4usize..64) {
        let tree = HuffmanTree::from_bytes(&data).unwrap();
        let body = compress(&tree, &data).unwrap();
        let cut = cut.min(body.len());
        let partial = expand(&tree, &body[..cut]).unwrap();
        prop_assert!(data.starts_with(&partial));
    }
}
