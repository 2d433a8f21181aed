//! Compression and expansion of artifact bodies, and the whole-artifact
//! [`HuffmanCodec`].
//!
//! ## Body Format
//!
//! ```text
//! original length: u32, big endian
//! codewords:       one per input byte, MSB first, zero padded
//! ```

use std::io::{self, Read, Write};
use std::time::Instant;

use colden_core::{Codec, CompressionStats, Compressor, Decompressor, Error, Result};
use tracing::{debug, warn};

use crate::container::{decode_header, Artifact};
use crate::table::CodeTable;
use crate::tree::{HuffmanTree, Node};
use crate::writer::BitWriter;

/// Bytes in the length prefix of a body.
pub const LENGTH_PREFIX: usize = 4;

const CHUNK_SIZE: usize = 8 * 1024;

/// Compress `input` with `tree` into a body.
pub fn compress(tree: &HuffmanTree, input: &[u8]) -> Result<Vec<u8>> {
    let len = checked_len(input.len() as u64)?;
    let table = CodeTable::from_tree(tree)?;

    let mut writer = BitWriter::new(Vec::with_capacity(LENGTH_PREFIX + input.len() / 2));
    writer.write_u32(len)?;
    for &byte in input {
        writer.write_codeword(table.get(byte)?)?;
    }
    let body = writer.finish()?;

    debug!(
        input = input.len(),
        body = body.len(),
        "compressed body"
    );
    Ok(body)
}

/// Stream exactly `len` bytes from `reader` into `writer` as a body.
///
/// The writer is left unfinished so callers can decide when to pad; a
/// stream that ends early fails with an `UnexpectedEof` I/O error.
pub fn compress_reader<R: Read, W: Write>(
    table: &CodeTable,
    mut reader: R,
    len: u32,
    writer: &mut BitWriter<W>,
) -> Result<()> {
    writer.write_u32(len)?;

    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut remaining = len as usize;
    while remaining > 0 {
        let want = remaining.min(chunk.len());
        reader.read_exact(&mut chunk[..want])?;
        for &byte in &chunk[..want] {
            writer.write_codeword(table.get(byte)?)?;
        }
        remaining -= want;
    }
    Ok(())
}

/// Expand a body with `tree`.
pub fn expand(tree: &HuffmanTree, body: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    expand_to(tree, body, &mut output)?;
    Ok(output)
}

/// Expand a body into `output`, returning the number of bytes decoded.
///
/// A body whose codewords run out before the declared length is decoded
/// as far as possible; the shortfall is logged, not reported as an error.
pub fn expand_to<W: Write>(tree: &HuffmanTree, body: &[u8], mut output: W) -> Result<usize> {
    if body.len() < LENGTH_PREFIX {
        return Err(Error::truncated_data(LENGTH_PREFIX, body.len()));
    }
    let (prefix, packed) = body.split_at(LENGTH_PREFIX);
    let expected = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;

    let decoded = match tree.root() {
        Node::Leaf { symbol, .. } => write_run(&mut output, *symbol, expected)?,
        root => decode_walk(root, packed, expected, &mut output)?,
    };
    output.flush()?;

    if decoded < expected {
        warn!(
            decoded,
            expected, "body ended before the declared length, output truncated"
        );
    }
    Ok(decoded)
}

/// A single-leaf tree has zero-length codewords: emit the symbol `count`
/// times without reading any bits.
fn write_run<W: Write>(output: &mut W, symbol: u8, count: usize) -> io::Result<usize> {
    let chunk = [symbol; CHUNK_SIZE];
    let mut remaining = count;
    while remaining > 0 {
        let n = remaining.min(CHUNK_SIZE);
        output.write_all(&chunk[..n])?;
        remaining -= n;
    }
    Ok(count)
}

fn decode_walk<W: Write>(
    root: &Node,
    packed: &[u8],
    expected: usize,
    output: &mut W,
) -> io::Result<usize> {
    let mut bits = packed
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1));

    let mut buf = Vec::with_capacity(CHUNK_SIZE.min(expected));
    let mut decoded = 0;
    'symbols: while decoded < expected {
        let mut node = root;
        while let Node::Internal { left, right, .. } = node {
            node = match bits.next() {
                Some(false) => left,
                Some(true) => right,
                None => break 'symbols,
            };
        }
        if let Node::Leaf { symbol, .. } = node {
            buf.push(*symbol);
        }
        decoded += 1;
        if buf.len() == CHUNK_SIZE {
            output.write_all(&buf)?;
            buf.clear();
        }
    }
    output.write_all(&buf)?;
    Ok(decoded)
}

fn checked_len(len: u64) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::InputTooLarge { len })
}

/// Whole-artifact Huffman codec.
///
/// Builds a tree per input, so every artifact is self-describing.
#[derive(Debug, Clone, Default)]
pub struct HuffmanCodec;

impl HuffmanCodec {
    /// Create a new codec.
    pub fn new() -> Self {
        HuffmanCodec
    }

    /// Compress and report sizes and timing.
    pub fn compress_with_stats(&self, input: &[u8]) -> Result<(Vec<u8>, CompressionStats)> {
        let start = Instant::now();
        let tree = HuffmanTree::from_bytes(input)?;
        let body = compress(&tree, input)?;
        let artifact = Artifact::build(&tree, &body);

        let mut stats = CompressionStats::from_operation(
            input.len(),
            artifact.as_bytes().len(),
            start.elapsed().as_micros() as u64,
        );
        stats.tree_size = artifact.tree_bytes().len();
        stats.distinct_symbols = tree.symbol_count();
        debug!(summary = %stats.summary(), "compressed artifact");

        Ok((artifact.into_bytes(), stats))
    }
}

impl Compressor for HuffmanCodec {
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let tree = HuffmanTree::from_bytes(input)?;
        let body = compress(&tree, input)?;
        Ok(Artifact::build(&tree, &body).into_bytes())
    }
}

impl Decompressor for HuffmanCodec {
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let (tree, body_start) = decode_header(input)?;
        expand(&tree, &input[body_start..])
    }
}

impl Codec for HuffmanCodec {
    fn new() -> Self {
        HuffmanCodec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: [u8; 10] = [0, 0, 0, 0, 1, 1, 1, 2, 2, 3];

    #[test]
    fn test_scenario_body() {
        let tree = HuffmanTree::from_bytes(&SCENARIO).unwrap();
        let body = compress(&tree, &SCENARIO).unwrap();

        // 0 0 0 0 10 10 10 111 111 110 -> 19 bits
        assert_eq!(
            body,
            vec![0, 0, 0, 10, 0b0000_1010, 0b1011_1111, 0b1100_0000]
        );
        assert!(body.len() > 4);
        assert_eq!(expand(&tree, &body).unwrap(), SCENARIO.to_vec());
    }

    #[test]
    fn test_degenerate_alphabet() {
        let data = vec![b'q'; 1000];
        let tree = HuffmanTree::from_bytes(&data).unwrap();
        let body = compress(&tree, &data).unwrap();

        // Only the length prefix: every codeword is empty
        assert_eq!(body, 1000u32.to_be_bytes().to_vec());
        assert_eq!(expand(&tree, &body).unwrap(), data);
    }

    #[test]
    fn test_unknown_symbol() {
        let tree = HuffmanTree::from_bytes(b"abc").unwrap();
        assert!(matches!(
            compress(&tree, b"abz"),
            Err(Error::UnknownSymbol { symbol: b'z' })
        ));
    }

    #[test]
    fn test_expand_short_body() {
        let tree = HuffmanTree::from_bytes(b"ab").unwrap();
        assert!(matches!(
            expand(&tree, &[0, 0, 1]),
            Err(Error::TruncatedData {
                needed: 4,
                available: 3
            })
        ));
    }

    #[test]
    fn test_expand_truncates_silently() {
        let tree = HuffmanTree::from_bytes(&SCENARIO).unwrap();
        let mut body = compress(&tree, &SCENARIO).unwrap();
        body.truncate(5);
        // 8 bits left: 0 0 0 0 10 10 -> six symbols
        assert_eq!(expand(&tree, &body).unwrap(), vec![0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_expand_to_counts_bytes() {
        let data = b"she sells sea shells by the sea shore";
        let tree = HuffmanTree::from_bytes(data).unwrap();
        let body = compress(&tree, data).unwrap();

        let mut out = Vec::new();
        let n = expand_to(&tree, &body, &mut out).unwrap();
        assert_eq!(n, data.len());
        assert_eq!(out, data.to_vec());
    }

    #[test]
    fn test_compress_reader_matches_slice() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 17 + i % 5) as u8).collect();
        let tree = HuffmanTree::from_bytes(&data).unwrap();
        let table = CodeTable::from_tree(&tree).unwrap();

        let mut writer = BitWriter::new(Vec::new());
        compress_reader(&table, &data[..], data.len() as u32, &mut writer).unwrap();
        assert_eq!(writer.finish().unwrap(), compress(&tree, &data).unwrap());
    }

    #[test]
    fn test_compress_reader_short_stream() {
        let tree = HuffmanTree::from_bytes(b"abc").unwrap();
        let table = CodeTable::from_tree(&tree).unwrap();
        let mut writer = BitWriter::new(Vec::new());
        let err = compress_reader(&table, &b"abc"[..], 4, &mut writer).unwrap_err();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_input_too_large() {
        assert!(matches!(
            checked_len(u32::MAX as u64 + 1),
            Err(Error::InputTooLarge { .. })
        ));
        assert_eq!(checked_len(u32::MAX as u64).unwrap(), u32::MAX);
    }

    #[test]
    fn test_codec_roundtrip() {
        let codec = HuffmanCodec::new();
        let data = b"abracadabra abracadabra abracadabra";
        let artifact = codec.compress(data).unwrap();
        assert_eq!(&artifact[..4], &[0x31, 0x41, 0x59, 0x26]);
        assert_eq!(codec.decompress(&artifact).unwrap(), data.to_vec());
        assert!(codec.verify_roundtrip(data).unwrap());
    }

    #[test]
    fn test_codec_empty_input() {
        assert!(matches!(
            HuffmanCodec::new().compress(&[]),
            Err(Error::EmptyInput)
        ));
    }

    #[test]
    fn test_compress_with_stats() {
        let data = vec![b'x'; 4096];
        let (artifact, stats) = HuffmanCodec::new().compress_with_stats(&data).unwrap();
        assert_eq!(stats.original_size, 4096);
        assert_eq!(stats.compressed_size, artifact.len());
        // leaf tree: 9 bits -> 2 bytes; 4 magic + 2 + 3 marker + 4 length
        assert_eq!(stats.tree_size, 2);
        assert_eq!(artifact.len(), 13);
        assert_eq!(stats.distinct_symbols, 1);
        assert!(stats.ratio().is_effective());
    }
}
