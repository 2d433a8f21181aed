//! # Colden Huffman
//!
//! Static Huffman compression with a self-describing container.
//!
//! ## Pipeline
//!
//! ```text
//! bytes -> FrequencyTable -> HuffmanTree -> serialize_tree -> header
//! bytes + CodeTable -> compress -> body
//! MAGIC | header | MARKER | body -> Artifact
//! ```
//!
//! Expansion reverses it: [`decode_artifact`] finds the header, the tree is
//! deserialized, and [`expand`] walks it bit by bit.
//!
//! ## Example
//!
//! ```ignore
//! use colden_core::{Compressor, Decompressor};
//! use colden_huffman::HuffmanCodec;
//!
//! let codec = HuffmanCodec::new();
//! let artifact = codec.compress(b"abracadabra")?;
//! assert_eq!(codec.decompress(&artifact)?, b"abracadabra");
//! ```

pub mod bits;
pub mod codec;
pub mod container;
pub mod graph;
pub mod pipeline;
pub mod serialize;
pub mod table;
pub mod tree;
pub mod writer;

pub use bits::BitBuffer;
pub use codec::{compress, compress_reader, expand, expand_to, HuffmanCodec};
pub use container::{decode_artifact, decode_header, Artifact, MAGIC, MARKER, MIN_ARTIFACT_LEN};
pub use graph::write_dot;
pub use pipeline::{compress_file, expand_file, PipelineOptions};
pub use serialize::{deserialize_tree, serialize_tree};
pub use table::{CodeTable, Codeword};
pub use tree::{FrequencyTable, HuffmanTree, Node};
pub use writer::BitWriter;
