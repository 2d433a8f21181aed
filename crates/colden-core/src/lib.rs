//! # Colden Core
//!
//! Shared error types, codec traits, and statistics for the Colden Huffman
//! compressor.
//!
//! ## Core Traits
//!
//! - [`Compressor`] - One-shot compression into a complete artifact
//! - [`Decompressor`] - One-shot expansion of an artifact
//! - [`Codec`] - Combined compress/decompress capability
//!
//! ## Example
//!
//! ```ignore
//! use colden_core::{Codec, Compressor, Decompressor};
//! use colden_huffman::HuffmanCodec;
//!
//! let codec = HuffmanCodec::new();
//! let artifact = codec.compress(data)?;
//! let original = codec.decompress(&artifact)?;
//! ```

pub mod error;
pub mod stats;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use stats::CompressionStats;
pub use traits::{Codec, Compressor, Decompressor};
pub use types::CompressionRatio;
