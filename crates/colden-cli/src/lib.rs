//! Colden command-line front end.
//!
//! Compresses and expands files through the `colden-huffman` pipeline,
//! one blocking worker task per invocation.
//!
//! ## Usage
//!
//! ```bash
//! colden compress notes.txt notes.cld --graph notes.dot
//! colden expand notes.cld notes.txt --force
//!
//! # Settings from a JSON file, verbose logs
//! colden --config colden.json --log-level debug compress big.bin big.cld
//! ```

pub mod config;
pub mod task;

pub use config::CliConfig;
pub use task::{failure_hint, run_operation, Operation};
