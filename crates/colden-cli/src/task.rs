//! Worker-task handoff for file operations.
//!
//! Each operation runs to completion on the blocking pool and hands its
//! result back to the caller; nothing is shared while it runs.

use std::path::PathBuf;

use colden_core::{CompressionStats, Error, Result};
use colden_huffman::pipeline::{compress_file, expand_file, PipelineOptions};

/// Direction of a file operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Compress,
    Expand,
}

impl Operation {
    /// Lowercase name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Compress => "compress",
            Operation::Expand => "expand",
        }
    }
}

/// A short explanation for errors caused by a damaged or foreign input.
pub fn failure_hint(operation: Operation, error: &Error) -> Option<&'static str> {
    match operation {
        Operation::Expand if error.is_corruption() => {
            Some("input is not a valid colden artifact or has been damaged")
        }
        _ => None,
    }
}

/// Run one operation on the blocking pool and await its result.
pub async fn run_operation(
    operation: Operation,
    input: PathBuf,
    output: PathBuf,
    options: PipelineOptions,
) -> Result<CompressionStats> {
    tokio::task::spawn_blocking(move || match operation {
        Operation::Compress => compress_file(&input, &output, &options),
        Operation::Expand => expand_file(&input, &output, &options),
    })
    .await
    .map_err(|e| Error::io(format!("{} task failed: {}", operation.name(), e)))?
}
