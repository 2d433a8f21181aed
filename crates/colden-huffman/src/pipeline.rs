//! File-to-file compression and expansion.
//!
//! Compression streams the input twice (once to count, once to encode) and
//! never holds it in memory. Expansion reads the whole artifact, since the
//! header must be located before any body bit can be decoded.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

use colden_core::{CompressionStats, Error, Result};
use tracing::{debug, info, warn};

use crate::codec::{compress_reader, expand_to};
use crate::container::{decode_artifact, Artifact, MAGIC, MARKER};
use crate::graph::write_dot;
use crate::table::CodeTable;
use crate::tree::{FrequencyTable, HuffmanTree};
use crate::writer::BitWriter;

/// Default I/O buffer size.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Smallest accepted I/O buffer size.
pub const MIN_BUFFER_SIZE: usize = 4 * 1024;

/// Largest accepted I/O buffer size.
pub const MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// Options shared by both directions.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Replace existing output files instead of failing.
    pub overwrite: bool,
    /// Buffer size for file readers and writers.
    pub buffer_size: usize,
    /// Also write the tree as Graphviz DOT to this path.
    pub graph: Option<PathBuf>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
            graph: None,
        }
    }
}

impl PipelineOptions {
    /// Set the buffer size, clamped to the accepted range.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.clamp(MIN_BUFFER_SIZE, MAX_BUFFER_SIZE);
        self
    }

    /// Allow replacing existing outputs.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Write the tree graph alongside the output.
    pub fn with_graph(mut self, path: impl Into<PathBuf>) -> Self {
        self.graph = Some(path.into());
        self
    }
}

/// Compress `input` into an artifact at `output`.
pub fn compress_file(
    input: &Path,
    output: &Path,
    options: &PipelineOptions,
) -> Result<CompressionStats> {
    let start = Instant::now();
    info!(input = %input.display(), output = %output.display(), "running compression");

    let len = fs::metadata(input)?.len();
    if len == 0 {
        return Err(Error::EmptyInput);
    }
    let len = u32::try_from(len).map_err(|_| Error::InputTooLarge { len })?;

    let frequencies = FrequencyTable::from_reader(File::open(input)?, options.buffer_size)?;
    let tree = HuffmanTree::build(&frequencies)?;
    let table = CodeTable::from_tree(&tree)?;
    info!(
        bytes = len,
        symbols = frequencies.distinct(),
        depth = tree.depth(),
        "huffman tree constructed"
    );

    if let Some(graph) = &options.graph {
        write_graph(&tree, graph, options.overwrite);
    }

    let file = create_output(output, options.overwrite)?;
    let mut sink = BufWriter::with_capacity(options.buffer_size, file);
    let header_len = Artifact::write_header(&mut sink, &tree)?;
    debug!(header_len, "artifact header written");

    let source = BufReader::with_capacity(options.buffer_size, File::open(input)?);
    let mut writer = BitWriter::new(sink);
    compress_reader(&table, source, len, &mut writer)?;
    let sink = writer.finish()?;
    sink.into_inner().map_err(|e| e.into_error())?.sync_all()?;

    let mut stats = CompressionStats::from_operation(
        len as usize,
        fs::metadata(output)?.len() as usize,
        start.elapsed().as_micros() as u64,
    );
    stats.tree_size = header_len - MAGIC.len() - MARKER.len();
    stats.distinct_symbols = frequencies.distinct();
    info!("compression done: {}", stats.summary());
    Ok(stats)
}

/// Expand the artifact at `input` into `output`.
pub fn expand_file(
    input: &Path,
    output: &Path,
    options: &PipelineOptions,
) -> Result<CompressionStats> {
    let start = Instant::now();
    info!(input = %input.display(), output = %output.display(), "running expansion");

    let bytes = fs::read(input)?;
    let compressed_size = bytes.len();
    let (artifact, tree) = decode_artifact(bytes)?;
    info!(
        marker = artifact.marker_index(),
        symbols = tree.symbol_count(),
        "artifact header decoded"
    );

    if let Some(graph) = &options.graph {
        write_graph(&tree, graph, options.overwrite);
    }

    let file = create_output(output, options.overwrite)?;
    let mut sink = BufWriter::with_capacity(options.buffer_size, file);
    let decoded = expand_to(&tree, artifact.body(), &mut sink)?;
    sink.into_inner().map_err(|e| e.into_error())?.sync_all()?;

    let mut stats = CompressionStats::from_operation(
        decoded,
        compressed_size,
        start.elapsed().as_micros() as u64,
    );
    stats.tree_size = artifact.tree_bytes().len();
    stats.distinct_symbols = tree.symbol_count();
    info!("expansion done: {}", stats.summary());
    Ok(stats)
}

fn create_output(path: &Path, overwrite: bool) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    options.open(path)
}

/// Graph output is optional: failures are logged and the operation goes on.
fn write_graph(tree: &HuffmanTree, path: &Path, overwrite: bool) {
    let result = create_output(path, overwrite)
        .and_then(|file| write_dot(tree, BufWriter::new(file)));
    match result {
        Ok(()) => info!(graph = %path.display(), "tree graph written"),
        Err(e) => warn!(
            graph = %path.display(),
            error = %e,
            "could not write tree graph, continuing"
        ),
    }
}
