//! Colden Huffman compressor.
//!
//! ## Usage
//!
//! ```bash
//! # Compress, refusing to replace an existing artifact
//! colden compress input.txt input.cld
//!
//! # Expand over an existing file and dump the tree as Graphviz
//! colden expand input.cld input.txt --force --graph tree.dot
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use colden_cli::config::parse_level;
use colden_cli::{failure_hint, run_operation, CliConfig, Operation};

#[derive(Parser, Debug)]
#[command(name = "colden")]
#[command(version)]
#[command(about = "Huffman file compressor", long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Configuration file path (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a file into an artifact
    Compress(FileArgs),
    /// Expand an artifact back into the original file
    Expand(FileArgs),
}

#[derive(ClapArgs, Debug)]
struct FileArgs {
    /// File to read
    input: PathBuf,

    /// File to create
    output: PathBuf,

    /// Also write the code tree as Graphviz DOT
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Replace the output if it exists
    #[arg(short, long)]
    force: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match CliConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("colden: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => CliConfig::default(),
    };

    // Initialize logging
    let level_name = args.log_level.as_deref().unwrap_or(&config.log_level);
    let level = parse_level(level_name);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level.unwrap_or(Level::INFO))
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("colden: failed to set tracing subscriber: {}", e);
    }
    if level.is_none() {
        warn!(level = level_name, "unknown log level, using info");
    }

    let (operation, files) = match args.command {
        Command::Compress(files) => (Operation::Compress, files),
        Command::Expand(files) => (Operation::Expand, files),
    };

    let mut options = config.pipeline_options();
    options.overwrite |= files.force;
    options.graph = files.graph;

    match run_operation(operation, files.input, files.output, options).await {
        Ok(stats) => {
            info!(
                operation = operation.name(),
                bits_per_byte = stats.bits_per_byte(),
                savings_percent = stats.savings_percent(),
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(operation = operation.name(), category = e.category(), "{}", e);
            if let Some(hint) = failure_hint(operation, &e) {
                error!("{}", hint);
            }
            ExitCode::FAILURE
        }
    }
}
