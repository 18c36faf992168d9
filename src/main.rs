//! Heapdump Summarizer CLI
//!
//! Exports heap snapshot contents and aggregates to a document store or
//! NDJSON file, and explains which GC roots keep objects alive.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use heapdump_summarizer::commands::{
    display_version, execute_root_path, execute_summarize, inspect_export_file, validate_args,
    RootPathArgs, SummarizeArgs,
};
use heapdump_summarizer::retention::SearchOrder;
use heapdump_summarizer::utils::config::DEFAULT_DATABASE_NAME;

/// Heapdump Summarizer - memory statistics and GC root paths
#[derive(Parser, Debug)]
#[command(name = "heapdump-summarizer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Export a snapshot's records and aggregates
    Summarize {
        /// Heap snapshot file
        #[arg(short, long)]
        dump: PathBuf,

        /// Document store URL (http/https) or output directory
        #[arg(short, long, env = "HEAPDUMP_SUMMARIZER_URL")]
        url: String,

        /// Database name (file stem for directory output)
        #[arg(long, default_value = DEFAULT_DATABASE_NAME)]
        database_name: String,

        /// Attach a GC root path to every object
        #[arg(long)]
        root_paths: bool,

        /// Attach GC root paths only to types containing this text
        #[arg(long)]
        root_path_type: Option<String>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Find the GC roots keeping objects alive
    RootPath {
        /// Heap snapshot file
        #[arg(short, long)]
        dump: PathBuf,

        /// Object address (hex with 0x, or decimal); repeatable
        #[arg(short, long = "object", required = true)]
        objects: Vec<String>,

        /// Walk depth-first instead of finding the shortest chain
        #[arg(long)]
        depth_first: bool,

        /// Expansions allowed per object
        #[arg(long)]
        max_steps: Option<usize>,
    },

    /// Validate an NDJSON export and count its documents
    Inspect {
        /// Path to export file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Summarize {
            dump,
            url,
            database_name,
            root_paths,
            root_path_type,
            summary,
        } => {
            let args = SummarizeArgs {
                dump,
                url,
                database_name,
                root_paths,
                root_path_type,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            execute_summarize(args)?;
        }

        Commands::RootPath {
            dump,
            objects,
            depth_first,
            max_steps,
        } => {
            let order = if depth_first {
                SearchOrder::DepthFirst
            } else {
                SearchOrder::BreadthFirst
            };

            execute_root_path(RootPathArgs {
                dump,
                objects,
                order,
                max_steps,
            })?;
        }

        Commands::Inspect { file } => {
            inspect_export_file(&file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
