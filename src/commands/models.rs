use crate::retention::SearchOrder;
use crate::utils::config::DEFAULT_DATABASE_NAME;
use std::path::PathBuf;

/// Arguments for the summarize command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct SummarizeArgs {
    /// Snapshot file to summarize
    pub dump: PathBuf,

    /// Destination: an http(s) document store URL or an output directory
    pub url: String,

    /// Database (or file stem) the records are written to
    pub database_name: String,

    /// Resolve a root path for every object
    pub root_paths: bool,

    /// Resolve root paths only for types containing this text
    pub root_path_type: Option<String>,

    /// Print a text summary to stdout
    pub print_summary: bool,
}

impl Default for SummarizeArgs {
    fn default() -> Self {
        Self {
            dump: PathBuf::from("heap.json"),
            url: ".".to_string(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            root_paths: false,
            root_path_type: None,
            print_summary: false,
        }
    }
}

/// Arguments for the root-path command
#[derive(Debug, Clone)]
pub struct RootPathArgs {
    pub dump: PathBuf,

    /// Object addresses, hex (`0x...`) or decimal
    pub objects: Vec<String>,

    pub order: SearchOrder,

    /// Overrides the default step budget
    pub max_steps: Option<usize>,
}

impl Default for RootPathArgs {
    fn default() -> Self {
        Self {
            dump: PathBuf::from("heap.json"),
            objects: Vec::new(),
            order: SearchOrder::BreadthFirst,
            max_steps: None,
        }
    }
}
