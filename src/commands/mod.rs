//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod root_path;
pub mod summarize;
pub mod utils;

// Re-export main command functions
pub use models::{RootPathArgs, SummarizeArgs};
pub use root_path::execute_root_path;
pub use summarize::{execute_summarize, validate_args};
pub use utils::{display_version, inspect_export_file};
