//! Configuration and constants for the summarizer.

use std::time::Duration;

/// Current export schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Hard cap on expanded nodes during a single root-path search
pub const MAX_ROOT_PATH_STEPS: usize = 65_536;

/// Destination database name used when none is given
pub const DEFAULT_DATABASE_NAME: &str = "DumpMemorySummary";

/// Log a progress line every this many enumerated objects
pub const PROGRESS_INTERVAL: u64 = 100_000;

/// Default timeout for HTTP export requests
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Records buffered per HTTP bulk request
pub const HTTP_BATCH_SIZE: usize = 1_000;

/// Display name for roots whose object type is blank
pub const NO_TYPE_NAME: &str = "<No Type>";

// Finalizer queue inspection: the stream family is matched by substring,
// the ESENT table by its exact runtime type name.
pub const STREAM_TYPE_MARKER: &str = "Stream";
pub const STREAM_FILENAME_FIELD: &str = "_fileName";
pub const NO_FILENAME_FIELD: &str = "<no filename field>";
pub const EMPTY_FILENAME_FIELD: &str = "<empty filename field>";

pub const ESENT_TABLE_TYPE: &str = "Microsoft.Isam.Esent.Interop.Table";
pub const ESENT_TABLE_NAME_FIELD: &str = "name";
pub const NO_TABLE_NAME_FIELD: &str = "<no table name field>";
pub const EMPTY_TABLE_NAME_FIELD: &str = "<empty table name field>";
