//! Export of normalized records and aggregates.
//!
//! This module handles:
//! - The record envelope shared by every destination
//! - The scoped bulk-insert contract
//! - NDJSON file, HTTP and in-memory destinations

pub mod http;
pub mod memory;
pub mod ndjson;
pub mod record;
pub mod sink;

// Re-export main types and functions
pub use http::HttpSink;
pub use memory::MemorySink;
pub use ndjson::{read_records, NdjsonSink};
pub use record::{ExportRecord, RunSummary};
pub use sink::{open_sink, BatchWriter, BulkInsert, ExportSink};
