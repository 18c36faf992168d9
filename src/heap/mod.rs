//! Heap model: normalized records, the root index, and the record builder.
//!
//! This module handles:
//! - Record definitions exported to the sink
//! - Turning raw snapshot entities into those records
//! - Indexing roots for retention-path lookups
//! - Per-type diagnostics for finalizer queue entries

pub mod builder;
pub mod finalizer;
pub mod root_index;
pub mod schema;

// Re-export main types
pub use builder::{build_root_index, BuildStats, HeapRecordBuilder};
pub use finalizer::{inspector_for, FinalizerInspector};
pub use root_index::RootIndex;
pub use schema::{
    DiagnosticProperty, FinalizerEntry, FrameKind, GcRoot, Generation, HeapObject, PathNode,
    RootKind, RootPathStatus, StackFrame, ThreadFlags, ThreadInfo, ThreadPoolInfo,
};
