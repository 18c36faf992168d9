//! Export document envelope.
//!
//! Every exported line is `{"collection": <name>, "document": {...}}`, so a
//! destination can route documents without knowing their schema.

use crate::aggregator::{
    AggregateReport, RootKindCount, RootKindTypeCount, TypeGenerationStats, TypeSizeStats,
};
use crate::heap::schema::{FinalizerEntry, GcRoot, HeapObject, ThreadInfo, ThreadPoolInfo};
use serde::{Deserialize, Serialize};

/// Totals for one summary run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Export schema version
    pub version: String,
    /// RFC 3339 timestamp
    pub generated_at: String,
    pub objects: u64,
    pub skipped_objects: u64,
    pub roots: u64,
    pub skipped_roots: u64,
    pub threads: u64,
    pub finalizer_entries: u64,
    pub skipped_finalizer_entries: u64,
    pub root_paths_found: u64,
    pub root_paths_unreachable: u64,
    pub root_paths_budget_exceeded: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "collection", content = "document")]
pub enum ExportRecord {
    HeapObject(HeapObject),
    GcRoot(GcRoot),
    Thread(ThreadInfo),
    ThreadPool(ThreadPoolInfo),
    FinalizerEntry(FinalizerEntry),
    RootCountByKind(RootKindCount),
    RootCountByKindAndType(RootKindTypeCount),
    ObjectSizeByType(TypeSizeStats),
    ObjectGenerationsByType(TypeGenerationStats),
    RunSummary(RunSummary),
}

impl ExportRecord {
    /// Collection name the record is filed under
    pub fn collection(&self) -> &'static str {
        match self {
            ExportRecord::HeapObject(_) => "HeapObject",
            ExportRecord::GcRoot(_) => "GcRoot",
            ExportRecord::Thread(_) => "Thread",
            ExportRecord::ThreadPool(_) => "ThreadPool",
            ExportRecord::FinalizerEntry(_) => "FinalizerEntry",
            ExportRecord::RootCountByKind(_) => "RootCountByKind",
            ExportRecord::RootCountByKindAndType(_) => "RootCountByKindAndType",
            ExportRecord::ObjectSizeByType(_) => "ObjectSizeByType",
            ExportRecord::ObjectGenerationsByType(_) => "ObjectGenerationsByType",
            ExportRecord::RunSummary(_) => "RunSummary",
        }
    }

    /// Flatten an aggregate report into exportable records
    pub fn from_report(report: AggregateReport) -> Vec<ExportRecord> {
        let AggregateReport {
            root_counts_by_kind,
            root_counts_by_kind_and_type,
            size_stats_by_type,
            generation_stats_by_type,
        } = report;

        root_counts_by_kind
            .into_iter()
            .map(ExportRecord::RootCountByKind)
            .chain(
                root_counts_by_kind_and_type
                    .into_iter()
                    .map(ExportRecord::RootCountByKindAndType),
            )
            .chain(size_stats_by_type.into_iter().map(ExportRecord::ObjectSizeByType))
            .chain(
                generation_stats_by_type
                    .into_iter()
                    .map(ExportRecord::ObjectGenerationsByType),
            )
            .collect()
    }
}
