//! One summary run over a snapshot.
//!
//! The snapshot is walked once, in the order the records are exported:
//! 1. Thread pool and threads
//! 2. Finalizer queue
//! 3. GC roots (building the root index and root aggregates)
//! 4. Heap objects (object aggregates, optional root paths)
//! 5. Aggregates and the run summary
//!
//! Roots come before objects so the index is complete before any root
//! path is resolved.

use crate::aggregator::{AggregateReport, AggregationEngine};
use crate::heap::{HeapRecordBuilder, RootIndex, RootPathStatus};
use crate::output::{BulkInsert, ExportRecord, ExportSink, RunSummary};
use crate::retention::{ResolverConfig, RootPathResolver};
use crate::snapshot::SnapshotProvider;
use crate::utils::config::{PROGRESS_INTERVAL, SCHEMA_VERSION};
use crate::utils::error::SummarizeError;
use chrono::Utc;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Which objects get a root path attached
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RootPathSelection {
    #[default]
    Off,
    All,
    /// Objects whose type name contains the given text
    TypeContains(String),
}

impl RootPathSelection {
    pub fn wants(&self, type_name: &str) -> bool {
        match self {
            RootPathSelection::Off => false,
            RootPathSelection::All => true,
            RootPathSelection::TypeContains(pattern) => type_name.contains(pattern.as_str()),
        }
    }
}

/// Cooperative abort signal, checked once per top-level record
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SummaryOptions {
    pub root_paths: RootPathSelection,
    pub resolver: ResolverConfig,
    pub cancel: Option<CancelFlag>,
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub summary: RunSummary,
    pub report: AggregateReport,
}

/// Walk a snapshot once, exporting records and aggregates to `sink`.
///
/// # Errors
/// * `SummarizeError::HeapNotWalkable` - checked before anything is written
/// * `SummarizeError::Cancelled` - the cancel flag was raised mid-run
/// * `SummarizeError::Sink` - the destination failed; records stored so
///   far are still flushed when the batch goes out of scope
pub fn summarize_snapshot<P: SnapshotProvider>(
    provider: &P,
    sink: &mut dyn ExportSink,
    options: &SummaryOptions,
) -> Result<SummaryOutcome, SummarizeError> {
    if !provider.can_walk_heap() {
        return Err(SummarizeError::HeapNotWalkable);
    }

    let mut builder = HeapRecordBuilder::new(provider);
    let mut engine = AggregationEngine::new();
    let mut index = RootIndex::new();
    let mut summary = RunSummary {
        version: SCHEMA_VERSION.to_string(),
        ..Default::default()
    };

    let mut bulk = BulkInsert::open(sink)?;

    info!("Step 1/5: Writing threads...");
    if let Some(pool) = provider.thread_pool() {
        bulk.store(&ExportRecord::ThreadPool(pool))?;
    }
    for raw in provider.enumerate_threads() {
        check_cancelled(options, 0)?;
        let thread = builder.build_thread(raw);
        bulk.store(&ExportRecord::Thread(thread))?;
    }

    info!("Step 2/5: Writing objects from finalizer queue...");
    for obj in provider.enumerate_finalizer_queue() {
        check_cancelled(options, 0)?;
        if let Some(entry) = builder.build_finalizer_entry(obj) {
            bulk.store(&ExportRecord::FinalizerEntry(entry))?;
        }
    }

    info!("Step 3/5: Writing GC roots...");
    for raw in provider.enumerate_roots() {
        check_cancelled(options, 0)?;
        if let Some(root) = builder.build_root(raw, &mut index) {
            debug!("#{}, {}", index.len(), root);
            engine.add_root(&root);
            bulk.store(&ExportRecord::GcRoot(root))?;
        }
    }

    info!("Step 4/5: Writing heap objects...");
    let resolver = RootPathResolver::with_config(provider, &index, options.resolver);
    let mut enumerated: u64 = 0;

    for obj in provider.enumerate_objects() {
        check_cancelled(options, enumerated)?;
        enumerated += 1;
        if enumerated % PROGRESS_INTERVAL == 0 {
            info!("Enumerated {} objects from the heap", enumerated);
        }

        let Some(mut object) = builder.build_object(obj) else {
            continue;
        };
        engine.add_object(&object);

        if options.root_paths.wants(&object.type_name) {
            let outcome = resolver.resolve(obj);
            match outcome.status() {
                RootPathStatus::Found => summary.root_paths_found += 1,
                RootPathStatus::Unreachable => summary.root_paths_unreachable += 1,
                RootPathStatus::BudgetExceeded => summary.root_paths_budget_exceeded += 1,
            }
            object.attach_root_paths(&outcome);
        }

        bulk.store(&ExportRecord::HeapObject(object))?;
    }

    info!("Step 5/5: Writing aggregates...");
    let report = engine.finish();
    for record in ExportRecord::from_report(report.clone()) {
        bulk.store(&record)?;
    }

    let stats = builder.stats();
    summary.generated_at = Utc::now().to_rfc3339();
    summary.objects = stats.objects;
    summary.skipped_objects = stats.skipped_objects;
    summary.roots = stats.roots;
    summary.skipped_roots = stats.skipped_roots;
    summary.threads = stats.threads;
    summary.finalizer_entries = stats.finalizer_entries;
    summary.skipped_finalizer_entries = stats.skipped_finalizer_entries;
    bulk.store(&ExportRecord::RunSummary(summary.clone()))?;

    let stored = bulk.finish()?;
    info!(
        "Exported {} records ({} objects, {} roots, {} skipped as corrupted)",
        stored,
        summary.objects,
        summary.roots,
        summary.skipped_objects + summary.skipped_roots
    );

    Ok(SummaryOutcome { summary, report })
}

fn check_cancelled(options: &SummaryOptions, enumerated: u64) -> Result<(), SummarizeError> {
    match &options.cancel {
        Some(flag) if flag.is_cancelled() => Err(SummarizeError::Cancelled(enumerated)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_selection() {
        assert!(!RootPathSelection::Off.wants("System.String"));
        assert!(RootPathSelection::All.wants("System.String"));

        let selection = RootPathSelection::TypeContains("Cache".to_string());
        assert!(selection.wants("MyApp.LruCache"));
        assert!(!selection.wants("System.String"));
    }

    #[test]
    fn test_cancel_flag_shared_between_clones() {
        let flag = CancelFlag::new();
        let observer = flag.clone();
        assert!(!observer.is_cancelled());

        flag.cancel();
        assert!(observer.is_cancelled());
    }
}
