use crate::output::read_records;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Validate an NDJSON export and count its documents per collection
pub fn inspect_export_file(file_path: &Path) -> Result<BTreeMap<&'static str, usize>> {
    println!("Inspecting export: {}", file_path.display());

    let records = read_records(file_path)
        .with_context(|| format!("Failed to read export {}", file_path.display()))?;

    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for record in &records {
        *counts.entry(record.collection()).or_insert(0) += 1;
    }

    println!("✓ Valid export ({} documents)", records.len());
    for (collection, count) in &counts {
        println!("  {:<26} {}", collection, count);
    }

    Ok(counts)
}

/// Display version information
pub fn display_version() {
    println!("Heapdump Summarizer v{}", env!("CARGO_PKG_VERSION"));
    println!("Export Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("GC root retention paths and per-type memory statistics for heap snapshots.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::ThreadPoolInfo;
    use crate::output::{BulkInsert, ExportRecord, NdjsonSink, RunSummary};

    #[test]
    fn test_inspect_counts_collections() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("export.ndjson");
        let mut sink = NdjsonSink::new(&path);

        let mut bulk = BulkInsert::open(&mut sink).unwrap();
        bulk.store(&ExportRecord::ThreadPool(ThreadPoolInfo::default()))
            .unwrap();
        bulk.store(&ExportRecord::RunSummary(RunSummary::default()))
            .unwrap();
        bulk.store(&ExportRecord::RunSummary(RunSummary::default()))
            .unwrap();
        bulk.finish().unwrap();

        let counts = inspect_export_file(&path).unwrap();
        assert_eq!(counts.get("ThreadPool"), Some(&1));
        assert_eq!(counts.get("RunSummary"), Some(&2));
    }

    #[test]
    fn test_inspect_rejects_garbage() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bad.ndjson");
        std::fs::write(&path, "not json\n").unwrap();

        assert!(inspect_export_file(&path).is_err());
    }
}
