//! Summarize command implementation.
//!
//! The summarize command:
//! 1. Loads the heap snapshot
//! 2. Opens the destination (document store or NDJSON file)
//! 3. Walks the snapshot once, exporting records and aggregates
//! 4. Optionally prints a text summary

use super::models::SummarizeArgs;
use crate::aggregator::AggregateReport;
use crate::output::{open_sink, RunSummary};
use crate::pipeline::{summarize_snapshot, RootPathSelection, SummaryOptions};
use crate::snapshot::JsonSnapshot;
use anyhow::{Context, Result};
use log::info;
use std::time::Instant;

/// Execute the summarize command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Summarize command arguments
///
/// # Returns
/// The run summary that was also exported to the destination
///
/// # Errors
/// * Snapshot read or parse failures
/// * A snapshot whose heap cannot be walked
/// * Destination failures
pub fn execute_summarize(args: SummarizeArgs) -> Result<RunSummary> {
    let start_time = Instant::now();

    info!("Loading heap snapshot: {}", args.dump.display());
    let snapshot = JsonSnapshot::load(&args.dump)
        .with_context(|| format!("Failed to load snapshot {}", args.dump.display()))?;

    let mut sink = open_sink(&args.url, &args.database_name)
        .with_context(|| format!("Failed to open destination {}", args.url))?;

    let options = SummaryOptions {
        root_paths: root_path_selection(&args),
        ..Default::default()
    };

    let outcome = summarize_snapshot(&snapshot, sink.as_mut(), &options)
        .context("Failed to summarize heap snapshot")?;

    if args.print_summary {
        println!("{}", format_summary(&outcome.summary, &outcome.report, 10));
    }

    let elapsed = start_time.elapsed();
    info!("Summary completed in {:.2}s", elapsed.as_secs_f64());

    Ok(outcome.summary)
}

/// Validate summarize arguments
///
/// **Public** - can be called before execute_summarize for early validation
pub fn validate_args(args: &SummarizeArgs) -> Result<()> {
    if args.url.trim().is_empty() {
        anyhow::bail!("Destination URL cannot be empty");
    }

    if args.database_name.trim().is_empty() {
        anyhow::bail!("Database name cannot be empty");
    }

    if args
        .database_name
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_whitespace())
    {
        anyhow::bail!("Database name must not contain path separators or whitespace");
    }

    if let Some(pattern) = &args.root_path_type {
        if pattern.is_empty() {
            anyhow::bail!("Root path type filter cannot be empty");
        }
    }

    if !args.dump.exists() {
        anyhow::bail!("Snapshot file not found: {}", args.dump.display());
    }

    Ok(())
}

fn root_path_selection(args: &SummarizeArgs) -> RootPathSelection {
    match (&args.root_path_type, args.root_paths) {
        (Some(pattern), _) => RootPathSelection::TypeContains(pattern.clone()),
        (None, true) => RootPathSelection::All,
        (None, false) => RootPathSelection::Off,
    }
}

/// Render a run as text, listing the largest types by total size
pub fn format_summary(summary: &RunSummary, report: &AggregateReport, top_types: usize) -> String {
    let mut out = String::new();
    let rule = "=".repeat(80);

    out.push_str(&format!("{}\nHEAP SUMMARY\n{}\n", rule, rule));
    out.push_str(&format!(
        "Objects: {} ({} skipped)\n",
        summary.objects, summary.skipped_objects
    ));
    out.push_str(&format!(
        "Roots:   {} ({} skipped)\n",
        summary.roots, summary.skipped_roots
    ));
    out.push_str(&format!("Threads: {}\n", summary.threads));
    out.push_str(&format!(
        "Finalizer queue: {}\n",
        summary.finalizer_entries
    ));

    let resolved =
        summary.root_paths_found + summary.root_paths_unreachable + summary.root_paths_budget_exceeded;
    if resolved > 0 {
        out.push_str(&format!(
            "Root paths: {} found, {} unreachable, {} over budget\n",
            summary.root_paths_found,
            summary.root_paths_unreachable,
            summary.root_paths_budget_exceeded
        ));
    }

    out.push_str(&format!("\nTop {} types by size:\n", top_types));
    for stats in report.size_stats_by_type.iter().take(top_types) {
        out.push_str(&format!(
            "  {:>12} bytes {:>8} objs  {}\n",
            stats.total_size, stats.count, stats.type_name
        ));
    }

    out.push_str("\nRoots by kind:\n");
    for count in &report.root_counts_by_kind {
        out.push_str(&format!("  {:>8}  {}\n", count.count, count.kind));
    }
    out.push_str(&rule);

    out
}
