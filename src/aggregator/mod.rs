//! Aggregation of heap records into grouped statistics.
//!
//! This module turns the object and root streams into:
//! - Root counts by kind, and by kind and type
//! - Object count and size statistics by type
//! - Generation and large-object-heap breakdown by type

pub mod engine;
pub mod metrics;

// Re-export main types
pub use engine::AggregationEngine;
pub use metrics::{
    AggregateReport, GenerationAccumulator, RootKindCount, RootKindTypeCount, SizeAccumulator,
    TypeGenerationStats, TypeSizeStats,
};
