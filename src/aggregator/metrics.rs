//! Running accumulators and the aggregate records they produce.
//!
//! Every accumulator is a commutative, associative combiner: feeding
//! records in any order, or merging partial accumulators built over
//! shards of the stream, gives the same result.

use crate::heap::schema::{Generation, RootKind};
use serde::{Deserialize, Serialize};

/// Count, sum and extrema of object sizes within one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeAccumulator {
    count: u64,
    total: u64,
    min: u64,
    max: u64,
}

impl SizeAccumulator {
    pub fn add(&mut self, size: u64) {
        if self.count == 0 {
            self.min = size;
            self.max = size;
        } else {
            self.min = self.min.min(size);
            self.max = self.max.max(size);
        }
        self.count += 1;
        self.total += size;
    }

    pub fn merge(&mut self, other: &SizeAccumulator) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count += other.count;
        self.total += other.total;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean size, computed from the exact integer sum
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total as f64 / self.count as f64
        }
    }

    pub fn finish(&self, type_name: String) -> TypeSizeStats {
        TypeSizeStats {
            type_name,
            count: self.count,
            total_size: self.total,
            average_size: self.average(),
            min_size: self.min,
            max_size: self.max,
        }
    }
}

/// Per-generation and LOH counts within one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationAccumulator {
    gen0: u64,
    gen1: u64,
    gen2: u64,
    loh: u64,
    total: u64,
}

impl GenerationAccumulator {
    /// Generations are exclusive; LOH is an overlapping tag.
    ///
    /// Objects the runtime reports as generation 3 or above (the LOH) arrive
    /// here as `Gen2` and are counted in `generation2_count`.
    pub fn add(&mut self, generation: Generation, is_in_loh: bool) {
        match generation {
            Generation::Gen0 => self.gen0 += 1,
            Generation::Gen1 => self.gen1 += 1,
            Generation::Gen2 => self.gen2 += 1,
        }
        if is_in_loh {
            self.loh += 1;
        }
        self.total += 1;
    }

    pub fn merge(&mut self, other: &GenerationAccumulator) {
        self.gen0 += other.gen0;
        self.gen1 += other.gen1;
        self.gen2 += other.gen2;
        self.loh += other.loh;
        self.total += other.total;
    }

    pub fn finish(&self, type_name: String) -> TypeGenerationStats {
        TypeGenerationStats {
            type_name,
            generation0_count: self.gen0,
            generation1_count: self.gen1,
            generation2_count: self.gen2,
            loh_count: self.loh,
            total: self.total,
        }
    }
}

/// Number of roots of one kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootKindCount {
    pub kind: RootKind,
    pub count: u64,
}

/// Number of roots of one kind keeping one type alive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootKindTypeCount {
    pub kind: RootKind,
    pub type_name: String,
    pub count: u64,
}

/// Object count and size statistics for one type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSizeStats {
    pub type_name: String,
    pub count: u64,
    pub total_size: u64,
    pub average_size: f64,
    pub min_size: u64,
    pub max_size: u64,
}

/// Generation breakdown for one type
///
/// `generation0_count + generation1_count + generation2_count == total`;
/// `loh_count` overlaps with generation 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeGenerationStats {
    pub type_name: String,
    pub generation0_count: u64,
    pub generation1_count: u64,
    pub generation2_count: u64,
    pub loh_count: u64,
    pub total: u64,
}

/// Final grouped results of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub root_counts_by_kind: Vec<RootKindCount>,
    pub root_counts_by_kind_and_type: Vec<RootKindTypeCount>,
    pub size_stats_by_type: Vec<TypeSizeStats>,
    pub generation_stats_by_type: Vec<TypeGenerationStats>,
}

impl AggregateReport {
    /// Size statistics for one type, if any object of it was seen
    pub fn size_stats(&self, type_name: &str) -> Option<&TypeSizeStats> {
        self.size_stats_by_type
            .iter()
            .find(|stats| stats.type_name == type_name)
    }

    pub fn generation_stats(&self, type_name: &str) -> Option<&TypeGenerationStats> {
        self.generation_stats_by_type
            .iter()
            .find(|stats| stats.type_name == type_name)
    }

    pub fn root_count(&self, kind: RootKind) -> u64 {
        self.root_counts_by_kind
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }

    /// Human-readable one-line summary
    pub fn summary(&self) -> String {
        let objects: u64 = self.size_stats_by_type.iter().map(|s| s.count).sum();
        let bytes: u64 = self.size_stats_by_type.iter().map(|s| s.total_size).sum();
        let roots: u64 = self.root_counts_by_kind.iter().map(|r| r.count).sum();

        format!(
            "Objects: {} | Bytes: {} | Types: {} | Roots: {} | Root kinds: {}",
            objects,
            bytes,
            self.size_stats_by_type.len(),
            roots,
            self.root_counts_by_kind.len()
        )
    }
}
