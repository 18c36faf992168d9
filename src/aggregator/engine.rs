//! Single-pass grouped statistics over object and root streams.
//!
//! Four independent aggregates are updated per record with O(1)
//! amortized work:
//! 1. Root count by root kind
//! 2. Root count by (root kind, type name)
//! 3. Object count and size statistics by type name
//! 4. Generation and LOH breakdown by type name
//!
//! Nothing is buffered; results are produced by [`AggregationEngine::finish`]
//! once the streams are exhausted.

use super::metrics::{
    AggregateReport, GenerationAccumulator, RootKindCount, RootKindTypeCount, SizeAccumulator,
};
use crate::heap::schema::{GcRoot, HeapObject, RootKind};
use log::debug;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct AggregationEngine {
    roots_by_kind: HashMap<RootKind, u64>,
    roots_by_kind_and_type: HashMap<(RootKind, String), u64>,
    sizes_by_type: HashMap<String, SizeAccumulator>,
    generations_by_type: HashMap<String, GenerationAccumulator>,
    objects_seen: u64,
    roots_seen: u64,
}

impl AggregationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, root: &GcRoot) {
        *self.roots_by_kind.entry(root.kind).or_insert(0) += 1;
        *self
            .roots_by_kind_and_type
            .entry((root.kind, root.type_name.clone()))
            .or_insert(0) += 1;
        self.roots_seen += 1;
    }

    pub fn add_object(&mut self, object: &HeapObject) {
        self.sizes_by_type
            .entry(object.type_name.clone())
            .or_default()
            .add(object.size);
        self.generations_by_type
            .entry(object.type_name.clone())
            .or_default()
            .add(object.generation, object.is_in_loh);
        self.objects_seen += 1;
    }

    /// Fold a partial engine built over another shard into this one
    pub fn merge(&mut self, other: AggregationEngine) {
        for (kind, count) in other.roots_by_kind {
            *self.roots_by_kind.entry(kind).or_insert(0) += count;
        }
        for (key, count) in other.roots_by_kind_and_type {
            *self.roots_by_kind_and_type.entry(key).or_insert(0) += count;
        }
        for (type_name, acc) in other.sizes_by_type {
            self.sizes_by_type.entry(type_name).or_default().merge(&acc);
        }
        for (type_name, acc) in other.generations_by_type {
            self.generations_by_type.entry(type_name).or_default().merge(&acc);
        }
        self.objects_seen += other.objects_seen;
        self.roots_seen += other.roots_seen;
    }

    pub fn objects_seen(&self) -> u64 {
        self.objects_seen
    }

    pub fn roots_seen(&self) -> u64 {
        self.roots_seen
    }

    /// Emit the grouped results.
    ///
    /// Root groups are ordered by descending count; type groups by
    /// descending total size (or total count), ties broken by name.
    pub fn finish(self) -> AggregateReport {
        let mut root_counts_by_kind: Vec<RootKindCount> = self
            .roots_by_kind
            .into_iter()
            .map(|(kind, count)| RootKindCount { kind, count })
            .collect();
        root_counts_by_kind.sort_by(|a, b| b.count.cmp(&a.count).then(a.kind.cmp(&b.kind)));

        let mut root_counts_by_kind_and_type: Vec<RootKindTypeCount> = self
            .roots_by_kind_and_type
            .into_iter()
            .map(|((kind, type_name), count)| RootKindTypeCount {
                kind,
                type_name,
                count,
            })
            .collect();
        root_counts_by_kind_and_type.sort_by(|a, b| {
            a.kind
                .cmp(&b.kind)
                .then(b.count.cmp(&a.count))
                .then_with(|| a.type_name.cmp(&b.type_name))
        });

        let mut size_stats_by_type: Vec<_> = self
            .sizes_by_type
            .into_iter()
            .map(|(type_name, acc)| acc.finish(type_name))
            .collect();
        size_stats_by_type.sort_by(|a, b| {
            b.total_size
                .cmp(&a.total_size)
                .then_with(|| a.type_name.cmp(&b.type_name))
        });

        let mut generation_stats_by_type: Vec<_> = self
            .generations_by_type
            .into_iter()
            .map(|(type_name, acc)| acc.finish(type_name))
            .collect();
        generation_stats_by_type.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.type_name.cmp(&b.type_name))
        });

        debug!(
            "Aggregated {} objects into {} types, {} roots into {} kinds",
            self.objects_seen,
            size_stats_by_type.len(),
            self.roots_seen,
            root_counts_by_kind.len()
        );

        AggregateReport {
            root_counts_by_kind,
            root_counts_by_kind_and_type,
            size_stats_by_type,
            generation_stats_by_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::schema::Generation;

    fn object(type_name: &str, size: u64, generation: Generation, is_in_loh: bool) -> HeapObject {
        HeapObject {
            obj_ref: 0,
            size,
            generation,
            type_name: type_name.to_string(),
            is_in_loh,
            is_array: false,
            array_length: None,
            gc_root_paths: None,
            root_path_status: None,
        }
    }

    fn root(kind: RootKind, type_name: &str) -> GcRoot {
        GcRoot {
            address: 0,
            kind,
            name: None,
            object_ref: 0,
            type_name: type_name.to_string(),
        }
    }

    #[test]
    fn test_roots_grouped_by_kind_and_type() {
        let mut engine = AggregationEngine::new();
        engine.add_root(&root(RootKind::Strong, "A"));
        engine.add_root(&root(RootKind::Strong, "A"));
        engine.add_root(&root(RootKind::Strong, "B"));
        engine.add_root(&root(RootKind::LocalVar, "A"));

        let report = engine.finish();
        assert_eq!(report.root_count(RootKind::Strong), 3);
        assert_eq!(report.root_count(RootKind::LocalVar), 1);
        assert_eq!(report.root_count(RootKind::Weak), 0);
        assert_eq!(report.root_counts_by_kind[0].kind, RootKind::Strong);

        let strong_a = report
            .root_counts_by_kind_and_type
            .iter()
            .find(|r| r.kind == RootKind::Strong && r.type_name == "A")
            .unwrap();
        assert_eq!(strong_a.count, 2);
    }

    #[test]
    fn test_objects_grouped_by_type() {
        let mut engine = AggregationEngine::new();
        engine.add_object(&object("Small", 10, Generation::Gen0, false));
        engine.add_object(&object("Big", 90_000, Generation::Gen2, true));
        engine.add_object(&object("Small", 30, Generation::Gen1, false));

        let report = engine.finish();
        assert_eq!(report.size_stats_by_type[0].type_name, "Big");

        let small = report.size_stats("Small").unwrap();
        assert_eq!(small.count, 2);
        assert_eq!(small.average_size, 20.0);

        let big = report.generation_stats("Big").unwrap();
        assert_eq!(big.generation2_count, 1);
        assert_eq!(big.loh_count, 1);
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let objects = vec![
            object("A", 8, Generation::Gen0, false),
            object("A", 16, Generation::Gen1, false),
            object("B", 100, Generation::Gen2, true),
            object("A", 4, Generation::Gen2, false),
        ];

        let mut single = AggregationEngine::new();
        for o in &objects {
            single.add_object(o);
        }

        let mut left = AggregationEngine::new();
        let mut right = AggregationEngine::new();
        for (i, o) in objects.iter().enumerate() {
            if i % 2 == 0 {
                left.add_object(o);
            } else {
                right.add_object(o);
            }
        }
        left.merge(right);

        assert_eq!(left.objects_seen(), 4);
        assert_eq!(left.finish(), single.finish());
    }
}
