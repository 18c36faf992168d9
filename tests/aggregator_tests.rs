use heapdump_summarizer::aggregator::AggregationEngine;
use heapdump_summarizer::heap::{GcRoot, Generation, HeapObject, RootKind};
use pretty_assertions::assert_eq;

fn object(obj_ref: u64, type_name: &str, size: u64, generation: Generation) -> HeapObject {
    HeapObject {
        obj_ref,
        size,
        generation,
        type_name: type_name.to_string(),
        is_in_loh: false,
        is_array: false,
        array_length: None,
        gc_root_paths: None,
        root_path_status: None,
    }
}

fn root(address: u64, kind: RootKind, type_name: &str) -> GcRoot {
    GcRoot {
        address,
        kind,
        name: None,
        object_ref: address + 0x1000,
        type_name: type_name.to_string(),
    }
}

#[test]
fn test_roots_counted_by_kind() {
    let mut engine = AggregationEngine::new();
    engine.add_root(&root(0x10, RootKind::StaticVar, "A"));
    engine.add_root(&root(0x20, RootKind::StaticVar, "B"));
    engine.add_root(&root(0x30, RootKind::StaticVar, "A"));
    engine.add_root(&root(0x40, RootKind::Pinning, "System.Byte[]"));

    let report = engine.finish();

    assert_eq!(report.root_count(RootKind::StaticVar), 3);
    assert_eq!(report.root_count(RootKind::Pinning), 1);
    assert_eq!(report.root_count(RootKind::Weak), 0);
    assert_eq!(report.root_counts_by_kind[0].kind, RootKind::StaticVar);
}

#[test]
fn test_kind_and_type_counts_sum_to_kind_counts() {
    let mut engine = AggregationEngine::new();
    let kinds = [RootKind::StaticVar, RootKind::Strong, RootKind::LocalVar];
    let types = ["A", "B", "C", "D"];
    for i in 0..40u64 {
        let kind = kinds[(i % 3) as usize];
        let type_name = types[(i % 4) as usize];
        engine.add_root(&root(i * 8, kind, type_name));
    }

    let report = engine.finish();

    for by_kind in &report.root_counts_by_kind {
        let summed: u64 = report
            .root_counts_by_kind_and_type
            .iter()
            .filter(|group| group.kind == by_kind.kind)
            .map(|group| group.count)
            .sum();
        assert_eq!(summed, by_kind.count, "kind {}", by_kind.kind);
    }
}

#[test]
fn test_size_statistics_for_one_thousand_objects() {
    let mut engine = AggregationEngine::new();
    for i in 0..1000u64 {
        engine.add_object(&object(0x1000 + i * 8, "Foo", 10 + i, Generation::Gen0));
    }

    let report = engine.finish();
    let stats = report.size_stats("Foo").unwrap();

    assert_eq!(stats.count, 1000);
    assert_eq!(stats.min_size, 10);
    assert_eq!(stats.max_size, 1009);
    assert_eq!(stats.total_size, 509_500);
    assert_eq!(stats.average_size, 509.5);
}

#[test]
fn test_generation_counts_sum_to_total() {
    let mut engine = AggregationEngine::new();
    let generations = [Generation::Gen0, Generation::Gen1, Generation::Gen2];
    for i in 0..30u64 {
        let mut obj = object(i * 8, "Bar", 24, generations[(i % 3) as usize]);
        obj.is_in_loh = i % 10 == 0;
        engine.add_object(&obj);
    }

    let report = engine.finish();
    let stats = report.generation_stats("Bar").unwrap();

    assert_eq!(stats.total, 30);
    assert_eq!(
        stats.generation0_count + stats.generation1_count + stats.generation2_count,
        stats.total
    );
    assert_eq!(stats.loh_count, 3);
}

#[test]
fn test_size_stats_ordered_by_total_size() {
    let mut engine = AggregationEngine::new();
    engine.add_object(&object(0x10, "Small", 16, Generation::Gen0));
    engine.add_object(&object(0x20, "Large", 4096, Generation::Gen2));
    engine.add_object(&object(0x30, "Small", 16, Generation::Gen0));

    let report = engine.finish();
    let names: Vec<&str> = report
        .size_stats_by_type
        .iter()
        .map(|stats| stats.type_name.as_str())
        .collect();

    assert_eq!(names, vec!["Large", "Small"]);
}

#[test]
fn test_sharded_aggregation_matches_single_pass() {
    let objects: Vec<HeapObject> = (0..200u64)
        .map(|i| {
            let type_name = if i % 2 == 0 { "Even" } else { "Odd" };
            object(i * 8, type_name, i + 1, Generation::from_raw((i % 4) as u32))
        })
        .collect();

    let mut single = AggregationEngine::new();
    for obj in &objects {
        single.add_object(obj);
    }

    let mut left = AggregationEngine::new();
    let mut right = AggregationEngine::new();
    for obj in &objects[..77] {
        left.add_object(obj);
    }
    for obj in &objects[77..] {
        right.add_object(obj);
    }
    right.merge(left);

    assert_eq!(right.finish(), single.finish());
}

#[test]
fn test_empty_input_gives_empty_report() {
    let report = AggregationEngine::new().finish();

    assert!(report.root_counts_by_kind.is_empty());
    assert!(report.size_stats_by_type.is_empty());
    assert!(report.generation_stats_by_type.is_empty());
}
