//! Convert raw snapshot entities into normalized records.
//!
//! Every raw object, root, thread and finalizer entry yields exactly one
//! record, or is skipped with a warning when the snapshot cannot resolve
//! its type. Skips never stop enumeration: partially corrupted dumps are
//! the norm, not the exception.

use super::finalizer::inspector_for;
use super::root_index::RootIndex;
use super::schema::{
    DiagnosticProperty, FinalizerEntry, GcRoot, Generation, HeapObject, ThreadInfo,
};
use crate::snapshot::{RawRoot, RawThread, SnapshotProvider};
use log::warn;

/// Counters kept while building records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub objects: u64,
    pub skipped_objects: u64,
    pub roots: u64,
    pub skipped_roots: u64,
    pub threads: u64,
    pub finalizer_entries: u64,
    pub skipped_finalizer_entries: u64,
}

/// Builds records from one snapshot
pub struct HeapRecordBuilder<'a, P: SnapshotProvider> {
    provider: &'a P,
    stats: BuildStats,
}

impl<'a, P: SnapshotProvider> HeapRecordBuilder<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            stats: BuildStats::default(),
        }
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Build the record for one enumerated object
    pub fn build_object(&mut self, obj: u64) -> Option<HeapObject> {
        let Some(clr_type) = self.provider.object_type(obj) else {
            warn!("Heap corrupted, could not determine type of object {:#x}", obj);
            self.stats.skipped_objects += 1;
            return None;
        };

        let array_length = if clr_type.is_array {
            self.provider.array_length(obj)
        } else {
            None
        };

        self.stats.objects += 1;

        Some(HeapObject {
            obj_ref: obj,
            size: self.provider.object_size(obj),
            generation: Generation::from_raw(self.provider.generation(obj)),
            type_name: clr_type.name,
            is_in_loh: self.provider.is_in_large_object_heap(obj),
            is_array: clr_type.is_array,
            array_length,
            gc_root_paths: None,
            root_path_status: None,
        })
    }

    /// Build a root record and register it in `index`
    pub fn build_root(&mut self, raw: RawRoot, index: &mut RootIndex) -> Option<GcRoot> {
        let Some(type_name) = raw.type_name else {
            warn!(
                "Skipping {} root at {:#x}: type of object {:#x} is unresolvable",
                raw.kind, raw.address, raw.object
            );
            self.stats.skipped_roots += 1;
            return None;
        };

        let root = GcRoot {
            address: raw.address,
            kind: raw.kind,
            name: raw.name,
            object_ref: raw.object,
            type_name,
        };

        index.insert(root.clone());
        self.stats.roots += 1;

        Some(root)
    }

    pub fn build_thread(&mut self, raw: RawThread) -> ThreadInfo {
        self.stats.threads += 1;

        let stack_trace = raw.frames.iter().map(ToString::to_string).collect();

        ThreadInfo {
            os_thread_id: raw.os_thread_id,
            managed_thread_id: raw.managed_thread_id,
            lock_count: raw.lock_count,
            flags: raw.flags,
            current_exception_message: raw.current_exception,
            stack_frames: raw.frames,
            stack_trace,
        }
    }

    /// Build the record for an object on the finalizer queue
    pub fn build_finalizer_entry(&mut self, obj: u64) -> Option<FinalizerEntry> {
        let Some(clr_type) = self.provider.object_type(obj) else {
            warn!("Skipping finalizer queue entry {:#x}: unresolvable type", obj);
            self.stats.skipped_finalizer_entries += 1;
            return None;
        };

        let inspector = inspector_for(&clr_type.name);
        let property = match (
            inspector.property_name(),
            inspector.extract_diagnostic(self.provider, obj),
        ) {
            (Some(name), Some(value)) => Some(DiagnosticProperty {
                name: name.to_string(),
                value,
            }),
            _ => None,
        };

        self.stats.finalizer_entries += 1;

        Some(FinalizerEntry {
            type_name: clr_type.name,
            size: clr_type.base_size,
            property,
        })
    }

    /// Build every resolvable object, in enumeration order
    pub fn build_objects(&mut self) -> Vec<HeapObject> {
        let provider = self.provider;
        provider
            .enumerate_objects()
            .filter_map(|obj| self.build_object(obj))
            .collect()
    }

    /// Build every resolvable root, filling `index` as they are read
    pub fn build_roots(&mut self, index: &mut RootIndex) -> Vec<GcRoot> {
        let provider = self.provider;
        provider
            .enumerate_roots()
            .filter_map(|raw| self.build_root(raw, index))
            .collect()
    }
}

/// Build the root index of a snapshot without keeping the records
pub fn build_root_index<P: SnapshotProvider>(provider: &P) -> RootIndex {
    let mut index = RootIndex::new();
    HeapRecordBuilder::new(provider).build_roots(&mut index);
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::schema::{FrameKind, RootKind, StackFrame};
    use crate::snapshot::{JsonSnapshot, RawObject, SnapshotDocument};

    fn snapshot() -> JsonSnapshot {
        JsonSnapshot::from_document(SnapshotDocument {
            objects: vec![
                RawObject::new(0x10, "System.Byte[]", 100_024)
                    .with_generation(3)
                    .in_loh()
                    .with_array_length(100_000),
                RawObject::corrupted(0x20),
                RawObject::new(0x30, "System.IO.FileStream", 96)
                    .with_field("_fileName", Some("/tmp/a.log")),
            ],
            roots: vec![
                RawRoot {
                    address: 0x900,
                    kind: RootKind::StaticVar,
                    name: Some("Cache.Instance".to_string()),
                    object: 0x10,
                    type_name: Some("System.Byte[]".to_string()),
                },
                RawRoot {
                    address: 0x901,
                    kind: RootKind::LocalVar,
                    name: None,
                    object: 0x20,
                    type_name: None,
                },
            ],
            finalizer_queue: vec![0x30, 0x20],
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_build_object_fields() {
        let snapshot = snapshot();
        let mut builder = HeapRecordBuilder::new(&snapshot);

        let object = builder.build_object(0x10).unwrap();
        assert_eq!(object.size, 100_024);
        assert_eq!(object.generation, Generation::Gen2);
        assert!(object.is_in_loh);
        assert!(object.is_array);
        assert_eq!(object.array_length, Some(100_000));
    }

    #[test]
    fn test_corrupted_object_skipped() {
        let snapshot = snapshot();
        let mut builder = HeapRecordBuilder::new(&snapshot);

        let objects = builder.build_objects();
        assert_eq!(objects.len(), 2);
        assert_eq!(builder.stats().skipped_objects, 1);
        assert_eq!(builder.stats().objects, 2);
    }

    #[test]
    fn test_roots_populate_index() {
        let snapshot = snapshot();
        let mut builder = HeapRecordBuilder::new(&snapshot);
        let mut index = RootIndex::new();

        let roots = builder.build_roots(&mut index);
        assert_eq!(roots.len(), 1);
        assert_eq!(index.len(), 1);
        assert_eq!(builder.stats().skipped_roots, 1);
        assert_eq!(index.roots_of(0x10).next().unwrap().address, 0x900);
    }

    #[test]
    fn test_finalizer_entry_with_diagnostic() {
        let snapshot = snapshot();
        let mut builder = HeapRecordBuilder::new(&snapshot);

        let entry = builder.build_finalizer_entry(0x30).unwrap();
        assert_eq!(entry.type_name, "System.IO.FileStream");
        assert_eq!(entry.size, 96);
        let property = entry.property.unwrap();
        assert_eq!(property.name, "_fileName");
        assert_eq!(property.value, "/tmp/a.log");

        assert!(builder.build_finalizer_entry(0x20).is_none());
    }

    #[test]
    fn test_thread_stack_trace_rendered() {
        let snapshot = snapshot();
        let mut builder = HeapRecordBuilder::new(&snapshot);

        let thread = builder.build_thread(RawThread {
            os_thread_id: 4242,
            managed_thread_id: 1,
            lock_count: 0,
            flags: Default::default(),
            current_exception: Some("Object reference not set".to_string()),
            frames: vec![StackFrame {
                kind: FrameKind::Runtime,
                stack_pointer: 0x10,
                display: "[GCFrame]".to_string(),
            }],
        });

        assert_eq!(thread.stack_trace, vec!["Runtime           10 [GCFrame]".to_string()]);
        assert_eq!(thread.stack_frames.len(), 1);
        assert_eq!(builder.stats().threads, 1);
    }
}
