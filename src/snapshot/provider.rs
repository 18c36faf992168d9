//! Capability contract for reading a frozen heap snapshot.
//!
//! Anything that can enumerate objects, roots, threads and the finalizer
//! queue of a managed heap can drive the summarizer by implementing
//! [`SnapshotProvider`]. The trait is object-safe so finalizer inspectors
//! can take `&dyn SnapshotProvider`.

use crate::heap::schema::{RootKind, StackFrame, ThreadFlags, ThreadPoolInfo};
use serde::{Deserialize, Serialize};

/// Type descriptor for a heap object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: String,
    pub base_size: u64,
    pub is_array: bool,
}

/// A GC root as reported by the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRoot {
    pub address: u64,
    pub kind: RootKind,
    #[serde(default)]
    pub name: Option<String>,
    /// Object kept alive by the root, zero if none
    #[serde(default)]
    pub object: u64,
    /// `None` when the snapshot cannot resolve the object's type
    #[serde(default)]
    pub type_name: Option<String>,
}

/// A runtime thread as reported by the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawThread {
    pub os_thread_id: u32,
    pub managed_thread_id: i32,
    #[serde(default)]
    pub lock_count: u32,
    #[serde(default)]
    pub flags: ThreadFlags,
    #[serde(default)]
    pub current_exception: Option<String>,
    #[serde(default)]
    pub frames: Vec<StackFrame>,
}

/// Result of reading a named instance field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// The object's type has no field with that name
    Missing,
    /// The field exists but holds null
    Null,
    Value(String),
}

/// Read-only access to a heap snapshot
pub trait SnapshotProvider {
    /// False when the heap structures are too damaged to enumerate
    fn can_walk_heap(&self) -> bool;

    fn enumerate_objects(&self) -> Box<dyn Iterator<Item = u64> + '_>;

    /// `None` signals an unresolvable (corrupted) object
    fn object_type(&self, obj: u64) -> Option<TypeInfo>;

    fn object_size(&self, obj: u64) -> u64;

    fn array_length(&self, obj: u64) -> Option<usize>;

    fn generation(&self, obj: u64) -> u32;

    fn is_in_large_object_heap(&self, obj: u64) -> bool;

    fn enumerate_roots(&self) -> Box<dyn Iterator<Item = RawRoot> + '_>;

    fn enumerate_threads(&self) -> Box<dyn Iterator<Item = RawThread> + '_>;

    fn enumerate_finalizer_queue(&self) -> Box<dyn Iterator<Item = u64> + '_>;

    fn thread_pool(&self) -> Option<ThreadPoolInfo>;

    /// Push every outgoing reference of `obj` to `visitor`
    fn enumerate_references(&self, obj: u64, visitor: &mut dyn FnMut(u64));

    fn field_value(&self, obj: u64, field: &str) -> FieldValue;
}
