//! Normalized record definitions for heap snapshot data.
//!
//! These are the documents handed to the export sink. Field names are
//! part of the export schema, which is versioned via `SCHEMA_VERSION`.

use crate::retention::RootPathOutcome;
use crate::utils::config::NO_TYPE_NAME;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category of a GC root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RootKind {
    StaticVar,
    ThreadStaticVar,
    LocalVar,
    Strong,
    Weak,
    Pinning,
    Finalizer,
    AsyncPinning,
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RootKind::StaticVar => "StaticVar",
            RootKind::ThreadStaticVar => "ThreadStaticVar",
            RootKind::LocalVar => "LocalVar",
            RootKind::Strong => "Strong",
            RootKind::Weak => "Weak",
            RootKind::Pinning => "Pinning",
            RootKind::Finalizer => "Finalizer",
            RootKind::AsyncPinning => "AsyncPinning",
        };
        f.write_str(name)
    }
}

/// Generational heap segment of an object
///
/// Serialized as the plain generation number (0, 1 or 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Generation {
    Gen0,
    Gen1,
    Gen2,
}

impl Generation {
    /// Map a raw generation number reported by the snapshot.
    ///
    /// Runtimes report the large object heap (and newer pinned heaps) as
    /// generations above 2; those are collected with gen 2, so they fold
    /// into `Gen2`. LOH membership is tracked separately on the object.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Generation::Gen0,
            1 => Generation::Gen1,
            _ => Generation::Gen2,
        }
    }
}

impl From<Generation> for u8 {
    fn from(generation: Generation) -> Self {
        match generation {
            Generation::Gen0 => 0,
            Generation::Gen1 => 1,
            Generation::Gen2 => 2,
        }
    }
}

impl TryFrom<u8> for Generation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Generation::Gen0),
            1 => Ok(Generation::Gen1),
            2 => Ok(Generation::Gen2),
            other => Err(format!("invalid generation {}", other)),
        }
    }
}

/// One hop of a retention path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathNode {
    pub obj_ref: u64,
    pub type_name: String,
}

/// How a root-path search for an object ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootPathStatus {
    Found,
    Unreachable,
    BudgetExceeded,
}

/// A single object enumerated from the heap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapObject {
    pub obj_ref: u64,
    pub size: u64,
    pub generation: Generation,
    pub type_name: String,
    pub is_in_loh: bool,
    pub is_array: bool,

    /// Element count, only present for arrays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_length: Option<usize>,

    /// Root address -> chain of references from this object to the
    /// object that root keeps alive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gc_root_paths: Option<BTreeMap<u64, Vec<PathNode>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_path_status: Option<RootPathStatus>,
}

impl HeapObject {
    /// Record the result of a root-path search on this object.
    ///
    /// A found path is stored once per root holding the rooted object.
    pub fn attach_root_paths(&mut self, outcome: &RootPathOutcome) {
        self.root_path_status = Some(outcome.status());

        if let RootPathOutcome::Found(path) = outcome {
            let paths = path
                .roots
                .iter()
                .map(|root| (root.address, path.chain.clone()))
                .collect();
            self.gc_root_paths = Some(paths);
        }
    }
}

impl fmt::Display for HeapObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ObjRef: {:#x}, Size: {}, Generation: {}, TypeName: {}",
            self.obj_ref,
            self.size,
            u8::from(self.generation),
            self.type_name
        )
    }
}

/// A GC root and the object it keeps alive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcRoot {
    pub address: u64,
    pub kind: RootKind,
    #[serde(default)]
    pub name: Option<String>,
    /// Zero when the root holds nothing
    pub object_ref: u64,
    pub type_name: String,
}

impl fmt::Display for GcRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RootKind: {}, Address: {:#x}, Name: {}, ObjectRef: {:#x}, TypeName: {}",
            self.kind,
            self.address,
            self.name.as_deref().unwrap_or(""),
            self.object_ref,
            if self.type_name.is_empty() {
                NO_TYPE_NAME
            } else {
                self.type_name.as_str()
            }
        )
    }
}

/// Kind of a call-stack frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameKind {
    Unknown,
    ManagedMethod,
    Runtime,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameKind::Unknown => "Unknown",
            FrameKind::ManagedMethod => "ManagedMethod",
            FrameKind::Runtime => "Runtime",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub kind: FrameKind,
    pub stack_pointer: u64,
    pub display: String,
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:>12X} {}", self.kind, self.stack_pointer, self.display)
    }
}

/// Liveness and role flags of a runtime thread
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadFlags {
    pub is_alive: bool,
    pub is_gc: bool,
    pub is_finalizer: bool,
    pub is_background: bool,
    pub is_aborted: bool,
    pub is_abort_requested: bool,
    pub is_gc_suspend_pending: bool,
    pub is_user_suspended: bool,
    pub is_suspending_ee: bool,
    pub is_unstarted: bool,
    pub is_threadpool_worker: bool,
    pub is_threadpool_timer: bool,
    pub is_threadpool_completion_port: bool,
}

/// Snapshot of one runtime thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadInfo {
    pub os_thread_id: u32,
    pub managed_thread_id: i32,
    pub lock_count: u32,
    pub flags: ThreadFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_exception_message: Option<String>,
    pub stack_frames: Vec<StackFrame>,
    /// Rendered frames, one line per frame
    pub stack_trace: Vec<String>,
}

/// Thread pool state at snapshot time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadPoolInfo {
    pub total_threads: u32,
    pub running_threads: u32,
    pub idle_threads: u32,
    pub min_threads: u32,
    pub max_threads: u32,
    pub min_completion_ports: u32,
    pub max_completion_ports: u32,
    pub cpu_utilization: u32,
}

/// Diagnostic field pulled off a finalizable object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticProperty {
    pub name: String,
    pub value: String,
}

/// An object waiting on the finalizer queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizerEntry {
    pub type_name: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<DiagnosticProperty>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_from_raw_folds_high_numbers() {
        assert_eq!(Generation::from_raw(0), Generation::Gen0);
        assert_eq!(Generation::from_raw(1), Generation::Gen1);
        assert_eq!(Generation::from_raw(2), Generation::Gen2);
        assert_eq!(Generation::from_raw(3), Generation::Gen2);
    }

    #[test]
    fn test_generation_serializes_as_number() {
        let json = serde_json::to_string(&Generation::Gen1).unwrap();
        assert_eq!(json, "1");
        assert!(serde_json::from_str::<Generation>("7").is_err());
    }

    #[test]
    fn test_stack_frame_rendering() {
        let frame = StackFrame {
            kind: FrameKind::ManagedMethod,
            stack_pointer: 0xABCDEF,
            display: "Program.Main()".to_string(),
        };
        assert_eq!(frame.to_string(), "ManagedMethod       ABCDEF Program.Main()");
    }

    #[test]
    fn test_heap_object_omits_empty_root_paths() {
        let object = HeapObject {
            obj_ref: 0x1000,
            size: 24,
            generation: Generation::Gen0,
            type_name: "System.Object".to_string(),
            is_in_loh: false,
            is_array: false,
            array_length: None,
            gc_root_paths: None,
            root_path_status: None,
        };
        let value = serde_json::to_value(&object).unwrap();
        assert!(value.get("gc_root_paths").is_none());
        assert!(value.get("array_length").is_none());
        assert_eq!(value["generation"], 0);
    }

    #[test]
    fn test_root_display_blank_type() {
        let root = GcRoot {
            address: 0x10,
            kind: RootKind::Strong,
            name: None,
            object_ref: 0,
            type_name: String::new(),
        };
        assert!(root.to_string().ends_with("TypeName: <No Type>"));
    }
}
