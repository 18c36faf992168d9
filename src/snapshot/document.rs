//! JSON snapshot documents and the provider that serves them.
//!
//! A snapshot document is an exported, already-decoded heap snapshot:
//! every object with its type, size, generation and outgoing references,
//! plus the roots, threads and finalizer queue. Reading native crash dumps
//! is left to whatever tool produces these documents.

use super::provider::{FieldValue, RawRoot, RawThread, SnapshotProvider, TypeInfo};
use crate::heap::schema::ThreadPoolInfo;
use crate::utils::error::SnapshotError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One object entry of a snapshot document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawObject {
    pub address: u64,

    /// `None` marks an entry whose type could not be resolved
    #[serde(default)]
    pub type_name: Option<String>,

    #[serde(default)]
    pub base_size: u64,

    /// Total size; falls back to `base_size` when absent
    #[serde(default)]
    pub size: Option<u64>,

    #[serde(default)]
    pub generation: u32,

    #[serde(default)]
    pub is_in_loh: bool,

    /// Present only for arrays
    #[serde(default)]
    pub array_length: Option<usize>,

    #[serde(default)]
    pub references: Vec<u64>,

    /// Readable instance fields; `null` values are null references
    #[serde(default)]
    pub fields: HashMap<String, Option<String>>,
}

impl RawObject {
    pub fn new(address: u64, type_name: impl Into<String>, size: u64) -> Self {
        Self {
            address,
            type_name: Some(type_name.into()),
            base_size: size,
            size: Some(size),
            generation: 0,
            is_in_loh: false,
            array_length: None,
            references: Vec::new(),
            fields: HashMap::new(),
        }
    }

    /// An entry the snapshot cannot resolve a type for
    pub fn corrupted(address: u64) -> Self {
        Self {
            type_name: None,
            ..Self::new(address, "", 0)
        }
    }

    pub fn with_references(mut self, references: Vec<u64>) -> Self {
        self.references = references;
        self
    }

    pub fn with_generation(mut self, generation: u32) -> Self {
        self.generation = generation;
        self
    }

    pub fn in_loh(mut self) -> Self {
        self.is_in_loh = true;
        self
    }

    pub fn with_array_length(mut self, length: usize) -> Self {
        self.array_length = Some(length);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.fields.insert(name.into(), value.map(str::to_string));
        self
    }
}

/// A complete snapshot document as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default = "default_can_walk_heap")]
    pub can_walk_heap: bool,

    #[serde(default)]
    pub objects: Vec<RawObject>,

    #[serde(default)]
    pub roots: Vec<RawRoot>,

    #[serde(default)]
    pub threads: Vec<RawThread>,

    #[serde(default)]
    pub finalizer_queue: Vec<u64>,

    #[serde(default)]
    pub thread_pool: Option<ThreadPoolInfo>,
}

fn default_can_walk_heap() -> bool {
    true
}

impl Default for SnapshotDocument {
    fn default() -> Self {
        Self {
            can_walk_heap: true,
            objects: Vec::new(),
            roots: Vec::new(),
            threads: Vec::new(),
            finalizer_queue: Vec::new(),
            thread_pool: None,
        }
    }
}

/// Snapshot provider backed by an in-memory [`SnapshotDocument`]
#[derive(Debug, Clone)]
pub struct JsonSnapshot {
    document: SnapshotDocument,
    by_address: HashMap<u64, usize>,
}

impl JsonSnapshot {
    /// Index a document, rejecting duplicate object addresses
    pub fn from_document(document: SnapshotDocument) -> Result<Self, SnapshotError> {
        let mut by_address = HashMap::with_capacity(document.objects.len());

        for (position, object) in document.objects.iter().enumerate() {
            if by_address.insert(object.address, position).is_some() {
                return Err(SnapshotError::DuplicateObject(object.address));
            }
        }

        debug!(
            "Indexed snapshot: {} objects, {} roots, {} threads",
            document.objects.len(),
            document.roots.len(),
            document.threads.len()
        );

        Ok(Self {
            document,
            by_address,
        })
    }

    /// Load a snapshot document from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        info!("Loading snapshot from: {}", path.display());

        let file = File::open(path)?;
        let document: SnapshotDocument = serde_json::from_reader(BufReader::new(file))?;

        Self::from_document(document)
    }

    /// Parse a snapshot document from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let document: SnapshotDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    pub fn document(&self) -> &SnapshotDocument {
        &self.document
    }

    fn object(&self, obj: u64) -> Option<&RawObject> {
        self.by_address
            .get(&obj)
            .map(|&position| &self.document.objects[position])
    }
}

impl SnapshotProvider for JsonSnapshot {
    fn can_walk_heap(&self) -> bool {
        self.document.can_walk_heap
    }

    fn enumerate_objects(&self) -> Box<dyn Iterator<Item = u64> + '_> {
        Box::new(self.document.objects.iter().map(|object| object.address))
    }

    fn object_type(&self, obj: u64) -> Option<TypeInfo> {
        let object = self.object(obj)?;
        let name = object.type_name.clone()?;

        Some(TypeInfo {
            name,
            base_size: object.base_size,
            is_array: object.array_length.is_some(),
        })
    }

    fn object_size(&self, obj: u64) -> u64 {
        self.object(obj)
            .map(|object| object.size.unwrap_or(object.base_size))
            .unwrap_or(0)
    }

    fn array_length(&self, obj: u64) -> Option<usize> {
        self.object(obj).and_then(|object| object.array_length)
    }

    fn generation(&self, obj: u64) -> u32 {
        self.object(obj).map(|object| object.generation).unwrap_or(0)
    }

    fn is_in_large_object_heap(&self, obj: u64) -> bool {
        self.object(obj).map(|object| object.is_in_loh).unwrap_or(false)
    }

    fn enumerate_roots(&self) -> Box<dyn Iterator<Item = RawRoot> + '_> {
        Box::new(self.document.roots.iter().cloned())
    }

    fn enumerate_threads(&self) -> Box<dyn Iterator<Item = RawThread> + '_> {
        Box::new(self.document.threads.iter().cloned())
    }

    fn enumerate_finalizer_queue(&self) -> Box<dyn Iterator<Item = u64> + '_> {
        Box::new(self.document.finalizer_queue.iter().copied())
    }

    fn thread_pool(&self) -> Option<ThreadPoolInfo> {
        self.document.thread_pool.clone()
    }

    fn enumerate_references(&self, obj: u64, visitor: &mut dyn FnMut(u64)) {
        if let Some(object) = self.object(obj) {
            for &child in &object.references {
                visitor(child);
            }
        }
    }

    fn field_value(&self, obj: u64, field: &str) -> FieldValue {
        match self.object(obj).and_then(|object| object.fields.get(field)) {
            None => FieldValue::Missing,
            Some(None) => FieldValue::Null,
            Some(Some(value)) => FieldValue::Value(value.clone()),
        }
    }
}

/// Parse an object address from hex (`0x` prefix) or decimal
pub fn parse_address(value: &str) -> Result<u64, SnapshotError> {
    let value = value.trim();

    if let Some(hex_str) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        u64::from_str_radix(hex_str, 16)
            .map_err(|e| SnapshotError::InvalidFormat(format!("Invalid hex address: {}", e)))
    } else {
        value
            .parse::<u64>()
            .map_err(|e| SnapshotError::InvalidFormat(format!("Invalid decimal address: {}", e)))
    }
}
