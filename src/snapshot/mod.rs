//! Snapshot access.
//!
//! This module handles:
//! - The read-only provider contract over a frozen heap snapshot
//! - A JSON document format and the provider serving it
//! - Address parsing for user input

pub mod document;
pub mod provider;

// Re-export main types
pub use document::{parse_address, JsonSnapshot, RawObject, SnapshotDocument};
pub use provider::{FieldValue, RawRoot, RawThread, SnapshotProvider, TypeInfo};
