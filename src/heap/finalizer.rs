//! Diagnostic extraction for finalizer queue entries.
//!
//! A few type families carry a field that makes a leaked finalizable
//! object easy to identify (the file a stream was opened on, the name of
//! an ESENT table). Each family gets an inspector; everything else goes
//! through [`NoopInspector`].

use crate::snapshot::{FieldValue, SnapshotProvider};
use crate::utils::config::{
    EMPTY_FILENAME_FIELD, EMPTY_TABLE_NAME_FIELD, ESENT_TABLE_NAME_FIELD, ESENT_TABLE_TYPE,
    NO_FILENAME_FIELD, NO_TABLE_NAME_FIELD, STREAM_FILENAME_FIELD, STREAM_TYPE_MARKER,
};

/// Pulls one diagnostic string off a live object
pub trait FinalizerInspector: Sync {
    /// Name of the field this inspector reports, `None` for no-op
    fn property_name(&self) -> Option<&'static str>;

    fn extract_diagnostic(&self, provider: &dyn SnapshotProvider, obj: u64) -> Option<String>;
}

/// Stream-like types: reports the `_fileName` field
pub struct StreamInspector;

/// `Microsoft.Isam.Esent.Interop.Table`: reports the table `name`
pub struct EsentTableInspector;

/// Types with nothing worth extracting
pub struct NoopInspector;

impl FinalizerInspector for StreamInspector {
    fn property_name(&self) -> Option<&'static str> {
        Some(STREAM_FILENAME_FIELD)
    }

    fn extract_diagnostic(&self, provider: &dyn SnapshotProvider, obj: u64) -> Option<String> {
        let value = provider.field_value(obj, STREAM_FILENAME_FIELD);
        Some(field_or_sentinel(value, NO_FILENAME_FIELD, EMPTY_FILENAME_FIELD))
    }
}

impl FinalizerInspector for EsentTableInspector {
    fn property_name(&self) -> Option<&'static str> {
        Some(ESENT_TABLE_NAME_FIELD)
    }

    fn extract_diagnostic(&self, provider: &dyn SnapshotProvider, obj: u64) -> Option<String> {
        let value = provider.field_value(obj, ESENT_TABLE_NAME_FIELD);
        Some(field_or_sentinel(value, NO_TABLE_NAME_FIELD, EMPTY_TABLE_NAME_FIELD))
    }
}

impl FinalizerInspector for NoopInspector {
    fn property_name(&self) -> Option<&'static str> {
        None
    }

    fn extract_diagnostic(&self, _provider: &dyn SnapshotProvider, _obj: u64) -> Option<String> {
        None
    }
}

/// Select the inspector for a runtime type name.
///
/// The stream check runs first, so a type matching both families is
/// treated as a stream.
pub fn inspector_for(type_name: &str) -> &'static dyn FinalizerInspector {
    if type_name.contains(STREAM_TYPE_MARKER) {
        &StreamInspector
    } else if type_name == ESENT_TABLE_TYPE {
        &EsentTableInspector
    } else {
        &NoopInspector
    }
}

fn field_or_sentinel(value: FieldValue, missing: &str, empty: &str) -> String {
    match value {
        FieldValue::Missing => missing.to_string(),
        FieldValue::Null => empty.to_string(),
        FieldValue::Value(text) if text.trim().is_empty() => empty.to_string(),
        FieldValue::Value(text) => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{JsonSnapshot, RawObject, SnapshotDocument};

    fn snapshot_with(object: RawObject) -> JsonSnapshot {
        JsonSnapshot::from_document(SnapshotDocument {
            objects: vec![object],
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_inspector_selection() {
        assert_eq!(
            inspector_for("System.IO.FileStream").property_name(),
            Some("_fileName")
        );
        assert_eq!(inspector_for(ESENT_TABLE_TYPE).property_name(), Some("name"));
        assert_eq!(inspector_for("System.Threading.Timer").property_name(), None);
    }

    #[test]
    fn test_stream_filename_extracted() {
        let snapshot = snapshot_with(
            RawObject::new(0x10, "System.IO.FileStream", 64)
                .with_field("_fileName", Some("C:\\data\\log.txt")),
        );
        let value = StreamInspector.extract_diagnostic(&snapshot, 0x10);
        assert_eq!(value.as_deref(), Some("C:\\data\\log.txt"));
    }

    #[test]
    fn test_stream_sentinels() {
        let missing = snapshot_with(RawObject::new(0x10, "System.IO.MemoryStream", 64));
        assert_eq!(
            StreamInspector.extract_diagnostic(&missing, 0x10).as_deref(),
            Some(NO_FILENAME_FIELD)
        );

        let empty = snapshot_with(
            RawObject::new(0x10, "System.IO.FileStream", 64).with_field("_fileName", Some("  ")),
        );
        assert_eq!(
            StreamInspector.extract_diagnostic(&empty, 0x10).as_deref(),
            Some(EMPTY_FILENAME_FIELD)
        );
    }

    #[test]
    fn test_esent_table_sentinels() {
        let null = snapshot_with(RawObject::new(0x10, ESENT_TABLE_TYPE, 48).with_field("name", None));
        assert_eq!(
            EsentTableInspector.extract_diagnostic(&null, 0x10).as_deref(),
            Some(EMPTY_TABLE_NAME_FIELD)
        );

        let missing = snapshot_with(RawObject::new(0x10, ESENT_TABLE_TYPE, 48));
        assert_eq!(
            EsentTableInspector.extract_diagnostic(&missing, 0x10).as_deref(),
            Some(NO_TABLE_NAME_FIELD)
        );
    }

    #[test]
    fn test_noop_extracts_nothing() {
        let snapshot = snapshot_with(RawObject::new(0x10, "System.Object", 24));
        assert!(NoopInspector.extract_diagnostic(&snapshot, 0x10).is_none());
    }
}
