//! Export sink contract and the scoped bulk-insert handle.
//!
//! The summarizer needs very little from a destination: a batch it can
//! push records into one at a time, in any order, and a guarantee that the
//! batch is flushed when the scope ends, whether the run succeeded or not.

use super::http::HttpSink;
use super::ndjson::NdjsonSink;
use super::record::ExportRecord;
use crate::utils::error::OutputError;
use log::{debug, warn};
use std::path::Path;

/// One open batch on a destination
pub trait BatchWriter {
    fn store(&mut self, record: &ExportRecord) -> Result<(), OutputError>;

    /// Make every stored record durable
    fn flush(&mut self) -> Result<(), OutputError>;
}

/// A destination for exported records
pub trait ExportSink {
    fn open_batch(&mut self) -> Result<Box<dyn BatchWriter + '_>, OutputError>;
}

/// Scoped batch write; flushes on `finish` or, failing that, on drop
pub struct BulkInsert<'a> {
    writer: Box<dyn BatchWriter + 'a>,
    stored: u64,
    finished: bool,
}

impl<'a> BulkInsert<'a> {
    pub fn open(sink: &'a mut dyn ExportSink) -> Result<Self, OutputError> {
        Ok(Self {
            writer: sink.open_batch()?,
            stored: 0,
            finished: false,
        })
    }

    pub fn store(&mut self, record: &ExportRecord) -> Result<(), OutputError> {
        self.writer.store(record)?;
        self.stored += 1;
        Ok(())
    }

    pub fn stored(&self) -> u64 {
        self.stored
    }

    /// Flush and close the batch, returning the number of records stored
    pub fn finish(mut self) -> Result<u64, OutputError> {
        self.finished = true;
        self.writer.flush()?;
        debug!("Bulk insert finished: {} records", self.stored);
        Ok(self.stored)
    }
}

impl Drop for BulkInsert<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.writer.flush() {
            warn!("Failed to flush bulk insert on early exit: {}", e);
        }
    }
}

/// Open the destination named by `target`.
///
/// `http://` and `https://` targets are remote stores; anything else is a
/// directory that receives `<database>.ndjson`.
pub fn open_sink(target: &str, database: &str) -> Result<Box<dyn ExportSink>, OutputError> {
    if target.trim().is_empty() {
        return Err(OutputError::InvalidPath("Destination is empty".to_string()));
    }

    if target.starts_with("http://") || target.starts_with("https://") {
        Ok(Box::new(HttpSink::new(target, database)?))
    } else {
        let path = Path::new(target).join(format!("{}.ndjson", database));
        Ok(Box::new(NdjsonSink::new(path)))
    }
}
