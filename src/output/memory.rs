//! In-memory destination, for callers that post-process records themselves.

use super::record::ExportRecord;
use super::sink::{BatchWriter, ExportSink};
use crate::utils::error::OutputError;

/// Collects flushed records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<ExportRecord>,
    fail_after: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every store after the first `limit` records
    pub fn failing_after(limit: usize) -> Self {
        Self {
            records: Vec::new(),
            fail_after: Some(limit),
        }
    }

    /// Records made durable so far
    pub fn records(&self) -> &[ExportRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ExportRecord> {
        self.records
    }
}

struct MemoryBatch<'a> {
    committed: &'a mut Vec<ExportRecord>,
    pending: Vec<ExportRecord>,
    accepted: usize,
    fail_after: Option<usize>,
}

impl ExportSink for MemorySink {
    fn open_batch(&mut self) -> Result<Box<dyn BatchWriter + '_>, OutputError> {
        Ok(Box::new(MemoryBatch {
            committed: &mut self.records,
            pending: Vec::new(),
            accepted: 0,
            fail_after: self.fail_after,
        }))
    }
}

impl BatchWriter for MemoryBatch<'_> {
    fn store(&mut self, record: &ExportRecord) -> Result<(), OutputError> {
        if self.fail_after.is_some_and(|limit| self.accepted >= limit) {
            return Err(OutputError::Rejected(format!(
                "memory sink limit of {} records reached",
                self.accepted
            )));
        }
        self.pending.push(record.clone());
        self.accepted += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.committed.append(&mut self.pending);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::schema::ThreadPoolInfo;
    use crate::output::sink::BulkInsert;

    #[test]
    fn test_records_visible_after_finish() {
        let mut sink = MemorySink::new();
        let mut bulk = BulkInsert::open(&mut sink).unwrap();
        bulk.store(&ExportRecord::ThreadPool(ThreadPoolInfo::default())).unwrap();
        bulk.finish().unwrap();

        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn test_failing_sink_rejects() {
        let mut sink = MemorySink::failing_after(1);
        let mut bulk = BulkInsert::open(&mut sink).unwrap();
        let record = ExportRecord::ThreadPool(ThreadPoolInfo::default());

        assert!(bulk.store(&record).is_ok());
        assert!(matches!(bulk.store(&record), Err(OutputError::Rejected(_))));
        drop(bulk);

        // The accepted record is still flushed when the scope ends
        assert_eq!(sink.records().len(), 1);
    }
}
