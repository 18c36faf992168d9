//! Newline-delimited JSON file destination.
//!
//! One [`ExportRecord`] per line. The file is created (parents included)
//! when a batch opens and fsynced when it is flushed.

use super::record::ExportRecord;
use super::sink::{BatchWriter, ExportSink};
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes records to a single NDJSON file
#[derive(Debug, Clone)]
pub struct NdjsonSink {
    path: PathBuf,
}

impl NdjsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

struct NdjsonBatch {
    writer: BufWriter<File>,
}

impl ExportSink for NdjsonSink {
    fn open_batch(&mut self) -> Result<Box<dyn BatchWriter + '_>, OutputError> {
        info!("Writing records to: {}", self.path.display());

        validate_output_path(&self.path)?;

        // Create parent directories if needed
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating parent directories: {}", parent.display());
                std::fs::create_dir_all(parent).map_err(|e| {
                    OutputError::InvalidPath(format!(
                        "Cannot create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(&self.path)?;

        Ok(Box::new(NdjsonBatch {
            writer: BufWriter::new(file),
        }))
    }
}

impl BatchWriter for NdjsonBatch {
    fn store(&mut self, record: &ExportRecord) -> Result<(), OutputError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(())
    }
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Check if we're trying to overwrite a directory
    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Read every record back from an NDJSON export
///
/// Blank lines are ignored; any malformed line fails the read.
pub fn read_records(input_path: impl AsRef<Path>) -> Result<Vec<ExportRecord>, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading records from: {}", input_path.display());

    let reader = BufReader::new(File::open(input_path)?);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }

    debug!("Loaded {} records", records.len());

    Ok(records)
}
