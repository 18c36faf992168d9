//! Remote document-store destination over HTTP.
//!
//! Records are buffered as NDJSON and POSTed to
//! `{url}/databases/{database}/bulk`, one request per `HTTP_BATCH_SIZE`
//! records plus a final one on flush. Requests are blocking, so at most one
//! is in flight per batch.
//!
//! The buffer is only cleared once the store answers 2xx. After a failed
//! request the records stay pending and the next flush sends them again.

use super::record::ExportRecord;
use super::sink::{BatchWriter, ExportSink};
use crate::utils::config::{DEFAULT_HTTP_TIMEOUT, HTTP_BATCH_SIZE};
use crate::utils::error::OutputError;
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

pub struct HttpSink {
    client: Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(url: &str, database: &str) -> Result<Self, OutputError> {
        let client = Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(OutputError::RequestFailed)?;

        Ok(Self {
            client,
            endpoint: bulk_endpoint(url, database),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

struct HttpBatch<'a> {
    client: &'a Client,
    endpoint: &'a str,
    buffer: Vec<u8>,
    buffered: usize,
}

impl ExportSink for HttpSink {
    fn open_batch(&mut self) -> Result<Box<dyn BatchWriter + '_>, OutputError> {
        info!("Sending records to: {}", self.endpoint);

        Ok(Box::new(HttpBatch {
            client: &self.client,
            endpoint: &self.endpoint,
            buffer: Vec::new(),
            buffered: 0,
        }))
    }
}

impl HttpBatch<'_> {
    fn send(&mut self) -> Result<(), OutputError> {
        debug!("Posting {} records to {}", self.buffered, self.endpoint);

        let response = self
            .client
            .post(self.endpoint)
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(self.buffer.clone())
            .send()
            .map_err(OutputError::RequestFailed)?;

        if !response.status().is_success() {
            return Err(OutputError::Rejected(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().unwrap_or_default()
            )));
        }

        self.buffer.clear();
        self.buffered = 0;
        Ok(())
    }
}

impl BatchWriter for HttpBatch<'_> {
    /// A full buffer is sent before the record is added, so a rejected
    /// request leaves the record unstored
    fn store(&mut self, record: &ExportRecord) -> Result<(), OutputError> {
        if self.buffered >= HTTP_BATCH_SIZE {
            self.send()?;
        }

        let line = serde_json::to_vec(record)?;
        self.buffer.extend_from_slice(&line);
        self.buffer.push(b'\n');
        self.buffered += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        if self.buffered > 0 {
            self.send()?;
        }
        Ok(())
    }
}

/// Build the bulk endpoint for a database
fn bulk_endpoint(url: &str, database: &str) -> String {
    format!("{}/databases/{}/bulk", url.trim_end_matches('/'), database)
}
