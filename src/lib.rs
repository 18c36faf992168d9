//! Heapdump Summarizer
//!
//! Turns a frozen managed-heap snapshot into normalized records
//! (objects, GC roots, threads, finalizer queue entries), per-type
//! memory statistics, and optional GC root retention paths.
//!
//! This crate provides the core implementation for the
//! `heapdump-summarizer` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! heapdump-summarizer summarize --dump heap.json --url ./out --summary
//! heapdump-summarizer root-path --dump heap.json --object 0x7f3a10
//! ```
//!
//! Library users implement [`snapshot::SnapshotProvider`] over their own
//! snapshot source and call [`pipeline::summarize_snapshot`].

pub mod aggregator;
pub mod commands;
pub mod heap;
pub mod output;
pub mod pipeline;
pub mod retention;
pub mod snapshot;
pub mod utils;
