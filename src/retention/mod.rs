//! Retention analysis: which GC root keeps an object alive, and how.

pub mod resolver;

// Re-export main types
pub use resolver::{ResolverConfig, RootPath, RootPathOutcome, RootPathResolver, SearchOrder};
