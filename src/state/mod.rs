//! State module for tracking freeze progress
//!
//! This module provides state management for tasks during a freeze run.
//!
//! # Components
//!
//! - `TaskState`: Tracks the lifecycle of individual generation tasks
//! - `CrawlState`: The per-run deduplication registries (route keys, URLs)

mod crawl_state;
mod task_state;

// Re-export main types
pub use crawl_state::CrawlState;
pub use task_state::TaskState;
