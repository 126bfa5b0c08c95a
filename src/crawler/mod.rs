//! Crawler module: the freezing engine
//!
//! This module contains the core freezing logic, including:
//! - Generation tasks and their dedup keys
//! - Seed generators that start a run
//! - Anchor extraction from rendered pages
//! - The breadth-first crawl loop

mod coordinator;
mod parser;
mod seeds;
mod task;

pub use coordinator::{CancelHandle, Freezer, FreezerOptions};
pub use parser::extract_anchors;
pub use seeds::{ConfiguredSeeds, RouteTableSeeds, SeedGenerator};
pub use task::GenerationTask;
