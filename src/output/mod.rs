//! Output module for persisting frozen pages and reporting on a run
//!
//! This module handles:
//! - Mapping URLs to files below the destination directory
//! - Writing page bodies
//! - Recording per-task outcomes and summarising them

mod markdown;
mod report;
mod stats;
mod writer;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use report::{body_digest, FreezeReport, FrozenRecord};
pub use stats::print_report;
pub use writer::{output_path_for, OutputWriter};
