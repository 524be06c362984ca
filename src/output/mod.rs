//! Unified JSON output.
//!
//! This module provides:
//! - `UnifiedOutput`: a single structure containing the full overlay result
//! - `OutputCollector`: a builder for assembling and writing it
//!
//! # Example
//!
//! ```ignore
//! use fusecomp::output::OutputCollector;
//!
//! let collector = OutputCollector::new()
//!     .with_gene_model(gene_model_info)
//!     .with_overlay(overlay_output);
//!
//! collector.write_to_prefix("comparison")?;
//! ```

pub mod collector;
pub mod schema;
pub mod types;

// Re-export main types for convenience
pub use collector::OutputCollector;
pub use types::{
    BreakpointRecord, CombinationCount, FusionRecord, GeneModelInfo, GroupRecord, OverlayOutput,
    UnifiedOutput,
};
