//! fusecomp: compare gene-fusion calls across detection experiments.
//!
//! Fusion callers rarely agree on exact breakpoint coordinates, so fusions
//! are compared by the genes spanning each breakpoint instead: every
//! breakpoint is annotated against a gene model (with a configurable
//! flank), and two fusions are the same event when their per-side gene
//! sets satisfy the configured relation (exact match, subset or overlap).
//! On top of that sit within-experiment deduplication and a
//! multi-experiment overlay that reports the matched fusion groups for
//! every combination of experiments.

pub mod annotation;
pub mod config;
pub mod experiment;
pub mod fusion;
pub mod input;
pub mod matching;
pub mod output;
pub mod overlay;
pub mod report;
pub mod utils;
