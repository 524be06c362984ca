//! Matching configuration.
//!
//! The configuration is a small immutable value passed explicitly into
//! every annotation, deduplication and overlay call. Nothing in the
//! matching path reads process-wide state.

use clap::ValueEnum;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;

/// How two per-side gene sets are compared.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Exact gene match: both sides carry identical gene sets.
    Egm,
    /// Either gene set may be contained in the other.
    Subset,
    /// Any shared gene suffices.
    Overlap,
}

/// Shape of the written report.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per matched group and per unmatched fusion.
    List,
    /// Aggregate match counts per experiment combination.
    Summary,
}

/// All knobs consulted by matching, deduplication and overlay.
#[derive(Deserialize, Debug, Clone)]
pub struct MatchingConfig {
    #[serde(default = "default_mode")]
    pub mode: MatchMode,
    /// Require breakpoint strands to agree (left with left, right with right).
    #[serde(default)]
    pub strand_specific: bool,
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

fn default_mode() -> MatchMode {
    MatchMode::Subset
}

fn default_format() -> OutputFormat {
    OutputFormat::List
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            strand_specific: false,
            format: default_format(),
        }
    }
}

impl MatchingConfig {
    pub fn new(mode: MatchMode, strand_specific: bool, format: OutputFormat) -> Self {
        Self {
            mode,
            strand_specific,
            format,
        }
    }

    /// Load a matching configuration from a JSON file.
    pub fn load(path: &str) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: MatchingConfig = serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }
}
