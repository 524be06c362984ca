//! Output collector for the unified comparison result.

use std::fs::File;

use super::types::{GeneModelInfo, OverlayOutput, UnifiedOutput};

/// Builder assembling the unified output structure.
pub struct OutputCollector {
    output: UnifiedOutput,
}

impl OutputCollector {
    /// Create a new output collector with version and timestamp
    pub fn new() -> Self {
        Self {
            output: UnifiedOutput {
                version: env!("CARGO_PKG_VERSION").to_string(),
                timestamp: crate::utils::time::utc_now_iso8601(),
                ..Default::default()
            },
        }
    }

    /// Record the gene model the fusions were annotated against
    pub fn with_gene_model(mut self, info: GeneModelInfo) -> Self {
        self.output.gene_model = Some(info);
        self
    }

    /// Set the overlay result
    pub fn with_overlay(mut self, overlay: OverlayOutput) -> Self {
        self.output.overlay = Some(overlay);
        self
    }

    /// Build and return the final unified output
    pub fn build(self) -> UnifiedOutput {
        self.output
    }

    /// Get a reference to the current output (for inspection)
    pub fn output(&self) -> &UnifiedOutput {
        &self.output
    }

    /// Write unified JSON to the specified path
    ///
    /// The path should be the full filename (e.g., "comparison.result.json")
    pub fn write_json(&self, path: &str) -> std::io::Result<()> {
        self.output.write_json(path)
    }

    /// Write unified JSON using the output prefix
    ///
    /// Creates "{prefix}.result.json"
    pub fn write_to_prefix(&self, prefix: &str) -> std::io::Result<()> {
        let path = format!("{}.result.json", prefix);
        self.write_json(&path)
    }
}

impl Default for OutputCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl UnifiedOutput {
    /// Write this output to a JSON file
    pub fn write_json(&self, path: &str) -> std::io::Result<()> {
        if super::schema::should_validate() {
            let value = serde_json::to_value(self).map_err(std::io::Error::other)?;
            if let Err(msg) = super::schema::validate(&value) {
                log::warn!("Schema validation failed for {}: {}", path, msg);
                if cfg!(debug_assertions) {
                    return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, msg));
                }
            }
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self).map_err(std::io::Error::other)
    }

    /// Load unified output from a JSON file
    pub fn load_json(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let file = File::open(path)?;
        let output: Self = serde_json::from_reader(file)?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_builder() {
        let collector = OutputCollector::new().with_gene_model(GeneModelInfo {
            build: "hg19".to_string(),
            n_records: 12,
            flank: 100,
        });

        let output = collector.build();
        assert!(!output.version.is_empty());
        assert_eq!(output.gene_model.unwrap().n_records, 12);
        assert!(output.overlay.is_none());
    }

    #[test]
    fn test_write_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("cmp").to_string_lossy().to_string();

        let collector = OutputCollector::new().with_overlay(OverlayOutput {
            experiments: vec!["a".into(), "b".into()],
            experiment_sizes: vec![1, 1],
            ..Default::default()
        });
        collector.write_to_prefix(&prefix).unwrap();

        let loaded = UnifiedOutput::load_json(&format!("{}.result.json", prefix)).unwrap();
        let overlay = loaded.overlay.unwrap();
        assert_eq!(overlay.experiments, vec!["a", "b"]);
        assert_eq!(overlay.experiment_sizes, vec![1, 1]);
    }
}
