//! One experiment's fusion calls: annotation and deduplication.

use log::{debug, info};

use crate::annotation::GeneAnnotationIndex;
use crate::config::MatchingConfig;
use crate::fusion::Fusion;
use crate::matching::fusions_match;

/// The fusion calls of one detection experiment, in insertion order.
#[derive(Debug, Clone)]
pub struct FusionDetectionExperiment {
    name: String,
    fusions: Vec<Fusion>,
}

impl FusionDetectionExperiment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fusions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_fusion(&mut self, fusion: Fusion) {
        self.fusions.push(fusion);
    }

    pub fn fusions(&self) -> &[Fusion] {
        &self.fusions
    }

    pub fn len(&self) -> usize {
        self.fusions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fusions.is_empty()
    }

    /// Annotate every fusion against the gene index. Breakpoints no gene
    /// covers get empty gene lists, which still counts as annotated.
    pub fn annotate_genes(&mut self, index: &GeneAnnotationIndex) {
        for fusion in &mut self.fusions {
            fusion.annotate(index);
        }
        debug!(
            "annotated {} fusions in experiment {} against {} ({} records)",
            self.fusions.len(),
            self.name,
            index.build(),
            index.len()
        );
    }

    /// Collapse fusions that match under `config`, keeping the first
    /// occurrence in insertion order. Each later fusion is compared against
    /// the already-kept ones and dropped on the first hit, so the earliest
    /// fusion of a cluster always survives and a second pass removes
    /// nothing. Returns the number of fusions removed.
    ///
    /// # Panics
    /// If any fusion is unannotated.
    pub fn remove_duplicates(&mut self, config: &MatchingConfig) -> usize {
        let fusions = std::mem::take(&mut self.fusions);
        let before = fusions.len();
        let mut kept: Vec<Fusion> = Vec::with_capacity(before);
        for fusion in fusions {
            if let Some(winner) = kept.iter().find(|k| fusions_match(k, &fusion, config)) {
                debug!(
                    "experiment {}: fusion {} is a duplicate of {}",
                    self.name, fusion.id, winner.id
                );
            } else {
                kept.push(fusion);
            }
        }
        let removed = before - kept.len();
        if removed > 0 {
            info!(
                "experiment {}: removed {} duplicate fusions ({} remain)",
                self.name, removed, kept.len()
            );
        }
        self.fusions = kept;
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Gene;
    use crate::config::{MatchMode, OutputFormat};
    use crate::fusion::Strand;

    fn annotated(id: &str, left: &[&str], right: &[&str]) -> Fusion {
        let mut f = Fusion::new(
            "chr1", "chr2", 1000, 2000,
            Strand::Forward, Strand::Forward,
            "exp", id, true,
        );
        f.annotate_genes_left(left.iter().map(|n| Gene::new(n, false)).collect());
        f.annotate_genes_right(right.iter().map(|n| Gene::new(n, false)).collect());
        f
    }

    fn subset_config() -> MatchingConfig {
        MatchingConfig::new(MatchMode::Subset, false, OutputFormat::List)
    }

    #[test]
    fn test_first_fit_keeps_earliest() {
        let mut exp = FusionDetectionExperiment::new("e1");
        exp.add_fusion(annotated("f1", &["X"], &["A", "B"]));
        exp.add_fusion(annotated("f2", &["X"], &["A"]));
        exp.add_fusion(annotated("f3", &["Y"], &["C"]));

        let removed = exp.remove_duplicates(&subset_config());
        assert_eq!(removed, 1);
        assert_eq!(exp.len(), 2);
        assert_eq!(exp.fusions()[0].id, "f1");
        assert_eq!(exp.fusions()[1].id, "f3");
    }

    #[test]
    fn test_dedup_is_idempotent() {
        // A non-transitive chain: f1~f2 and f2~f3 but not f1~f3. First-fit
        // drops f2 into f1's cluster, then f3 matches neither survivor under
        // subset... except f3 ⊆ f2 only, so f3 is kept. Re-running changes
        // nothing.
        let mut exp = FusionDetectionExperiment::new("e1");
        exp.add_fusion(annotated("f1", &["X"], &["A", "B"]));
        exp.add_fusion(annotated("f2", &["X"], &["A", "B", "C"]));
        exp.add_fusion(annotated("f3", &["X"], &["B", "C"]));

        let config = subset_config();
        let removed = exp.remove_duplicates(&config);
        assert_eq!(removed, 1);
        assert_eq!(exp.len(), 2);

        let removed_again = exp.remove_duplicates(&config);
        assert_eq!(removed_again, 0);
        assert_eq!(exp.len(), 2);
    }

    #[test]
    fn test_intergenic_duplicates_collapse() {
        let mut exp = FusionDetectionExperiment::new("e1");
        exp.add_fusion(annotated("f1", &[], &[]));
        exp.add_fusion(annotated("f2", &[], &[]));
        assert_eq!(exp.remove_duplicates(&subset_config()), 1);
        assert_eq!(exp.len(), 1);
    }

    #[test]
    fn test_annotate_genes_covers_all_fusions() {
        let mut index = GeneAnnotationIndex::new("hg19", 0);
        index.add_annotation(Gene::new("G1", false), "chr1", 500, 1500);

        let mut exp = FusionDetectionExperiment::new("e1");
        exp.add_fusion(Fusion::new(
            "chr1", "chr2", 1000, 9000,
            Strand::Forward, Strand::Forward,
            "e1", "f1", true,
        ));
        exp.annotate_genes(&index);
        assert!(exp.fusions()[0].is_annotated());
        assert_eq!(exp.fusions()[0].annotated_genes_left()[0].name, "G1");
        assert!(exp.fusions()[0].annotated_genes_right().is_empty());
    }
}
