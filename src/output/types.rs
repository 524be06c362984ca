//! Output data structures for the unified comparison result.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::annotation::GeneAnnotationIndex;
use crate::fusion::Fusion;
use crate::overlay::{MatchedGroup, OverlayReport};

/// Top-level unified output structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct UnifiedOutput {
    /// Tool version
    pub version: String,

    /// Timestamp of analysis (ISO 8601 format)
    pub timestamp: String,

    /// Gene model the breakpoints were annotated against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gene_model: Option<GeneModelInfo>,

    /// Overlay result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<OverlayOutput>,
}

/// Provenance of the gene annotation used for matching.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GeneModelInfo {
    /// Genome build label (e.g. "hg19")
    pub build: String,

    /// Number of annotation records loaded
    pub n_records: usize,

    /// Flank applied symmetrically around every gene interval
    pub flank: u64,
}

impl GeneModelInfo {
    pub fn from_index(index: &GeneAnnotationIndex) -> Self {
        Self {
            build: index.build().to_string(),
            n_records: index.len(),
            flank: index.flank(),
        }
    }
}

/// The overlay result: matched groups, leftovers and per-combination counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct OverlayOutput {
    /// Experiment names in comparison order
    pub experiments: Vec<String>,

    /// Fusions per experiment after deduplication, aligned with `experiments`
    pub experiment_sizes: Vec<usize>,

    /// Maximal matched groups
    pub groups: Vec<GroupRecord>,

    /// Fusions that matched nothing in any other experiment
    pub unmatched: Vec<FusionRecord>,

    /// Match count for every combination of two or more experiments,
    /// zeros included
    pub counts: Vec<CombinationCount>,
}

impl From<&OverlayReport> for OverlayOutput {
    fn from(report: &OverlayReport) -> Self {
        Self {
            experiments: report.experiment_names.clone(),
            experiment_sizes: report.experiment_sizes.clone(),
            groups: report.groups.iter().map(GroupRecord::from).collect(),
            unmatched: report.unmatched.iter().map(FusionRecord::from).collect(),
            counts: report
                .counts
                .iter()
                .map(|(combination, n_matches)| CombinationCount {
                    combination: combination.split('&').map(String::from).collect(),
                    n_matches: *n_matches,
                })
                .collect(),
        }
    }
}

/// One matched group of fusions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GroupRecord {
    /// Contributing experiment names
    pub experiments: Vec<String>,

    /// Shared genes on the left side (per-side intersection over members)
    pub genes_left: Vec<String>,

    /// Shared genes on the right side
    pub genes_right: Vec<String>,

    /// Member fusions, one per experiment
    pub members: Vec<FusionRecord>,
}

impl From<&MatchedGroup> for GroupRecord {
    fn from(group: &MatchedGroup) -> Self {
        Self {
            experiments: group.experiments.clone(),
            genes_left: group.genes_left.iter().map(|g| g.name.clone()).collect(),
            genes_right: group.genes_right.iter().map(|g| g.name.clone()).collect(),
            members: group.members.iter().map(FusionRecord::from).collect(),
        }
    }
}

/// One fusion call as reported.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FusionRecord {
    /// Experiment that called this fusion
    pub experiment: String,

    /// Caller-assigned identifier, unique within the experiment
    pub id: String,

    pub left: BreakpointRecord,
    pub right: BreakpointRecord,

    /// Genes annotated at the left breakpoint (empty if intergenic)
    pub genes_left: Vec<String>,

    /// Genes annotated at the right breakpoint
    pub genes_right: Vec<String>,
}

impl From<&Fusion> for FusionRecord {
    fn from(fusion: &Fusion) -> Self {
        Self {
            experiment: fusion.experiment.clone(),
            id: fusion.id.clone(),
            left: BreakpointRecord {
                chromosome: fusion.left.chromosome.clone(),
                position: fusion.left.position,
                strand: fusion.left.strand.symbol(),
            },
            right: BreakpointRecord {
                chromosome: fusion.right.chromosome.clone(),
                position: fusion.right.position,
                strand: fusion.right.strand.symbol(),
            },
            genes_left: fusion
                .annotated_genes_left()
                .iter()
                .map(|g| g.name.clone())
                .collect(),
            genes_right: fusion
                .annotated_genes_right()
                .iter()
                .map(|g| g.name.clone())
                .collect(),
        }
    }
}

/// One breakpoint location.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BreakpointRecord {
    pub chromosome: String,

    /// 1-based position
    pub position: u64,

    /// '+' or '-'
    pub strand: char,
}

/// Match count for one experiment combination.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CombinationCount {
    /// Experiment names in the combination, in comparison order
    pub combination: Vec<String>,

    /// Number of matched groups found for exactly this combination
    pub n_matches: usize,
}
