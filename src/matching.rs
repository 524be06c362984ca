//! The fusion equivalence policy.
//!
//! Two annotated fusions are the same event when their per-side gene sets
//! satisfy the configured relation on both sides (and, if requested, the
//! strands agree). The subset and overlap relations are symmetric but not
//! transitive, so everything built on top of them (deduplication, overlay)
//! defines its own deterministic grouping rule instead of assuming an
//! equivalence relation.

use std::collections::HashSet;

use crate::annotation::Gene;
use crate::config::{MatchMode, MatchingConfig};
use crate::fusion::Fusion;

/// Compare two per-side gene sets under a match mode.
///
/// Two empty sides agree (there is nothing to disagree on: both calls are
/// intergenic on that side). A side with genes never matches a side
/// without; the trivial "empty set is a subset of everything" reading is
/// deliberately excluded.
pub fn side_relation(a: &[Gene], b: &[Gene], mode: MatchMode) -> bool {
    if a.is_empty() || b.is_empty() {
        return a.is_empty() && b.is_empty();
    }
    let set_a: HashSet<&str> = a.iter().map(|g| g.name.as_str()).collect();
    let set_b: HashSet<&str> = b.iter().map(|g| g.name.as_str()).collect();
    match mode {
        MatchMode::Egm => set_a == set_b,
        MatchMode::Subset => set_a.is_subset(&set_b) || set_b.is_subset(&set_a),
        MatchMode::Overlap => !set_a.is_disjoint(&set_b),
    }
}

/// Decide whether two annotated fusions are the same event.
///
/// # Panics
/// If either fusion is unannotated (see [`Fusion::annotated_genes_left`]).
pub fn fusions_match(a: &Fusion, b: &Fusion, config: &MatchingConfig) -> bool {
    if config.strand_specific
        && (a.left.strand != b.left.strand || a.right.strand != b.right.strand)
    {
        return false;
    }
    side_relation(
        a.annotated_genes_left(),
        b.annotated_genes_left(),
        config.mode,
    ) && side_relation(
        a.annotated_genes_right(),
        b.annotated_genes_right(),
        config.mode,
    )
}

/// Intersection of two gene lists, keeping `a`'s traversal order.
pub fn intersect_genes(a: &[Gene], b: &[Gene]) -> Vec<Gene> {
    let names_b: HashSet<&str> = b.iter().map(|g| g.name.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    a.iter()
        .filter(|g| names_b.contains(g.name.as_str()) && seen.insert(g.name.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::fusion::Strand;

    fn genes(names: &[&str]) -> Vec<Gene> {
        names.iter().map(|n| Gene::new(n, false)).collect()
    }

    fn fusion_with(left: &[&str], right: &[&str], strands: (Strand, Strand)) -> Fusion {
        let mut f = Fusion::new(
            "chr1", "chr2", 1000, 2000, strands.0, strands.1, "exp", "f", true,
        );
        f.annotate_genes_left(genes(left));
        f.annotate_genes_right(genes(right));
        f
    }

    fn config(mode: MatchMode, strand_specific: bool) -> MatchingConfig {
        MatchingConfig::new(mode, strand_specific, OutputFormat::List)
    }

    #[test]
    fn test_egm_requires_equal_sets() {
        assert!(side_relation(&genes(&["A", "B"]), &genes(&["B", "A"]), MatchMode::Egm));
        assert!(!side_relation(&genes(&["A", "B"]), &genes(&["A"]), MatchMode::Egm));
    }

    #[test]
    fn test_subset_either_direction() {
        assert!(side_relation(&genes(&["A"]), &genes(&["A", "B"]), MatchMode::Subset));
        assert!(side_relation(&genes(&["A", "B"]), &genes(&["A"]), MatchMode::Subset));
        assert!(!side_relation(&genes(&["A", "B"]), &genes(&["B", "C"]), MatchMode::Subset));
    }

    #[test]
    fn test_overlap_any_shared_gene() {
        assert!(side_relation(&genes(&["A", "B"]), &genes(&["B", "C"]), MatchMode::Overlap));
        assert!(!side_relation(&genes(&["A"]), &genes(&["C"]), MatchMode::Overlap));
    }

    #[test]
    fn test_both_empty_sides_agree() {
        for mode in [MatchMode::Egm, MatchMode::Subset, MatchMode::Overlap] {
            assert!(side_relation(&[], &[], mode));
        }
    }

    #[test]
    fn test_one_empty_side_never_matches() {
        for mode in [MatchMode::Egm, MatchMode::Subset, MatchMode::Overlap] {
            assert!(!side_relation(&genes(&["A"]), &[], mode));
            assert!(!side_relation(&[], &genes(&["A"]), mode));
        }
    }

    #[test]
    fn test_match_requires_both_sides() {
        let a = fusion_with(&["X"], &["A", "B"], (Strand::Forward, Strand::Forward));
        let b = fusion_with(&["X"], &["C", "D"], (Strand::Forward, Strand::Forward));
        assert!(!fusions_match(&a, &b, &config(MatchMode::Subset, false)));

        let c = fusion_with(&["X"], &["A", "B", "C"], (Strand::Forward, Strand::Forward));
        assert!(fusions_match(&a, &c, &config(MatchMode::Subset, false)));
    }

    #[test]
    fn test_symmetry_all_modes() {
        let a = fusion_with(&["X"], &["A", "B"], (Strand::Forward, Strand::Forward));
        let b = fusion_with(&["X"], &["B", "C", "A"], (Strand::Forward, Strand::Forward));
        for mode in [MatchMode::Egm, MatchMode::Subset, MatchMode::Overlap] {
            let cfg = config(mode, false);
            assert_eq!(fusions_match(&a, &b, &cfg), fusions_match(&b, &a, &cfg));
        }
    }

    #[test]
    fn test_subset_is_not_transitive() {
        let a = fusion_with(&["X"], &["A", "B"], (Strand::Forward, Strand::Forward));
        let b = fusion_with(&["X"], &["A", "B", "C"], (Strand::Forward, Strand::Forward));
        let c = fusion_with(&["X"], &["B", "C"], (Strand::Forward, Strand::Forward));
        let cfg = config(MatchMode::Subset, false);
        assert!(fusions_match(&a, &b, &cfg));
        assert!(fusions_match(&b, &c, &cfg));
        assert!(!fusions_match(&a, &c, &cfg));
    }

    #[test]
    fn test_strand_specific_rejects_opposite_strands() {
        let a = fusion_with(&["X"], &["A"], (Strand::Forward, Strand::Forward));
        let b = fusion_with(&["X"], &["A"], (Strand::Reverse, Strand::Reverse));
        assert!(fusions_match(&a, &b, &config(MatchMode::Subset, false)));
        assert!(!fusions_match(&a, &b, &config(MatchMode::Subset, true)));
    }

    #[test]
    fn test_intergenic_fusions_match_each_other() {
        let a = fusion_with(&[], &[], (Strand::Forward, Strand::Forward));
        let b = fusion_with(&[], &[], (Strand::Forward, Strand::Forward));
        assert!(fusions_match(&a, &b, &config(MatchMode::Subset, false)));
    }

    #[test]
    fn test_intersect_preserves_first_order() {
        let merged = intersect_genes(&genes(&["C", "A", "B"]), &genes(&["A", "C"]));
        let names: Vec<&str> = merged.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A"]);
    }
}
