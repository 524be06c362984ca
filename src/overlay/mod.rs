//! Multi-experiment overlay.
//!
//! After each experiment has been annotated and deduplicated, the engine
//! enumerates every combination of two or more experiments and finds the
//! groups of fusions (one per experiment in the combination) that all
//! pairwise match under the configured policy. The pairwise relations are
//! not transitive, so a group is required to be a clique in the match
//! graph; that makes the result a property of the fusion sets alone and
//! independent of the order experiments were added.
//!
//! Two strategies produce identical reports. The exhaustive one evaluates
//! the match predicate on demand while extending a group. The triangular
//! one precomputes the upper triangle of the pairwise match matrix once,
//! answers every later comparison from it, and skips extending
//! combinations in which some experiment pair has no matching fusions at
//! all (a clique would need one).

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, info};

use crate::annotation::Gene;
use crate::config::MatchingConfig;
use crate::experiment::FusionDetectionExperiment;
use crate::fusion::Fusion;
use crate::matching::{fusions_match, intersect_genes};

/// How the engine evaluates pairwise matches. Both strategies yield the
/// same report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OverlayStrategy {
    /// Evaluate the match predicate wherever it is needed.
    Exhaustive,
    /// Precompute all pairwise matches once, then reuse them.
    Triangular,
}

/// A set of fusions, one from each experiment of a combination, in which
/// every pair matches. Gene sets are the per-side intersections over the
/// members, in the first member's gene order.
#[derive(Debug, Clone)]
pub struct MatchedGroup {
    /// Names of the contributing experiments, in engine order.
    pub experiments: Vec<String>,
    /// One fusion per experiment, aligned with `experiments`.
    pub members: Vec<Fusion>,
    pub genes_left: Vec<Gene>,
    pub genes_right: Vec<Gene>,
}

impl MatchedGroup {
    /// The member used for the group's reported breakpoints: the first one,
    /// i.e. the fusion from the earliest experiment.
    pub fn representative(&self) -> &Fusion {
        &self.members[0]
    }
}

/// Everything the overlay produced, ready for reporting.
#[derive(Debug, Clone)]
pub struct OverlayReport {
    /// Experiment names in engine order.
    pub experiment_names: Vec<String>,
    /// Deduplicated size of each experiment, aligned with `experiment_names`.
    pub experiment_sizes: Vec<usize>,
    /// Maximal matched groups: no reported group's member set is strictly
    /// contained in another reported group's.
    pub groups: Vec<MatchedGroup>,
    /// Fusions that matched nothing in any other experiment.
    pub unmatched: Vec<Fusion>,
    /// Group count per experiment combination (groups of every size, not
    /// only maximal ones), keyed by the `&`-joined experiment names, in
    /// canonical order: combination size ascending, then engine order.
    /// Combinations with no matches are present with a zero count.
    pub counts: IndexMap<String, usize>,
}

/// Accumulates experiments, then overlays them all at once.
///
/// [`overlay`](Self::overlay) consumes the engine, so a result can only be
/// produced once per set of inputs.
pub struct OverlayEngine {
    config: MatchingConfig,
    strategy: OverlayStrategy,
    experiments: Vec<FusionDetectionExperiment>,
}

impl OverlayEngine {
    pub fn new(config: MatchingConfig, strategy: OverlayStrategy) -> Self {
        Self {
            config,
            strategy,
            experiments: Vec::new(),
        }
    }

    /// Add an annotated experiment. Order of addition fixes reporting
    /// order but has no effect on which groups are found.
    pub fn add_experiment(&mut self, experiment: FusionDetectionExperiment) {
        self.experiments.push(experiment);
    }

    /// Number of experiments added so far.
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    /// Deduplicate every experiment in place. [`overlay`](Self::overlay)
    /// does this first; calling it twice removes nothing new.
    pub fn deduplicate(&mut self) {
        for experiment in &mut self.experiments {
            experiment.remove_duplicates(&self.config);
        }
    }

    /// Map a global fusion index to its experiment's index. Global indices
    /// run over the deduplicated experiments concatenated in engine order.
    pub fn map_i_to_exp_id(&self, i: usize) -> Option<usize> {
        let mut end = 0;
        for (exp_id, experiment) in self.experiments.iter().enumerate() {
            end += experiment.len();
            if i < end {
                return Some(exp_id);
            }
        }
        None
    }

    /// Run the overlay over all added experiments.
    pub fn overlay(mut self) -> OverlayReport {
        self.deduplicate();

        let experiment_names: Vec<String> =
            self.experiments.iter().map(|e| e.name().to_string()).collect();
        let experiment_sizes: Vec<usize> = self.experiments.iter().map(|e| e.len()).collect();
        let n_experiments = self.experiments.len();

        // Flatten into one global fusion list; ranges[e] is experiment e's
        // slice of global indices, exp_of[i] the owning experiment.
        let mut fusions: Vec<Fusion> = Vec::new();
        let mut ranges: Vec<std::ops::Range<usize>> = Vec::with_capacity(n_experiments);
        let mut exp_of: Vec<usize> = Vec::new();
        for (exp_id, experiment) in self.experiments.into_iter().enumerate() {
            let start = fusions.len();
            fusions.extend(experiment.fusions().iter().cloned());
            exp_of.resize(fusions.len(), exp_id);
            ranges.push(start..fusions.len());
        }
        info!(
            "overlaying {} experiments, {} fusions after deduplication",
            n_experiments,
            fusions.len()
        );

        let matrix = match self.strategy {
            OverlayStrategy::Exhaustive => None,
            OverlayStrategy::Triangular => {
                Some(PairMatrix::build(&fusions, &ranges, &self.config))
            }
        };
        let matches = |a: usize, b: usize| match &matrix {
            Some(m) => m.get(a, b),
            None => fusions_match(&fusions[a], &fusions[b], &self.config),
        };

        let mut counts: IndexMap<String, usize> = IndexMap::new();
        let mut all_groups: Vec<Vec<usize>> = Vec::new();
        for size in 2..=n_experiments {
            for combination in combinations(n_experiments, size) {
                let label = combination
                    .iter()
                    .map(|&e| experiment_names[e].as_str())
                    .collect::<Vec<_>>()
                    .join("&");
                let prunable = matrix.as_ref().is_some_and(|m| {
                    combination.iter().enumerate().any(|(i, &a)| {
                        combination[i + 1..].iter().any(|&b| !m.experiments_share_match(a, b))
                    })
                });
                if prunable {
                    counts.insert(label, 0);
                    continue;
                }
                let mut found: Vec<Vec<usize>> = Vec::new();
                let mut chosen: Vec<usize> = Vec::new();
                extend_group(&combination, &ranges, &matches, &mut chosen, &mut found);
                debug!("combination {}: {} groups", label, found.len());
                counts.insert(label, found.len());
                all_groups.extend(found);
            }
        }

        let matched: HashSet<usize> = all_groups.iter().flatten().copied().collect();
        let unmatched: Vec<Fusion> = fusions
            .iter()
            .enumerate()
            .filter(|(i, _)| !matched.contains(i))
            .map(|(_, f)| f.clone())
            .collect();

        let maximal = retain_maximal(all_groups);
        let groups: Vec<MatchedGroup> = maximal
            .into_iter()
            .map(|member_idx| {
                let members: Vec<Fusion> =
                    member_idx.iter().map(|&i| fusions[i].clone()).collect();
                let experiments: Vec<String> = member_idx
                    .iter()
                    .map(|&i| experiment_names[exp_of[i]].clone())
                    .collect();
                let genes_left = merged_genes(&members, Fusion::annotated_genes_left);
                let genes_right = merged_genes(&members, Fusion::annotated_genes_right);
                MatchedGroup {
                    experiments,
                    members,
                    genes_left,
                    genes_right,
                }
            })
            .collect();
        info!(
            "overlay done: {} maximal groups, {} unmatched fusions",
            groups.len(),
            unmatched.len()
        );

        OverlayReport {
            experiment_names,
            experiment_sizes,
            groups,
            unmatched,
            counts,
        }
    }
}

/// Upper triangle of the global pairwise match matrix, plus a per
/// experiment-pair flag recording whether any of their fusions match.
struct PairMatrix {
    n: usize,
    cells: Vec<bool>,
    n_experiments: usize,
    pair_has_match: Vec<bool>,
}

impl PairMatrix {
    fn build(
        fusions: &[Fusion],
        ranges: &[std::ops::Range<usize>],
        config: &MatchingConfig,
    ) -> Self {
        let n = fusions.len();
        let n_experiments = ranges.len();
        let mut matrix = Self {
            n,
            cells: vec![false; n * n],
            n_experiments,
            pair_has_match: vec![false; n_experiments * n_experiments],
        };
        for (ea, range_a) in ranges.iter().enumerate() {
            for (eb, range_b) in ranges.iter().enumerate().skip(ea + 1) {
                for a in range_a.clone() {
                    for b in range_b.clone() {
                        if fusions_match(&fusions[a], &fusions[b], config) {
                            matrix.cells[a * n + b] = true;
                            matrix.pair_has_match[ea * n_experiments + eb] = true;
                        }
                    }
                }
            }
        }
        matrix
    }

    fn get(&self, a: usize, b: usize) -> bool {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.cells[lo * self.n + hi]
    }

    fn experiments_share_match(&self, ea: usize, eb: usize) -> bool {
        let (lo, hi) = if ea < eb { (ea, eb) } else { (eb, ea) };
        self.pair_has_match[lo * self.n_experiments + hi]
    }
}

/// Depth-first group extension: pick one fusion from each experiment of the
/// combination, requiring a pairwise match against everything chosen so far.
fn extend_group(
    combination: &[usize],
    ranges: &[std::ops::Range<usize>],
    matches: &impl Fn(usize, usize) -> bool,
    chosen: &mut Vec<usize>,
    found: &mut Vec<Vec<usize>>,
) {
    if chosen.len() == combination.len() {
        found.push(chosen.clone());
        return;
    }
    let experiment = combination[chosen.len()];
    for candidate in ranges[experiment].clone() {
        if chosen.iter().all(|&c| matches(c, candidate)) {
            chosen.push(candidate);
            extend_group(combination, ranges, matches, chosen, found);
            chosen.pop();
        }
    }
}

/// All size-`k` combinations of `0..n`, lexicographic.
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(k);
    fn rec(n: usize, k: usize, start: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if current.len() == k {
            out.push(current.clone());
            return;
        }
        for i in start..n {
            current.push(i);
            rec(n, k, i + 1, current, out);
            current.pop();
        }
    }
    rec(n, k, 0, &mut current, &mut out);
    out
}

/// Drop every group whose member set is strictly contained in another
/// group's. Order of survivors follows the input.
fn retain_maximal(groups: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
    let sets: Vec<HashSet<usize>> = groups.iter().map(|g| g.iter().copied().collect()).collect();
    groups
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            !sets.iter().enumerate().any(|(j, other)| {
                j != *i && sets[*i].len() < other.len() && sets[*i].is_subset(other)
            })
        })
        .map(|(_, g)| g.clone())
        .collect()
}

fn merged_genes(members: &[Fusion], side: impl Fn(&Fusion) -> &[Gene]) -> Vec<Gene> {
    let mut merged: Vec<Gene> = side(&members[0]).to_vec();
    for member in &members[1..] {
        merged = intersect_genes(&merged, side(member));
    }
    merged
}
