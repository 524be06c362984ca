//! Gene identity values and the per-chromosome gene annotation index.
//!
//! The index answers one question: which genes cover a genomic position,
//! allowing a symmetric flank on every stored interval. Intervals are kept
//! sorted by start per chromosome with a running maximum of interval ends,
//! so a query scans only the candidate prefix instead of the whole list.

use std::collections::HashSet;

/// A named gene. Two genes with the same name are the same gene.
#[derive(Debug, Clone)]
pub struct Gene {
    pub name: String,
    /// Informational only; never consulted by matching.
    pub is_protein_coding: bool,
}

impl Gene {
    pub fn new(name: &str, is_protein_coding: bool) -> Self {
        Self {
            name: name.to_string(),
            is_protein_coding,
        }
    }
}

impl PartialEq for Gene {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Gene {}

impl std::hash::Hash for Gene {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Gene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One stored annotation record.
#[derive(Debug, Clone)]
struct Interval {
    start: u64,
    end: u64,
    gene: Gene,
}

/// Intervals of one chromosome, sorted by start.
///
/// `max_end[i]` is the largest end among `intervals[..=i]`, which lets a
/// query walk backwards from the last candidate start and stop as soon as
/// no earlier interval can still reach the position.
#[derive(Debug, Clone, Default)]
struct ChromIntervals {
    intervals: Vec<Interval>,
    max_end: Vec<u64>,
}

impl ChromIntervals {
    fn insert(&mut self, start: u64, end: u64, gene: Gene) {
        let at = self.intervals.partition_point(|iv| iv.start <= start);
        self.intervals.insert(at, Interval { start, end, gene });
        self.max_end.insert(at, 0);
        let prev = if at == 0 { 0 } else { self.max_end[at - 1] };
        let mut running = prev;
        for i in at..self.intervals.len() {
            running = running.max(self.intervals[i].end);
            self.max_end[i] = running;
        }
    }

    fn query(&self, position: u64, flank: u64, hits: &mut Vec<Gene>, seen: &mut HashSet<String>) {
        // Candidates start at or before position + flank.
        let hi = self
            .intervals
            .partition_point(|iv| iv.start <= position.saturating_add(flank));
        for i in (0..hi).rev() {
            if self.max_end[i].saturating_add(flank) < position {
                break;
            }
            let iv = &self.intervals[i];
            if position >= iv.start.saturating_sub(flank) && position <= iv.end.saturating_add(flank)
                && !seen.contains(&iv.gene.name)
            {
                seen.insert(iv.gene.name.clone());
                hits.push(iv.gene.clone());
            }
        }
    }
}

/// Gene annotation intervals for one genome build.
///
/// The same gene may be stored multiple times (alternative annotations);
/// a query still reports each gene at most once. Querying a chromosome
/// the index has never seen returns an empty result.
#[derive(Debug, Clone)]
pub struct GeneAnnotationIndex {
    build: String,
    flank: u64,
    chromosomes: indexmap::IndexMap<String, ChromIntervals>,
    n_records: usize,
}

impl GeneAnnotationIndex {
    pub fn new(build: &str, flank: u64) -> Self {
        Self {
            build: build.to_string(),
            flank,
            chromosomes: indexmap::IndexMap::new(),
            n_records: 0,
        }
    }

    pub fn build(&self) -> &str {
        &self.build
    }

    /// Default flank applied by [`query`](Self::query).
    pub fn flank(&self) -> u64 {
        self.flank
    }

    /// Number of annotation records loaded, duplicates included.
    pub fn len(&self) -> usize {
        self.n_records
    }

    pub fn is_empty(&self) -> bool {
        self.n_records == 0
    }

    pub fn add_annotation(&mut self, gene: Gene, chromosome: &str, start: u64, end: u64) {
        self.chromosomes
            .entry(chromosome.to_string())
            .or_default()
            .insert(start, end, gene);
        self.n_records += 1;
    }

    /// All genes whose interval, widened by the index flank, contains
    /// `position` on `chromosome`. Each gene appears at most once, in
    /// index traversal order.
    pub fn query(&self, chromosome: &str, position: u64) -> Vec<Gene> {
        self.query_with_flank(chromosome, position, self.flank)
    }

    /// Same as [`query`](Self::query) with an explicit flank.
    pub fn query_with_flank(&self, chromosome: &str, position: u64, flank: u64) -> Vec<Gene> {
        let mut hits = Vec::new();
        if let Some(chrom) = self.chromosomes.get(chromosome) {
            let mut seen = HashSet::new();
            chrom.query(position, flank, &mut hits, &mut seen);
        }
        hits
    }
}
