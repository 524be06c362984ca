//! The fusion record: two breakpoints plus per-side gene annotations.

use crate::annotation::{Gene, GeneAnnotationIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Strand::Forward),
            '-' => Some(Strand::Reverse),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One side of a fusion: chromosome, 1-based position, strand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub chromosome: String,
    pub position: u64,
    pub strand: Strand,
}

impl Breakpoint {
    pub fn new(chromosome: &str, position: u64, strand: Strand) -> Self {
        Self {
            chromosome: chromosome.to_string(),
            position,
            strand,
        }
    }
}

impl std::fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.chromosome, self.position)
    }
}

/// A detected fusion event.
///
/// Gene lists are `None` until annotation has run; any attempt to read
/// them before that is a caller bug and panics. Annotation happens exactly
/// once, either through
/// [`FusionDetectionExperiment::annotate_genes`](crate::experiment::FusionDetectionExperiment::annotate_genes)
/// or through the direct `annotate_genes_left`/`annotate_genes_right`
/// setters.
#[derive(Debug, Clone)]
pub struct Fusion {
    pub left: Breakpoint,
    pub right: Breakpoint,
    /// Name of the experiment that called this fusion.
    pub experiment: String,
    /// Identifier within that experiment; not globally unique.
    pub id: String,
    /// Provenance flag carried through to output, never interpreted.
    pub from_dataset: bool,
    genes_left: Option<Vec<Gene>>,
    genes_right: Option<Vec<Gene>>,
}

impl Fusion {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        left_chromosome: &str,
        right_chromosome: &str,
        left_position: u64,
        right_position: u64,
        left_strand: Strand,
        right_strand: Strand,
        experiment: &str,
        id: &str,
        from_dataset: bool,
    ) -> Self {
        Self {
            left: Breakpoint::new(left_chromosome, left_position, left_strand),
            right: Breakpoint::new(right_chromosome, right_position, right_strand),
            experiment: experiment.to_string(),
            id: id.to_string(),
            from_dataset,
            genes_left: None,
            genes_right: None,
        }
    }

    pub fn is_annotated(&self) -> bool {
        self.genes_left.is_some() && self.genes_right.is_some()
    }

    /// Genes annotated on the left breakpoint.
    ///
    /// # Panics
    /// If the fusion has not been annotated. Matching before annotation is
    /// a programming error.
    pub fn annotated_genes_left(&self) -> &[Gene] {
        match &self.genes_left {
            Some(genes) => genes,
            None => panic!(
                "fusion {} ({}) used before gene annotation",
                self.id, self.experiment
            ),
        }
    }

    /// Genes annotated on the right breakpoint. Panics like
    /// [`annotated_genes_left`](Self::annotated_genes_left).
    pub fn annotated_genes_right(&self) -> &[Gene] {
        match &self.genes_right {
            Some(genes) => genes,
            None => panic!(
                "fusion {} ({}) used before gene annotation",
                self.id, self.experiment
            ),
        }
    }

    pub fn annotate_genes_left(&mut self, genes: Vec<Gene>) {
        self.genes_left = Some(genes);
    }

    pub fn annotate_genes_right(&mut self, genes: Vec<Gene>) {
        self.genes_right = Some(genes);
    }

    /// Query the index at both breakpoints and attach the results.
    /// Positions no gene covers yield empty lists (intergenic).
    pub fn annotate(&mut self, index: &GeneAnnotationIndex) {
        self.genes_left = Some(index.query(&self.left.chromosome, self.left.position));
        self.genes_right = Some(index.query(&self.right.chromosome, self.right.position));
    }
}

impl std::fmt::Display for Fusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({})-{}({})",
            self.left, self.left.strand, self.right, self.right.strand
        )
    }
}
