//! Fusion-call file adapters.
//!
//! Each adapter reads one upstream caller's output format into a
//! [`FusionDetectionExperiment`] tagged with a caller-supplied experiment
//! name. Strict mode (the default) aborts on the first malformed record
//! with line context; lenient mode logs and skips it.

use std::fs::File;
use std::io::{BufRead, BufReader};

use log::{info, warn};

use crate::experiment::FusionDetectionExperiment;
use crate::fusion::{Fusion, Strand};

/// Supported upstream formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    /// Absolute-coordinate BEDPE, ChimeraScan style.
    Bedpe,
    /// Header-indexed fusion table, FusionMap style.
    FusionTable,
}

/// Read a fusion-call file in the given format.
pub fn read_experiment(
    path: &str,
    format: InputFormat,
    experiment_name: &str,
    lenient: bool,
) -> Result<FusionDetectionExperiment, Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|e| {
        std::io::Error::other(format!("Error opening fusion file {}: {}", path, e))
    })?;
    let reader = BufReader::new(file);
    let experiment = match format {
        InputFormat::Bedpe => read_bedpe_from_reader(reader, experiment_name, lenient),
        InputFormat::FusionTable => read_fusion_table_from_reader(reader, experiment_name, lenient),
    }?;
    info!(
        "read {} fusions from {} (experiment {})",
        experiment.len(),
        path,
        experiment_name
    );
    Ok(experiment)
}

/// Absolute-coordinate BEDPE: ten or more tab columns. The left breakpoint
/// is (chrom1, end1, strand1) and the right is (chrom2, start2, strand2);
/// column 7 is the record name.
pub fn read_bedpe_from_reader<R: BufRead>(
    reader: R,
    experiment_name: &str,
    lenient: bool,
) -> Result<FusionDetectionExperiment, Box<dyn std::error::Error>> {
    let mut experiment = FusionDetectionExperiment::new(experiment_name);

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') { continue; }

        match parse_bedpe_line(&line, experiment_name) {
            Ok(fusion) => experiment.add_fusion(fusion),
            Err(e) => {
                if lenient {
                    warn!("skipping BEDPE line {}: {}", i + 1, e);
                } else {
                    return Err(format!("Malformed BEDPE line {}: {}: {}", i + 1, e, line).into());
                }
            }
        }
    }
    Ok(experiment)
}

fn parse_bedpe_line(line: &str, experiment_name: &str) -> Result<Fusion, String> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 10 {
        return Err(format!("expected at least 10 columns, got {}", parts.len()));
    }
    let left_pos: u64 = parts[2].parse().map_err(|e| format!("invalid end1: {}", e))?;
    let right_pos: u64 = parts[4].parse().map_err(|e| format!("invalid start2: {}", e))?;
    let left_strand = parse_strand_column(parts[8], "strand1")?;
    let right_strand = parse_strand_column(parts[9], "strand2")?;
    Ok(Fusion::new(
        parts[0],
        parts[3],
        left_pos,
        right_pos,
        left_strand,
        right_strand,
        experiment_name,
        parts[6],
        true,
    ))
}

/// Header-indexed fusion table: the first line names the columns, and
/// `FusionID`, `Chromosome1`, `Position1`, `Chromosome2`, `Position2` and
/// `Strand` (two characters, e.g. `++`) must all be present.
pub fn read_fusion_table_from_reader<R: BufRead>(
    reader: R,
    experiment_name: &str,
    lenient: bool,
) -> Result<FusionDetectionExperiment, Box<dyn std::error::Error>> {
    let mut experiment = FusionDetectionExperiment::new(experiment_name);
    let mut lines = reader.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if line.trim().is_empty() { continue; }
                break line;
            }
            None => return Ok(experiment), // empty file, empty experiment
        }
    };
    let columns: Vec<&str> = header.split('\t').collect();
    let col = |name: &str| -> Result<usize, Box<dyn std::error::Error>> {
        columns
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| format!("missing required column {} in header: {}", name, header).into())
    };
    let id_col = col("FusionID")?;
    let chrom1_col = col("Chromosome1")?;
    let pos1_col = col("Position1")?;
    let chrom2_col = col("Chromosome2")?;
    let pos2_col = col("Position2")?;
    let strand_col = col("Strand")?;
    let n_required = [id_col, chrom1_col, pos1_col, chrom2_col, pos2_col, strand_col]
        .into_iter()
        .max()
        .unwrap_or(0)
        + 1;

    for (i, line) in lines {
        let line = line?;
        if line.trim().is_empty() { continue; }

        let parse = || -> Result<Fusion, String> {
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < n_required {
                return Err(format!(
                    "expected at least {} columns, got {}",
                    n_required,
                    parts.len()
                ));
            }
            let pos1: u64 = parts[pos1_col]
                .parse()
                .map_err(|e| format!("invalid Position1: {}", e))?;
            let pos2: u64 = parts[pos2_col]
                .parse()
                .map_err(|e| format!("invalid Position2: {}", e))?;
            let strands = parts[strand_col];
            let mut chars = strands.chars();
            let (left_strand, right_strand) = match (chars.next(), chars.next(), chars.next()) {
                (Some(l), Some(r), None) => (
                    Strand::from_char(l).ok_or_else(|| format!("invalid strand {:?}", l))?,
                    Strand::from_char(r).ok_or_else(|| format!("invalid strand {:?}", r))?,
                ),
                _ => return Err(format!("invalid Strand column {:?}", strands)),
            };
            Ok(Fusion::new(
                parts[chrom1_col],
                parts[chrom2_col],
                pos1,
                pos2,
                left_strand,
                right_strand,
                experiment_name,
                parts[id_col],
                true,
            ))
        };
        match parse() {
            Ok(fusion) => experiment.add_fusion(fusion),
            Err(e) => {
                if lenient {
                    warn!("skipping fusion table line {}: {}", i + 1, e);
                } else {
                    return Err(
                        format!("Malformed fusion table line {}: {}: {}", i + 1, e, line).into()
                    );
                }
            }
        }
    }
    Ok(experiment)
}

fn parse_strand_column(field: &str, what: &str) -> Result<Strand, String> {
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            Strand::from_char(c).ok_or_else(|| format!("invalid {} {:?}", what, field))
        }
        _ => Err(format!("invalid {} {:?}", what, field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const BEDPE: &str = "chr1\t900\t1000\tchr2\t5000\t5100\tFUS_1\t37\t+\t-\n\
                         chrX\t10\t20\tchrY\t30\t40\tFUS_2\t1\t-\t-\n";

    #[test]
    fn test_bedpe_breakpoint_selection() {
        let exp = read_bedpe_from_reader(Cursor::new(BEDPE), "cs", false).unwrap();
        assert_eq!(exp.len(), 2);

        let f = &exp.fusions()[0];
        assert_eq!(f.id, "FUS_1");
        assert_eq!(f.experiment, "cs");
        // left = (chrom1, end1), right = (chrom2, start2)
        assert_eq!(f.left.chromosome, "chr1");
        assert_eq!(f.left.position, 1000);
        assert_eq!(f.left.strand, Strand::Forward);
        assert_eq!(f.right.chromosome, "chr2");
        assert_eq!(f.right.position, 5000);
        assert_eq!(f.right.strand, Strand::Reverse);
    }

    #[test]
    fn test_bedpe_short_line_is_fatal() {
        let data = "chr1\t900\t1000\tchr2\t5000\t5100\tFUS_1\n";
        let result = read_bedpe_from_reader(Cursor::new(data), "cs", false);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Malformed BEDPE line 1"));
    }

    #[test]
    fn test_bedpe_lenient_skips() {
        let data = "bad line\nchr1\t900\t1000\tchr2\t5000\t5100\tFUS_1\t37\t+\t-\n";
        let exp = read_bedpe_from_reader(Cursor::new(data), "cs", true).unwrap();
        assert_eq!(exp.len(), 1);
    }

    const TABLE: &str = "FusionID\tDatasetP\tChromosome1\tPosition1\tChromosome2\tPosition2\tStrand\n\
                         FUS_01\t3\t1\t12345\t7\t67890\t++\n\
                         FUS_02\t1\t2\t111\tX\t222\t+-\n";

    #[test]
    fn test_fusion_table_header_indexing() {
        let exp = read_fusion_table_from_reader(Cursor::new(TABLE), "fm", false).unwrap();
        assert_eq!(exp.len(), 2);

        let f = &exp.fusions()[0];
        assert_eq!(f.id, "FUS_01");
        assert_eq!(f.left.chromosome, "1");
        assert_eq!(f.left.position, 12345);
        assert_eq!(f.right.chromosome, "7");
        assert_eq!(f.right.position, 67890);
        assert_eq!(f.left.strand, Strand::Forward);
        assert_eq!(exp.fusions()[1].right.strand, Strand::Reverse);
    }

    #[test]
    fn test_fusion_table_missing_column() {
        let data = "FusionID\tChromosome1\tPosition1\n";
        let result = read_fusion_table_from_reader(Cursor::new(data), "fm", false);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("missing required column Chromosome2"));
    }

    #[test]
    fn test_fusion_table_bad_strand() {
        let data = "FusionID\tChromosome1\tPosition1\tChromosome2\tPosition2\tStrand\n\
                    F1\t1\t10\t2\t20\t+*\n";
        let result = read_fusion_table_from_reader(Cursor::new(data), "fm", false);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("line 2"));
    }

    #[test]
    fn test_fusion_table_empty_file() {
        let exp = read_fusion_table_from_reader(Cursor::new(""), "fm", false).unwrap();
        assert!(exp.is_empty());
    }
}
