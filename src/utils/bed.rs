//! BED gene-model loader.
//!
//! Builds a [`GeneAnnotationIndex`] from a BED file: chrom, start, end,
//! gene name, with optional score and strand columns that are accepted and
//! ignored. Comment (`#`) and blank lines are skipped. By default any
//! malformed line aborts the load with file and line context; lenient mode
//! logs the line and moves on.

use std::fs::File;
use std::io::{BufRead, BufReader};

use log::{info, warn};

use crate::annotation::{Gene, GeneAnnotationIndex};

pub fn read_gene_model(
    bed_path: &str,
    build: &str,
    flank: u64,
    lenient: bool,
) -> Result<GeneAnnotationIndex, Box<dyn std::error::Error>> {
    let file = File::open(bed_path).map_err(|e| {
        std::io::Error::other(format!("Error opening gene model {}: {}", bed_path, e))
    })?;
    let index = read_gene_model_from_reader(BufReader::new(file), build, flank, lenient)?;
    info!(
        "loaded gene model {} ({}): {} annotation records",
        bed_path,
        build,
        index.len()
    );
    Ok(index)
}

pub fn read_gene_model_from_reader<R: BufRead>(
    reader: R,
    build: &str,
    flank: u64,
    lenient: bool,
) -> Result<GeneAnnotationIndex, Box<dyn std::error::Error>> {
    let mut index = GeneAnnotationIndex::new(build, flank);

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') { continue; }

        match parse_line(&line) {
            Ok((chrom, start, end, name)) => {
                index.add_annotation(Gene::new(name, true), chrom, start, end);
            }
            Err(e) => {
                if lenient {
                    warn!("skipping BED line {}: {}", i + 1, e);
                } else {
                    return Err(format!("Malformed BED line {}: {}: {}", i + 1, e, line).into());
                }
            }
        }
    }
    Ok(index)
}

fn parse_line(line: &str) -> Result<(&str, u64, u64, &str), String> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 4 {
        return Err(format!("expected at least 4 columns, got {}", parts.len()));
    }
    let start: u64 = parts[1].parse().map_err(|e| format!("invalid start: {}", e))?;
    let end: u64 = parts[2].parse().map_err(|e| format!("invalid end: {}", e))?;
    if end < start {
        return Err(format!("end {} before start {}", end, start));
    }
    Ok((parts[0], start, end, parts[3]))
}
