//! Text reports for an overlay result.
//!
//! Two formats, both tab-separated with a header line. The list format has
//! one line per maximal matched group followed by one line per unmatched
//! fusion; the summary format has one line per experiment combination with
//! its match count, zeros included. Everything goes through a single
//! writer so the output can be a file, stdout or a test buffer.

use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::config::{MatchingConfig, OutputFormat};
use crate::fusion::Fusion;
use crate::overlay::{MatchedGroup, OverlayReport};

/// Write the report in the configured format.
pub fn write_report<W: Write>(
    w: &mut W,
    report: &OverlayReport,
    config: &MatchingConfig,
) -> std::io::Result<()> {
    match config.format {
        OutputFormat::List => write_list(w, report),
        OutputFormat::Summary => write_summary(w, report),
    }
}

/// Write the report to `{out_prefix}.report.txt` and print a short
/// summary to stdout.
pub fn generate_report(
    out_prefix: &str,
    report: &OverlayReport,
    config: &MatchingConfig,
) -> std::io::Result<()> {
    let path = format!("{}.report.txt", out_prefix);
    let mut writer = BufWriter::new(File::create(&path)?);
    write_report(&mut writer, report, config)?;
    writer.flush()?;
    info!("report written to: {}", path);

    println!("Experiments compared: {}", report.experiment_names.len());
    for (name, size) in report.experiment_names.iter().zip(&report.experiment_sizes) {
        println!("  {}: {} fusions after deduplication", name, size);
    }
    println!("Matched groups: {}", report.groups.len());
    println!("Unmatched fusions: {}", report.unmatched.len());
    Ok(())
}

fn write_list<W: Write>(w: &mut W, report: &OverlayReport) -> std::io::Result<()> {
    writeln!(
        w,
        "left_genes\tright_genes\tleft_breakpoint\tright_breakpoint\tstrands\tn_experiments\texperiments"
    )?;
    for group in &report.groups {
        write_group_line(w, group)?;
    }
    for fusion in &report.unmatched {
        write_fusion_line(w, fusion)?;
    }
    Ok(())
}

fn write_summary<W: Write>(w: &mut W, report: &OverlayReport) -> std::io::Result<()> {
    writeln!(w, "combination\tn_matches")?;
    for (combination, count) in &report.counts {
        writeln!(w, "{}\t{}", combination, count)?;
    }
    Ok(())
}

fn write_group_line<W: Write>(w: &mut W, group: &MatchedGroup) -> std::io::Result<()> {
    let representative = group.representative();
    writeln!(
        w,
        "{}\t{}\t{}\t{}\t{}/{}\t{}\t{}",
        join_gene_names(group.genes_left.iter().map(|g| g.name.as_str())),
        join_gene_names(group.genes_right.iter().map(|g| g.name.as_str())),
        representative.left,
        representative.right,
        representative.left.strand,
        representative.right.strand,
        group.experiments.len(),
        group.experiments.join(";"),
    )
}

fn write_fusion_line<W: Write>(w: &mut W, fusion: &Fusion) -> std::io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t{}\t{}/{}\t1\t{}",
        join_gene_names(fusion.annotated_genes_left().iter().map(|g| g.name.as_str())),
        join_gene_names(fusion.annotated_genes_right().iter().map(|g| g.name.as_str())),
        fusion.left,
        fusion.right,
        fusion.left.strand,
        fusion.right.strand,
        fusion.experiment,
    )
}

/// Gene names sorted and colon-joined; `-` for an intergenic side.
fn join_gene_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let mut names: Vec<&str> = names.collect();
    if names.is_empty() {
        return "-".to_string();
    }
    names.sort_unstable();
    names.join(":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Gene;
    use crate::config::{MatchMode, OutputFormat};
    use crate::experiment::FusionDetectionExperiment;
    use crate::fusion::Strand;
    use crate::overlay::{OverlayEngine, OverlayStrategy};

    fn annotated(experiment: &str, id: &str, left: &[&str], right: &[&str]) -> Fusion {
        let mut f = Fusion::new(
            "chr1", "chr2", 1000, 2000,
            Strand::Forward, Strand::Reverse,
            experiment, id, true,
        );
        f.annotate_genes_left(left.iter().map(|n| Gene::new(n, false)).collect());
        f.annotate_genes_right(right.iter().map(|n| Gene::new(n, false)).collect());
        f
    }

    fn two_experiment_report() -> OverlayReport {
        let config = MatchingConfig::new(MatchMode::Subset, false, OutputFormat::List);
        let mut engine = OverlayEngine::new(config, OverlayStrategy::Exhaustive);
        let mut e1 = FusionDetectionExperiment::new("alpha");
        e1.add_fusion(annotated("alpha", "f1", &["TP53"], &["BRCA1", "ALK"]));
        e1.add_fusion(annotated("alpha", "f2", &["KRAS"], &["EGFR"]));
        let mut e2 = FusionDetectionExperiment::new("beta");
        e2.add_fusion(annotated("beta", "f1", &["TP53"], &["ALK"]));
        engine.add_experiment(e1);
        engine.add_experiment(e2);
        engine.overlay()
    }

    #[test]
    fn test_list_format() {
        let report = two_experiment_report();
        let config = MatchingConfig::new(MatchMode::Subset, false, OutputFormat::List);
        let mut buf = Vec::new();
        write_report(&mut buf, &report, &config).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "left_genes\tright_genes\tleft_breakpoint\tright_breakpoint\tstrands\tn_experiments\texperiments"
        );
        // One matched group (TP53 / ALK across alpha,beta), one unmatched.
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "TP53\tALK\tchr1:1000\tchr2:2000\t+/-\t2\talpha;beta"
        );
        assert_eq!(lines[2], "KRAS\tEGFR\tchr1:1000\tchr2:2000\t+/-\t1\talpha");
    }

    #[test]
    fn test_summary_format() {
        let report = two_experiment_report();
        let config = MatchingConfig::new(MatchMode::Subset, false, OutputFormat::Summary);
        let mut buf = Vec::new();
        write_report(&mut buf, &report, &config).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "combination\tn_matches\nalpha&beta\t1\n");
    }

    #[test]
    fn test_gene_names_sorted_and_joined() {
        assert_eq!(join_gene_names(["B", "A", "C"].into_iter()), "A:B:C");
        assert_eq!(join_gene_names(std::iter::empty()), "-");
    }
}
