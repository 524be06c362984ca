use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use std::path::Path;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use fusecomp::config::{MatchMode, MatchingConfig, OutputFormat};
use fusecomp::input::{read_experiment, InputFormat};
use fusecomp::output::{GeneModelInfo, OutputCollector, OverlayOutput};
use fusecomp::overlay::{OverlayEngine, OverlayStrategy};
use fusecomp::report::generate_report;
use fusecomp::utils::bed::read_gene_model;

#[derive(Parser)]
#[command(name = "fusecomp")]
#[command(
    about = "Gene fusion comparison across detection experiments",
    long_about = "Compares gene fusion calls from multiple experiments by the genes spanning each breakpoint, reporting matched fusion groups for every combination of experiments."
)]
struct Cli {
    /// Log verbosity level
    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,
    /// Write log output to a file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<String>,
    /// Append to log file instead of truncating
    #[arg(long, global = true)]
    append_log: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compare fusion calls from two or more experiments
    Compare {
        /// Fusion call file as NAME=PATH (repeatable; order fixes report order).
        /// An input may override the global format with NAME:FORMAT=PATH.
        #[arg(long = "input", required = true)]
        inputs: Vec<String>,
        /// Input format applied to every input without an explicit override.
        #[arg(long, value_enum, default_value_t = InputFormat::Bedpe)]
        format: InputFormat,
        /// BED gene model used to annotate breakpoints (chrom, start, end, gene name).
        #[arg(long, required = true)]
        gene_model: String,
        /// Genome build label recorded in the output (e.g. "hg19").
        #[arg(long, default_value = "hg19")]
        build: String,
        /// Symmetric flank in bases applied around every gene interval.
        #[arg(long, default_value = "0")]
        flank: u64,
        /// How per-side gene sets are compared.
        #[arg(long, value_enum, default_value_t = MatchMode::Subset)]
        mode: MatchMode,
        /// Require breakpoint strands to agree.
        #[arg(long)]
        strand_specific: bool,
        /// Shape of the text report.
        #[arg(long, value_enum, default_value_t = OutputFormat::List)]
        output_format: OutputFormat,
        /// Pairwise match evaluation strategy (both produce identical results).
        #[arg(long, value_enum, default_value_t = OverlayStrategy::Triangular)]
        strategy: OverlayStrategy,
        /// Matching configuration JSON file; explicit flags above are ignored when given.
        #[arg(long)]
        config: Option<String>,
        /// Skip malformed input lines instead of aborting.
        #[arg(long)]
        lenient: bool,
        /// Prefix for output files. Output files will be named <prefix>.result.json and <prefix>.report.txt.
        #[arg(long, required = true)]
        out_prefix: String,
        /// Force overwrite of existing output files.
        #[arg(short, long)]
        force: bool,
    },
    /// Print JSON Schema for unified output format
    Schema {
        /// Write schema to file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },
}

// Helper to check output paths and create directories
fn check_output_paths(
    prefix: &str,
    suffixes: &[&str],
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(prefix);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating output directory: {:?}", parent);
            std::fs::create_dir_all(parent)?;
        }

    if !force {
        for suffix in suffixes {
            let p = format!("{}{}", prefix, suffix);
            if Path::new(&p).exists() {
                return Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("Output file {} already exists. Use --force to overwrite.", p),
                )));
            }
        }
    }

    Ok(())
}

/// Parse an input spec: `NAME=PATH` or `NAME:FORMAT=PATH`.
fn parse_input_spec(
    spec: &str,
    default_format: InputFormat,
) -> Result<(String, InputFormat, String), String> {
    let (name_part, path) = spec
        .split_once('=')
        .ok_or_else(|| format!("invalid input spec {:?}: expected NAME=PATH", spec))?;
    if name_part.is_empty() || path.is_empty() {
        return Err(format!("invalid input spec {:?}: expected NAME=PATH", spec));
    }
    match name_part.split_once(':') {
        Some((name, format)) => {
            let format = InputFormat::from_str(format, true)
                .map_err(|_| format!("unknown input format {:?} in spec {:?}", format, spec))?;
            Ok((name.to_string(), format, path.to_string()))
        }
        None => Ok((name_part.to_string(), default_format, path.to_string())),
    }
}

fn main() {
    let cli = Cli::parse();

    let mut log_builder = env_logger::Builder::from_default_env();
    log_builder
        .filter_level(cli.log_level.to_level_filter())
        .format_module_path(false);
    if let Some(ref path) = cli.log_file {
        let file = if cli.append_log {
            std::fs::File::options().create(true).append(true).open(path)
        } else {
            std::fs::File::create(path)
        }
        .unwrap_or_else(|e| panic!("Could not open log file '{}': {}", path, e));
        log_builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    log_builder.init();

    match &cli.command {
        Commands::Compare {
            inputs,
            format,
            gene_model,
            build,
            flank,
            mode,
            strand_specific,
            output_format,
            strategy,
            config,
            lenient,
            out_prefix,
            force,
        } => {
            if let Err(e) = check_output_paths(out_prefix, &[".result.json", ".report.txt"], *force)
            {
                error!("{}", e);
                std::process::exit(1);
            }

            let matching_config = match config {
                Some(path) => match MatchingConfig::load(path) {
                    Ok(c) => c,
                    Err(e) => {
                        error!("Error loading matching config {}: {}", path, e);
                        std::process::exit(1);
                    }
                },
                None => MatchingConfig::new(*mode, *strand_specific, *output_format),
            };

            let index = match read_gene_model(gene_model, build, *flank, *lenient) {
                Ok(idx) => idx,
                Err(e) => {
                    error!("Error loading gene model: {}", e);
                    std::process::exit(1);
                }
            };

            let mut engine = OverlayEngine::new(matching_config.clone(), *strategy);
            for spec in inputs {
                let (name, input_format, path) = match parse_input_spec(spec, *format) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        error!("{}", e);
                        std::process::exit(1);
                    }
                };
                let mut experiment = match read_experiment(&path, input_format, &name, *lenient) {
                    Ok(exp) => exp,
                    Err(e) => {
                        error!("Error reading {}: {}", path, e);
                        std::process::exit(1);
                    }
                };
                experiment.annotate_genes(&index);
                engine.add_experiment(experiment);
            }

            info!("Comparing {} experiments", engine.len());
            let gene_model_info = GeneModelInfo::from_index(&index);
            let report = engine.overlay();

            if let Err(e) = generate_report(out_prefix, &report, &matching_config) {
                error!("Error writing report: {}", e);
                std::process::exit(1);
            }

            let collector = OutputCollector::new()
                .with_gene_model(gene_model_info)
                .with_overlay(OverlayOutput::from(&report));
            if let Err(e) = collector.write_to_prefix(out_prefix) {
                error!("Error writing output: {}", e);
                std::process::exit(1);
            }
            info!("Output written to {}.result.json", out_prefix);
        }
        Commands::Schema { output } => {
            let schema = fusecomp::output::schema::schema_json_pretty();
            if let Some(path) = output {
                if let Err(e) = std::fs::write(path, &schema) {
                    error!("Error writing schema: {}", e);
                    std::process::exit(1);
                } else {
                    info!("Schema written to {}", path);
                }
            } else {
                println!("{}", schema);
            }
        }
    }
}
