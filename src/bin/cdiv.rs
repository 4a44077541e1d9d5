//! cdiv - abundance matrix diversity CLI
//!
//! Command-line interface for diversity, rarefaction and normalization of
//! BIOM abundance matrices.

use clap::{Parser, Subcommand, ValueEnum};
use composable_diversity::analysis::Analysis;
use composable_diversity::config::AnalysisConfig;
use composable_diversity::data::{AbundanceMatrix, AnnotationKind, Applicability, BiomTable};
use composable_diversity::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Output format for computed statistics
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human readable table
    Text,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

/// Abundance matrix diversity analysis
#[derive(Parser)]
#[command(name = "cdiv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand that reads a matrix.
#[derive(clap::Args)]
struct InputArgs {
    /// Path to BIOM JSON file
    #[arg(short, long)]
    input: PathBuf,

    /// Path to analysis configuration YAML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the annotation kind (organism, function, ontology, feature)
    #[arg(long)]
    annotation: Option<AnnotationKind>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a matrix: shape, encoding, samples and known totals
    Summary {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Alpha diversity of every sample
    Diversity {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Rarefaction curves
    Rarefaction {
        #[command(flatten)]
        input: InputArgs,

        /// Only this sample (default: all samples with a known total)
        #[arg(short, long)]
        sample: Option<String>,

        /// Total read count for --sample, overriding the file's value
        #[arg(short, long, requires = "sample")]
        total: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write the normalized (or raw) dense matrix as TSV
    Normalize {
        #[command(flatten)]
        input: InputArgs,

        /// Write the raw dense matrix instead of the normalized one
        #[arg(long)]
        raw: bool,

        /// Output path for the TSV
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate an example analysis configuration
    ExampleConfig {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "analysis.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Summary { input } => cmd_summary(&input),
        Commands::Diversity { input, format } => cmd_diversity(&input, format),
        Commands::Rarefaction {
            input,
            sample,
            total,
            format,
        } => cmd_rarefaction(&input, sample.as_deref(), total, format),
        Commands::Normalize { input, raw, output } => cmd_normalize(&input, raw, &output),
        Commands::ExampleConfig { output } => cmd_example_config(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Load the matrix and settings named by the shared arguments.
///
/// The annotation kind comes from `--annotation`, then the config file,
/// then the BIOM `type` field.
fn load_analysis(args: &InputArgs) -> Result<Analysis> {
    eprintln!("Loading matrix...");
    let table = BiomTable::from_json_file(&args.input)?;
    let table_kind = table.annotation_kind();

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::for_annotation(table_kind.unwrap_or_default()),
    };
    if let Some(kind) = args.annotation {
        config.annotation = kind;
    }

    let matrix = AbundanceMatrix::from_biom(table)?;
    Analysis::with_config(matrix, config)
}

fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(value)?),
        _ => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

fn cmd_summary(args: &InputArgs) -> Result<()> {
    let analysis = load_analysis(args)?;
    let matrix = analysis.matrix();
    let (n_rows, n_cols) = matrix.shape();

    println!("Matrix Summary");
    println!("==============");
    println!();
    println!("Encoding:    {}", matrix.matrix_type());
    println!("Annotation:  {}", analysis.annotation());
    println!("Annotations: {}", n_rows);
    println!("Samples:     {}", n_cols);
    println!();
    println!("{:<24} {:>14}", "Sample", "Total reads");
    for (id, total) in matrix.column_ids().iter().zip(matrix.sample_totals()) {
        match total {
            Some(t) => println!("{:<24} {:>14}", id, t),
            None => println!("{:<24} {:>14}", id, "unknown"),
        }
    }
    Ok(())
}

fn cmd_diversity(args: &InputArgs, format: OutputFormat) -> Result<()> {
    let analysis = load_analysis(args)?;
    let diversity = match analysis.alpha_diversity()? {
        Applicability::Applicable(d) => d,
        Applicability::NotApplicable => {
            eprintln!(
                "Alpha diversity is not defined for {} annotations",
                analysis.annotation()
            );
            return Ok(());
        }
    };

    match format {
        OutputFormat::Text => {
            println!("{:<24} {:>12}", "Sample", "Diversity");
            for (sample, value) in diversity.iter() {
                println!("{:<24} {:>12.4}", sample, value);
            }
        }
        _ => print_structured(&diversity.to_map(), format)?,
    }
    Ok(())
}

fn cmd_rarefaction(
    args: &InputArgs,
    sample: Option<&str>,
    total: Option<u64>,
    format: OutputFormat,
) -> Result<()> {
    let analysis = load_analysis(args)?;

    let curves = match sample {
        Some(id) => {
            let total = match total {
                Some(t) => Some(t),
                None => analysis.matrix().sample_total(id)?,
            };
            match total {
                Some(t) => analysis.rarefaction_curve(id, t)?.map(|c| vec![c]),
                None => {
                    eprintln!("No total read count known for {}; pass --total", id);
                    return Ok(());
                }
            }
        }
        None => analysis.rarefaction()?,
    };
    let curves = match curves {
        Applicability::Applicable(c) => c,
        Applicability::NotApplicable => {
            eprintln!(
                "Rarefaction is not defined for {} annotations",
                analysis.annotation()
            );
            return Ok(());
        }
    };

    match format {
        OutputFormat::Text => {
            println!("{:<24} {:>12} {:>12}", "Sample", "Depth", "Richness");
            for curve in &curves {
                for point in &curve.points {
                    println!(
                        "{:<24} {:>12} {:>12.4}",
                        curve.sample_id, point.depth, point.expected_richness
                    );
                }
            }
        }
        _ => print_structured(&curves, format)?,
    }
    Ok(())
}

fn cmd_normalize(args: &InputArgs, raw: bool, output: &Path) -> Result<()> {
    let analysis = load_analysis(args)?;
    match analysis.ordination_input(!raw)? {
        Some(input) => {
            input.to_tsv(output)?;
            eprintln!(
                "Wrote {}x{} {} matrix to {:?}",
                input.n_rows(),
                input.n_samples(),
                input.transformation.as_deref().unwrap_or("raw"),
                output
            );
        }
        None => eprintln!("Matrix is empty; nothing written"),
    }
    Ok(())
}

fn cmd_example_config(output_path: &Path) -> Result<()> {
    let config = AnalysisConfig {
        name: "example-diversity".to_string(),
        description: Some("Alpha diversity and rarefaction of a taxonomic profile".to_string()),
        ..AnalysisConfig::default()
    };
    let yaml = config.to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example configuration to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}
