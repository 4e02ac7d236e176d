//! mirbench -- encode miRNA/target datasets into binding matrices.
//!
//! Reads a tab-separated dataset (or a published benchmark set by name),
//! builds the [N, 50, 20, 1] binding-matrix tensor, and writes either the
//! tensor as JSON or, with a model, the table plus a score column.
//!
//! Usage:
//!   mirbench --input set.tsv --mirna-column noncodingRNA --gene-column gene
//!   mirbench --dataset helwak --ratio 10 --data-dir data --format predictions --model mirbind.onnx

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use mirbench::dataset::BenchmarkDataset;
use mirbench::encoding::EncodeOptions;
use mirbench::pipeline::{self, InputSource, OutputFormat, RunConfig};
use mirbench::record::{DEFAULT_GENE_COLUMN, DEFAULT_MIRNA_COLUMN};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "mirbench", version)]
#[command(about = "Encode miRNA/gene pairs into binding matrices and score them")]
#[command(group(ArgGroup::new("source").required(true).args(["input", "dataset"])))]
struct Args {
    /// Input table: TSV, or JSON Lines when the extension is .jsonl.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Published benchmark dataset: helwak, hejret or klimentova.
    #[arg(short, long)]
    dataset: Option<BenchmarkDataset>,

    /// Negative:positive ratio of the benchmark test set (1, 10 or 100).
    #[arg(long, default_value_t = 1)]
    ratio: u32,

    /// Root directory holding the benchmark dataset folders.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Column containing miRNA sequences.
    #[arg(long, alias = "miRNA_column", default_value = DEFAULT_MIRNA_COLUMN)]
    mirna_column: String,

    /// Column containing gene sequences.
    #[arg(long, alias = "gene_column", default_value = DEFAULT_GENE_COLUMN)]
    gene_column: String,

    /// Output file (default: derived from the input path).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What to write.
    #[arg(short, long, value_enum, default_value_t = Format::Tensor)]
    format: Format,

    /// ONNX binding classifier, required for predictions output.
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Name of the score column in predictions output.
    #[arg(long, default_value = "miRBind")]
    tool_name: String,

    /// Encoder worker threads (0 = one per core).
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Tensor,
    Predictions,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Tensor => OutputFormat::Tensor,
            Format::Predictions => OutputFormat::Predictions,
        }
    }
}

impl Args {
    fn into_config(self) -> RunConfig {
        let input = match (self.input, self.dataset) {
            (Some(path), _) => InputSource::File(path),
            (None, Some(dataset)) => InputSource::Registry {
                dataset,
                ratio: self.ratio,
                root: self.data_dir,
            },
            (None, None) => unreachable!("the `source` group requires --input or --dataset"),
        };
        RunConfig {
            input,
            gene_column: self.gene_column,
            mirna_column: self.mirna_column,
            output: self.output,
            format: self.format.into(),
            model: self.model,
            tool_name: self.tool_name,
            encode: EncodeOptions {
                threads: self.threads,
            },
        }
    }
}

fn init_logging(quiet: bool) {
    let default = if quiet { "mirbench=warn" } else { "mirbench=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.quiet);

    match pipeline::run(&args.into_config()) {
        Ok(summary) => {
            println!("{}", summary.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("mirbench: {}", e);
            ExitCode::FAILURE
        }
    }
}
