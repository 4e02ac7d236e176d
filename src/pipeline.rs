//! End-to-end run: load a dataset, encode it, and write either the tensor or
//! a scored predictions table.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::dataset::{self, BenchmarkDataset, DatasetError, Table, LABEL_COLUMN};
use crate::encoding::{BindingMatrixBatch, BindingMatrixEncoder, EncodeError, EncodeOptions};
use crate::record::{DEFAULT_GENE_COLUMN, DEFAULT_MIRNA_COLUMN};
use crate::scoring::{BindingScorer, ScoreError};

/// Errors from a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize tensor: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("predictions output requires a model (--model)")]
    ModelRequired,
}

/// Where the input table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A TSV file, or JSONL when the extension is `.jsonl`.
    File(PathBuf),
    /// A published benchmark dataset under a data root.
    Registry {
        dataset: BenchmarkDataset,
        ratio: u32,
        root: PathBuf,
    },
}

/// What the run writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The encoded tensor as JSON: `{"shape": [...], "data": [...]}`.
    Tensor,
    /// The input table plus a column of model scores, as TSV.
    Predictions,
}

/// Settings for one run. Build with [`RunConfig::new`] and override fields.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: InputSource,
    pub gene_column: String,
    pub mirna_column: String,
    /// Output file. For registry predictions runs this defaults to the
    /// dataset's shared `_predictions.tsv` path, which other tools' score
    /// columns are preserved in.
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub model: Option<PathBuf>,
    /// Name of the score column written in predictions mode.
    pub tool_name: String,
    pub encode: EncodeOptions,
}

impl RunConfig {
    /// Default columns, tensor output, all cores.
    pub fn new(input: InputSource) -> Self {
        RunConfig {
            input,
            gene_column: DEFAULT_GENE_COLUMN.to_string(),
            mirna_column: DEFAULT_MIRNA_COLUMN.to_string(),
            output: None,
            format: OutputFormat::Tensor,
            model: None,
            tool_name: "miRBind".to_string(),
            encode: EncodeOptions::default(),
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub records: usize,
    pub output: PathBuf,
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct TensorJson<'a> {
    shape: [usize; 4],
    data: &'a [f32],
}

/// Executes a run described by `config`.
pub fn run(config: &RunConfig) -> Result<RunSummary, PipelineError> {
    let start = Instant::now();
    let table = load_input(&config.input)?;
    info!(records = table.len(), columns = table.columns.len(), "loaded input");
    log_label_balance(&table);

    let encoder = BindingMatrixEncoder::new(&config.encode)?;
    let batch = encoder.encode(&table.records, &config.gene_column, &config.mirna_column)?;
    info!(
        records = batch.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "encoded binding matrices"
    );

    let output = resolve_output(config)?;
    match config.format {
        OutputFormat::Tensor => {
            if config.model.is_some() {
                warn!("--model is ignored when writing the tensor");
            }
            write_tensor_path(&batch, &output)?;
        }
        OutputFormat::Predictions => {
            let model = config.model.as_ref().ok_or(PipelineError::ModelRequired)?;
            let scorer = BindingScorer::new(model)?;
            let scores = scorer.score(&batch)?;
            let base = predictions_base(config, &output, table)?;
            dataset::tsv::write_predictions_path(&base, &config.tool_name, &scores, &output)?;
        }
    }

    info!(
        output = %output.display(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "run complete"
    );
    Ok(RunSummary {
        records: batch.len(),
        output,
        format: config.format,
    })
}

fn log_label_balance(table: &Table) {
    if !table.has_column(LABEL_COLUMN) {
        return;
    }
    match table.labels(LABEL_COLUMN) {
        Ok(labels) => {
            let positives = labels.iter().filter(|&&l| l == 1).count();
            info!(
                positives,
                negatives = labels.len() - positives,
                "label balance"
            );
        }
        Err(e) => warn!(error = %e, "label column is not binary"),
    }
}

/// Loads the table for `source`, applying dataset column aliases.
pub fn load_input(source: &InputSource) -> Result<Table, DatasetError> {
    match source {
        InputSource::File(path) => load_file(path),
        InputSource::Registry {
            dataset: set,
            ratio,
            root,
        } => {
            let path = set.test_set_path(root, *ratio)?;
            info!(dataset = %set, ratio = *ratio, "loading benchmark dataset");
            let mut table = dataset::tsv::read_path(&path)?;
            for &(from, to) in set.column_aliases() {
                if table.rename_column(from, to) {
                    info!(from, to, "renamed column");
                }
            }
            Ok(table)
        }
    }
}

fn load_file(path: &Path) -> Result<Table, DatasetError> {
    if path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
        dataset::jsonl::read_path(path)
    } else {
        dataset::tsv::read_path(path)
    }
}

/// Table the scores are written onto. A registry dataset's predictions file
/// is shared by every benchmarked tool, so when it already exists its rows and
/// columns are kept and only the tool's own column is added or replaced.
fn predictions_base(config: &RunConfig, output: &Path, table: Table) -> Result<Table, DatasetError> {
    let shared = match &config.input {
        InputSource::Registry {
            dataset,
            ratio,
            root,
        } => dataset.predictions_path(root, *ratio)?.as_path() == output,
        InputSource::File(_) => false,
    };
    if !shared || !output.exists() {
        return Ok(table);
    }
    let existing = dataset::tsv::read_path(output)?;
    if existing.len() != table.len() {
        return Err(DatasetError::RowCountMismatch {
            path: output.to_path_buf(),
            found: existing.len(),
            expected: table.len(),
        });
    }
    info!(
        path = %output.display(),
        columns = existing.columns.len(),
        "adding scores to existing predictions"
    );
    Ok(existing)
}

fn resolve_output(config: &RunConfig) -> Result<PathBuf, PipelineError> {
    if let Some(path) = &config.output {
        return Ok(path.clone());
    }
    match (&config.input, config.format) {
        (
            InputSource::Registry {
                dataset,
                ratio,
                root,
            },
            OutputFormat::Predictions,
        ) => Ok(dataset.predictions_path(root, *ratio)?),
        (InputSource::File(path), OutputFormat::Predictions) => {
            Ok(sibling_with_suffix(path, "_predictions.tsv"))
        }
        (InputSource::File(path), OutputFormat::Tensor) => {
            Ok(sibling_with_suffix(path, "_tensor.json"))
        }
        (InputSource::Registry { dataset, ratio, root }, OutputFormat::Tensor) => Ok(dataset
            .dir(root)
            .join(format!("miRNA_test_set_{}_tensor.json", ratio))),
    }
}

/// `data/set.tsv` + `_tensor.json` -> `data/set_tensor.json`.
fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}", stem, suffix))
}

/// Serializes a batch as `{"shape": [...], "data": [...]}`.
pub fn write_tensor<W: Write>(batch: &BindingMatrixBatch, out: &mut W) -> Result<(), PipelineError> {
    let data = batch.to_flat_vec();
    let doc = TensorJson {
        shape: batch.shape(),
        data: &data,
    };
    serde_json::to_writer(&mut *out, &doc)?;
    Ok(())
}

fn write_tensor_path(batch: &BindingMatrixBatch, path: &Path) -> Result<(), PipelineError> {
    let io_err = |source: std::io::Error| PipelineError::Output {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    write_tensor(batch, &mut out)?;
    writeln!(out).map_err(io_err)?;
    out.flush().map_err(io_err)
}
