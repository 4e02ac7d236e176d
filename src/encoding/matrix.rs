//! (gene, miRNA) pairs -> binding-matrix tensor.
//!
//! Each record becomes a [GENE_LEN, MIRNA_LEN, 1] slice of an [N, 50, 20, 1]
//! f32 tensor. Sequences are uppercased and truncated (never padded): a gene
//! shorter than 50 nt leaves its trailing rows zero, a miRNA shorter than
//! 20 nt leaves its trailing columns zero. Characters outside the nucleotide
//! alphabet are not an error; they simply never score.
//!
//! Records are resolved sequentially, so a malformed batch always reports its
//! first bad record, and the slices are then filled in parallel.

use ndarray::{Array3, Array4, ArrayView3, ArrayViewMut3, Axis};
use rayon::prelude::*;
use tracing::debug;

use super::alphabet::pair_score;
use crate::record::{FieldValue, SequenceFields};

/// Gene positions encoded per record.
pub const GENE_LEN: usize = 50;

/// miRNA positions encoded per record.
pub const MIRNA_LEN: usize = 20;

/// Trailing channel dimension expected by image-style model inputs.
pub const CHANNELS: usize = 1;

/// Errors raised while encoding a batch.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("malformed input at record {index}: field '{field}' {reason}")]
    MalformedInput {
        index: usize,
        field: String,
        reason: MalformedReason,
    },

    #[error("failed to build encoder thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Why a record's sequence field could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReason {
    #[error("is missing")]
    MissingField,

    #[error("is not a sequence (found {0})")]
    NotASequence(&'static str),
}

/// Tuning for batch encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Worker threads for filling slices. 0 uses rayon's global pool.
    pub threads: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions { threads: 0 }
    }
}

/// A stack of binding matrices, one per input record, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingMatrixBatch {
    tensor: Array4<f32>,
}

impl BindingMatrixBatch {
    fn zeros(n: usize) -> Self {
        BindingMatrixBatch {
            tensor: Array4::zeros((n, GENE_LEN, MIRNA_LEN, CHANNELS)),
        }
    }

    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        self.tensor.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Always `[len, GENE_LEN, MIRNA_LEN, CHANNELS]`.
    pub fn shape(&self) -> [usize; 4] {
        [self.len(), GENE_LEN, MIRNA_LEN, CHANNELS]
    }

    /// The [GENE_LEN, MIRNA_LEN, 1] matrix for record `index`.
    ///
    /// Panics if `index >= len()`.
    pub fn matrix(&self, index: usize) -> ArrayView3<'_, f32> {
        self.tensor.index_axis(Axis(0), index)
    }

    /// Score at (record, gene position, miRNA position).
    pub fn value(&self, index: usize, gene_pos: usize, mirna_pos: usize) -> f32 {
        self.tensor[[index, gene_pos, mirna_pos, 0]]
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.tensor
    }

    pub fn into_array(self) -> Array4<f32> {
        self.tensor
    }

    /// Row-major copy of all cells, as fed to model runtimes.
    pub fn to_flat_vec(&self) -> Vec<f32> {
        self.tensor.iter().copied().collect()
    }
}

/// Batch encoder holding an optional dedicated thread pool.
pub struct BindingMatrixEncoder {
    pool: Option<rayon::ThreadPool>,
}

impl BindingMatrixEncoder {
    pub fn new(options: &EncodeOptions) -> Result<Self, EncodeError> {
        let pool = if options.threads > 0 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(options.threads)
                    .build()?,
            )
        } else {
            None
        };
        Ok(BindingMatrixEncoder { pool })
    }

    /// Encodes `records`, reading sequences from the named fields.
    ///
    /// Fails on the first record (in input order) whose gene or miRNA field
    /// is absent, empty-as-missing, or not text. Nothing is returned for a
    /// partially valid batch.
    pub fn encode<R: SequenceFields>(
        &self,
        records: &[R],
        gene_field: &str,
        mirna_field: &str,
    ) -> Result<BindingMatrixBatch, EncodeError> {
        let pairs = resolve_pairs(records, gene_field, mirna_field)?;
        Ok(self.encode_pairs(&pairs))
    }

    /// Encodes already-extracted (gene, miRNA) pairs.
    pub fn encode_pairs(&self, pairs: &[(&str, &str)]) -> BindingMatrixBatch {
        let mut batch = BindingMatrixBatch::zeros(pairs.len());
        match &self.pool {
            Some(pool) => pool.install(|| fill_batch(&mut batch, pairs)),
            None => fill_batch(&mut batch, pairs),
        }
        debug!(records = pairs.len(), "encoded binding matrices");
        batch
    }
}

/// Encodes `records` on rayon's global pool.
pub fn encode<R: SequenceFields>(
    records: &[R],
    gene_field: &str,
    mirna_field: &str,
) -> Result<BindingMatrixBatch, EncodeError> {
    let pairs = resolve_pairs(records, gene_field, mirna_field)?;
    Ok(encode_pairs(&pairs))
}

/// Encodes (gene, miRNA) pairs on rayon's global pool.
pub fn encode_pairs(pairs: &[(&str, &str)]) -> BindingMatrixBatch {
    let mut batch = BindingMatrixBatch::zeros(pairs.len());
    fill_batch(&mut batch, pairs);
    batch
}

/// Encodes a single pair into a [GENE_LEN, MIRNA_LEN, 1] matrix.
pub fn encode_pair(gene: &str, mirna: &str) -> Array3<f32> {
    let mut matrix = Array3::zeros((GENE_LEN, MIRNA_LEN, CHANNELS));
    fill_matrix(matrix.view_mut(), gene, mirna);
    matrix
}

fn resolve_pairs<'r, R: SequenceFields>(
    records: &'r [R],
    gene_field: &str,
    mirna_field: &str,
) -> Result<Vec<(&'r str, &'r str)>, EncodeError> {
    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let gene = sequence_field(rec, i, gene_field)?;
            let mirna = sequence_field(rec, i, mirna_field)?;
            Ok((gene, mirna))
        })
        .collect()
}

fn sequence_field<'r, R: SequenceFields>(
    record: &'r R,
    index: usize,
    name: &str,
) -> Result<&'r str, EncodeError> {
    let reason = match record.field(name) {
        Some(FieldValue::Text(s)) => return Ok(s.as_str()),
        None | Some(FieldValue::Missing) => MalformedReason::MissingField,
        Some(other) => MalformedReason::NotASequence(other.kind()),
    };
    Err(EncodeError::MalformedInput {
        index,
        field: name.to_string(),
        reason,
    })
}

fn fill_batch(batch: &mut BindingMatrixBatch, pairs: &[(&str, &str)]) {
    batch
        .tensor
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(pairs.par_iter())
        .for_each(|(slice, &(gene, mirna))| fill_matrix(slice, gene, mirna));
}

/// Writes one record's scores into a zeroed [GENE_LEN, MIRNA_LEN, 1] view.
fn fill_matrix(mut out: ArrayViewMut3<'_, f32>, gene: &str, mirna: &str) {
    let mut mirna_buf = [' '; MIRNA_LEN];
    let mut mirna_len = 0;
    for (slot, c) in mirna_buf.iter_mut().zip(mirna.chars()) {
        *slot = c.to_ascii_uppercase();
        mirna_len += 1;
    }
    let mirna = &mirna_buf[..mirna_len];

    for (g, gc) in gene.chars().take(GENE_LEN).enumerate() {
        let gc = gc.to_ascii_uppercase();
        for (m, &mc) in mirna.iter().enumerate() {
            let score = pair_score(gc, mc);
            if score != 0.0 {
                out[[g, m, 0]] = score;
            }
        }
    }
}
