//! mirbench: binding-matrix encoding for miRNA target prediction benchmarks.
//!
//! Exposes the encoder, dataset I/O, optional model scoring, and the run
//! pipeline used by the `mirbench` binary and integration tests.

pub mod dataset;
pub mod encoding;
pub mod pipeline;
pub mod record;
pub mod scoring;

pub use encoding::{encode, BindingMatrixBatch, EncodeError, GENE_LEN, MIRNA_LEN};
pub use record::{FieldValue, SequenceFields, SequencePairRecord};
