//! Binding-matrix feature encoding.
//!
//! Converts (gene, miRNA) sequence pairs into the [N, 50, 20, 1] f32 tensor
//! consumed by CNN-style binding classifiers. Cell `[i, g, m, 0]` holds the
//! compatibility score of gene nucleotide `g` against miRNA nucleotide `m`
//! for record `i`.

pub mod alphabet;
pub mod matrix;

pub use matrix::{
    encode, encode_pair, encode_pairs, BindingMatrixBatch, BindingMatrixEncoder, EncodeError,
    EncodeOptions, MalformedReason, CHANNELS, GENE_LEN, MIRNA_LEN,
};
