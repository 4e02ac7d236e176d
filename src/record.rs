//! Input records for the binding-matrix encoder.
//!
//! A `SequencePairRecord` is one row of a benchmark dataset: a gene fragment,
//! a miRNA, and whatever other columns the dataset carries (labels, tool
//! predictions, identifiers). The encoder only ever reads two named fields.

use serde_json::Value;

/// Default column holding the gene (target site) sequence.
pub const DEFAULT_GENE_COLUMN: &str = "gene";

/// Default column holding the miRNA sequence.
pub const DEFAULT_MIRNA_COLUMN: &str = "noncodingRNA";

/// A single cell of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// A JSON array or object, kept as its serialized text.
    Structured(String),
    /// Empty TSV cell or JSON `null`.
    Missing,
}

impl FieldValue {
    /// Returns the text content if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Number(_) => "number",
            FieldValue::Bool(_) => "bool",
            FieldValue::Structured(_) => "structured",
            FieldValue::Missing => "missing",
        }
    }

    /// Renders the value as a TSV cell. `Missing` becomes the empty string.
    pub fn to_cell(&self) -> String {
        match self {
            FieldValue::Text(s) | FieldValue::Structured(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Missing => String::new(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => FieldValue::Text(s),
            Value::Number(n) => n.as_f64().map_or(FieldValue::Missing, FieldValue::Number),
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Null => FieldValue::Missing,
            other @ (Value::Array(_) | Value::Object(_)) => {
                FieldValue::Structured(other.to_string())
            }
        }
    }
}

/// Read access to named fields, so the encoder can work over any row type.
pub trait SequenceFields {
    fn field(&self, name: &str) -> Option<&FieldValue>;
}

/// One dataset row. Field order is insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequencePairRecord {
    fields: Vec<(String, FieldValue)>,
}

impl SequencePairRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record holding just a gene and a miRNA under the default
    /// column names.
    pub fn pair(gene: &str, mirna: &str) -> Self {
        Self::from_pairs([
            (DEFAULT_GENE_COLUMN, FieldValue::from(gene)),
            (DEFAULT_MIRNA_COLUMN, FieldValue::from(mirna)),
        ])
    }

    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        let mut rec = Self::new();
        for (k, v) in pairs {
            rec.insert(k, v);
        }
        rec
    }

    /// Sets a field, replacing any existing value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Returns the field as text, if present and textual.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    /// Renames a field in place. Returns false if `from` is absent.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.fields.iter_mut().find(|(k, _)| k == from) {
            Some((k, _)) => {
                *k = to.to_string();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl SequenceFields for SequencePairRecord {
    fn field(&self, name: &str) -> Option<&FieldValue> {
        self.get(name)
    }
}
