//! JSON Lines dataset reading: one JSON object per line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use super::{DatasetError, Table};
use crate::record::{FieldValue, SequencePairRecord};

/// Loads a JSONL file.
pub fn read_path(path: &Path) -> Result<Table, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read(BufReader::new(file))
}

/// Parses JSONL. Columns are the union of object keys in order of first
/// appearance (keys within one line arrive sorted). A key absent from some
/// line is simply absent from that record.
pub fn read<R: BufRead>(reader: R) -> Result<Table, DatasetError> {
    let mut table = Table::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line).map_err(|source| DatasetError::Json {
            line: idx + 1,
            source,
        })?;
        let Value::Object(map) = value else {
            return Err(DatasetError::NotAnObject { line: idx + 1 });
        };

        let mut rec = SequencePairRecord::new();
        for (key, v) in map {
            if !table.has_column(&key) {
                table.columns.push(key.clone());
            }
            rec.insert(key, FieldValue::from(v));
        }
        table.records.push(rec);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_objects_and_collects_columns() {
        let input = r#"{"gene": "ACGU", "noncodingRNA": "UGCA", "label": 1}
{"gene": "AAAA", "noncodingRNA": "UUUU", "label": 0, "id": "x2"}
"#;
        let table = read(input.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.has_column("id"));
        assert_eq!(table.records[1].text("gene"), Some("AAAA"));
        assert_eq!(table.records[0].get("label"), Some(&FieldValue::Number(1.0)));
        assert!(table.records[0].get("id").is_none());
        assert_eq!(table.labels("label").unwrap(), vec![1, 0]);
    }

    #[test]
    fn invalid_json_reports_line() {
        let input = "{\"gene\": \"A\"}\n\n{not json}\n";
        let err = read(input.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::Json { line: 3, .. }), "{}", err);
    }

    #[test]
    fn non_object_line_is_rejected() {
        let err = read("[1, 2]\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::NotAnObject { line: 1 }));
    }
}
