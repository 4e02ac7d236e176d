//! Tab-separated dataset reading and predictions writing.
//!
//! The first line is the header. Empty cells load as `FieldValue::Missing`,
//! which the encoder rejects if it lands in a sequence column. Cells are not
//! quoted or escaped, so a value holding a tab or line break is refused on
//! write rather than producing a file that cannot be read back. A leading
//! UTF-8 byte order mark is dropped.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use super::{DatasetError, Table};
use crate::record::{FieldValue, SequencePairRecord};

/// Loads a TSV file.
pub fn read_path(path: &Path) -> Result<Table, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read(BufReader::new(file))?;
    debug!(path = %path.display(), rows = table.len(), "loaded tsv");
    Ok(table)
}

/// Parses TSV from any buffered reader.
pub fn read<R: BufRead>(reader: R) -> Result<Table, DatasetError> {
    let mut lines = reader.lines().enumerate();

    let columns: Vec<String> = loop {
        match lines.next() {
            Some((idx, line)) => {
                let line = line?;
                let mut line = trim_line_end(&line);
                if idx == 0 {
                    line = line.strip_prefix('\u{feff}').unwrap_or(line);
                }
                if !line.is_empty() {
                    break split_cells(line).into_iter().map(str::to_string).collect();
                }
            }
            None => return Err(DatasetError::MissingHeader),
        }
    };
    for (i, col) in columns.iter().enumerate() {
        if columns[..i].contains(col) {
            return Err(DatasetError::DuplicateColumn(col.clone()));
        }
    }

    let mut records = Vec::new();
    for (idx, line) in lines {
        let line = line?;
        let line = trim_line_end(&line);
        if line.is_empty() {
            continue;
        }
        let cells = split_cells(line);
        if cells.len() != columns.len() {
            return Err(DatasetError::RaggedRow {
                line: idx + 1,
                expected: columns.len(),
                found: cells.len(),
            });
        }
        let rec = SequencePairRecord::from_pairs(
            columns
                .iter()
                .zip(cells)
                .map(|(col, cell)| (col.as_str(), parse_cell(cell))),
        );
        records.push(rec);
    }

    Ok(Table { columns, records })
}

/// Writes `table` as TSV. Fails before writing anything if a column name
/// or cell would break the row structure.
pub fn write<W: Write>(table: &Table, out: &mut W) -> Result<(), DatasetError> {
    if let Some(col) = table.columns.iter().find(|c| breaks_row(c)) {
        return Err(DatasetError::UnwritableColumn(col.clone()));
    }
    let mut rows = Vec::with_capacity(table.len());
    for (record, rec) in table.records.iter().enumerate() {
        let mut row = Vec::with_capacity(table.columns.len());
        for col in &table.columns {
            let cell = rec.get(col).map(FieldValue::to_cell).unwrap_or_default();
            if breaks_row(&cell) {
                return Err(DatasetError::UnwritableCell {
                    record,
                    column: col.clone(),
                });
            }
            row.push(cell);
        }
        rows.push(row.join("\t"));
    }

    writeln!(out, "{}", table.columns.join("\t"))?;
    for row in &rows {
        writeln!(out, "{}", row)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes `table` with an extra `tool` column holding `scores`, in record
/// order. An existing column of the same name is overwritten.
pub fn write_predictions<W: Write>(
    table: &Table,
    tool: &str,
    scores: &[f32],
    out: &mut W,
) -> Result<(), DatasetError> {
    if scores.len() != table.len() {
        return Err(DatasetError::ScoreCountMismatch {
            scores: scores.len(),
            records: table.len(),
        });
    }
    let mut with_scores = table.clone();
    if !with_scores.has_column(tool) {
        with_scores.columns.push(tool.to_string());
    }
    for (rec, &score) in with_scores.records.iter_mut().zip(scores) {
        rec.insert(tool, FieldValue::Number(f64::from(score)));
    }
    write(&with_scores, out)
}

/// Writes predictions to a file path. The table is rendered in memory first,
/// so a refused table leaves an existing file untouched.
pub fn write_predictions_path(
    table: &Table,
    tool: &str,
    scores: &[f32],
    path: &Path,
) -> Result<(), DatasetError> {
    let mut buf = Vec::new();
    write_predictions(table, tool, scores, &mut buf)?;
    let io_err = |source: std::io::Error| DatasetError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    out.write_all(&buf).map_err(io_err)?;
    out.flush().map_err(io_err)
}

fn trim_line_end(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

fn breaks_row(text: &str) -> bool {
    text.contains(['\t', '\n', '\r'])
}

fn split_cells(line: &str) -> Vec<&str> {
    line.split('\t').collect()
}

fn parse_cell(cell: &str) -> FieldValue {
    if cell.is_empty() {
        FieldValue::Missing
    } else {
        FieldValue::Text(cell.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "noncodingRNA\tgene\tlabel\n\
        UAGCAGCACGUAAAUAUUGGCG\tACGUACGUAAGCUGCUAA\t1\n\
        UGAGGUAGUAGGUUGUAUAGUU\tCCGUAUUUACGGCAUCCA\t0\n";

    #[test]
    fn reads_header_and_rows() {
        let table = read(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.columns, vec!["noncodingRNA", "gene", "label"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[1].text("gene"), Some("CCGUAUUUACGGCAUCCA"));
        assert_eq!(table.labels("label").unwrap(), vec![1, 0]);
    }

    #[test]
    fn tolerates_crlf_and_blank_lines() {
        let input = "gene\tnoncodingRNA\r\nACGU\tUGCA\r\n\r\nAAAA\tUUUU\r\n\n";
        let table = read(input.as_bytes()).unwrap();
        assert_eq!(table.columns, vec!["gene", "noncodingRNA"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].text("noncodingRNA"), Some("UGCA"));
    }

    #[test]
    fn empty_cells_load_as_missing() {
        let table = read("gene\tnoncodingRNA\n\tUGCA\n".as_bytes()).unwrap();
        assert_eq!(table.records[0].get("gene"), Some(&FieldValue::Missing));
    }

    #[test]
    fn ragged_row_reports_line_number() {
        let err = read("gene\tnoncodingRNA\nACGU\tUGCA\nACGU\n".as_bytes()).unwrap_err();
        match err {
            DatasetError::RaggedRow {
                line,
                expected,
                found,
            } => {
                assert_eq!((line, expected, found), (3, 2, 1));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(read("".as_bytes()), Err(DatasetError::MissingHeader)));
    }

    #[test]
    fn duplicate_header_is_rejected() {
        assert!(matches!(
            read("gene\tgene\n".as_bytes()),
            Err(DatasetError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn write_round_trips_cells() {
        let table = read(SAMPLE.as_bytes()).unwrap();
        let mut out = Vec::new();
        write(&table, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), SAMPLE);
    }

    #[test]
    fn predictions_append_tool_column() {
        let table = read(SAMPLE.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_predictions(&table, "miRBind", &[0.75, 0.125], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "noncodingRNA\tgene\tlabel\tmiRBind");
        assert!(lines[1].ends_with("\t1\t0.75"));
        assert!(lines[2].ends_with("\t0\t0.125"));
    }

    #[test]
    fn byte_order_mark_is_not_part_of_the_first_column() {
        let table = read("\u{feff}gene\tnoncodingRNA\r\nACGU\tUGCA\r\n".as_bytes()).unwrap();
        assert_eq!(table.columns, vec!["gene", "noncodingRNA"]);
        assert_eq!(table.records[0].text("gene"), Some("ACGU"));
    }

    #[test]
    fn tab_inside_a_cell_is_refused_on_write() {
        let table = crate::dataset::jsonl::read(
            "{\"gene\":\"ACGU\",\"noncodingRNA\":\"UGCA\",\"id\":\"a\\tb\"}\n".as_bytes(),
        )
        .unwrap();
        assert_eq!(table.records[0].text("id"), Some("a\tb"));

        let mut out = Vec::new();
        let err = write_predictions(&table, "tool", &[0.5], &mut out).unwrap_err();
        match err {
            DatasetError::UnwritableCell { record, column } => {
                assert_eq!((record, column.as_str()), (0, "id"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(out.is_empty(), "nothing is written for a refused table");
    }

    #[test]
    fn line_breaks_in_cells_and_names_are_refused() {
        let mut table = read(SAMPLE.as_bytes()).unwrap();
        table.records[1].insert("gene", FieldValue::from("ACGU\nACGU"));
        assert!(matches!(
            write(&table, &mut Vec::new()),
            Err(DatasetError::UnwritableCell { record: 1, .. })
        ));

        let table = Table {
            columns: vec!["a\rb".to_string()],
            records: Vec::new(),
        };
        assert!(matches!(
            write(&table, &mut Vec::new()),
            Err(DatasetError::UnwritableColumn(_))
        ));
    }

    #[test]
    fn predictions_require_one_score_per_record() {
        let table = read(SAMPLE.as_bytes()).unwrap();
        let err = write_predictions(&table, "tool", &[0.5], &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::ScoreCountMismatch {
                scores: 1,
                records: 2
            }
        ));
    }
}
