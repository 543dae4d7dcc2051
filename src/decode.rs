//! Row decoding: raw spreadsheet payloads into ordered records.
//!
//! XLSX workbooks are decoded with `calamine` (first worksheet only);
//! delimited text goes through the `csv` crate with extension-based delimiter
//! resolution. Both paths produce the same [`Dataset`] shape: the first row
//! supplies the column set, later rows fill a [`Record`] per row with missing
//! cells mapped to JSON null. Rows with no populated cell at all are skipped.
//!
//! The first-row column set is a deliberate constraint: cells beyond the
//! header width are invisible to inference and dropped from the table.

use std::{io::Cursor, path::Path};

use anyhow::Result;
use calamine::{Data, Reader, Xlsx};
use log::debug;
use serde_json::{Number, Value};

use crate::{error::EstateError, io_utils};

/// One decoded row: an order-preserving map from column name to scalar.
pub type Record = serde_json::Map<String, Value>;

/// Ordered column names plus the decoded rows.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

/// Loads and decodes the spreadsheet at `path`.
///
/// `.xlsx`/`.xlsm` payloads decode as workbooks; `.csv`/`.tsv`/`.txt` (and
/// stdin) as delimited text. `limit` caps the number of decoded data rows
/// (0 means all).
pub fn load(path: &Path, delimiter: Option<u8>, limit: usize) -> Result<Dataset> {
    let payload = io_utils::read_payload(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let dataset = match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => decode_xlsx(&payload, limit)?,
        Some("csv") | Some("tsv") | Some("txt") | None => {
            let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
            decode_delimited(&payload, delimiter, limit)?
        }
        Some(other) => {
            return Err(EstateError::decode(format!(
                "unsupported spreadsheet format '.{other}'"
            ))
            .into());
        }
    };
    debug!(
        "Decoded {} row(s) across {} column(s)",
        dataset.rows.len(),
        dataset.columns.len()
    );
    Ok(dataset)
}

/// Decodes the first worksheet of an XLSX payload.
pub fn decode_xlsx(payload: &[u8], limit: usize) -> Result<Dataset, EstateError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(payload))
        .map_err(|err| EstateError::decode(format!("unreadable XLSX workbook: {err}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EstateError::decode("workbook contains no sheets"))?
        .map_err(|err| EstateError::decode(format!("unreadable worksheet: {err}")))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Dataset::default());
    };
    let columns = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| header_name(cell, idx))
        .collect::<Vec<_>>();

    let mut decoded = Vec::new();
    for row in rows {
        if limit > 0 && decoded.len() >= limit {
            break;
        }
        let cells = (0..columns.len())
            .map(|idx| row.get(idx).map(cell_to_value).unwrap_or(Value::Null))
            .collect();
        if let Some(record) = materialize_row(&columns, cells) {
            decoded.push(record);
        }
    }
    Ok(Dataset {
        columns,
        rows: decoded,
    })
}

/// Decodes a delimited text payload (CSV/TSV) with the given delimiter.
pub fn decode_delimited(
    payload: &[u8],
    delimiter: u8,
    limit: usize,
) -> Result<Dataset, EstateError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(payload);
    let headers = reader
        .headers()
        .map_err(|err| EstateError::decode(format!("unreadable delimited input: {err}")))?;
    let columns = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| synthetic_if_blank(name, idx))
        .collect::<Vec<_>>();

    let mut decoded = Vec::new();
    for record in reader.records() {
        if limit > 0 && decoded.len() >= limit {
            break;
        }
        let record = record
            .map_err(|err| EstateError::decode(format!("unreadable delimited input: {err}")))?;
        let cells = (0..columns.len())
            .map(|idx| match record.get(idx) {
                Some("") | None => Value::Null,
                Some(cell) => Value::String(cell.to_string()),
            })
            .collect();
        if let Some(record) = materialize_row(&columns, cells) {
            decoded.push(record);
        }
    }
    Ok(Dataset {
        columns,
        rows: decoded,
    })
}

// Materializes one record, skipping rows with no populated cell.
fn materialize_row(columns: &[String], cells: Vec<Value>) -> Option<Record> {
    if cells.iter().all(Value::is_null) {
        return None;
    }
    Some(columns.iter().cloned().zip(cells).collect())
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::Number((*i).into()),
        Data::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Data::Bool(b) => Value::Bool(*b),
        other => Value::String(other.to_string()),
    }
}

fn header_name(cell: &Data, idx: usize) -> String {
    let name = match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    synthetic_if_blank(&name, idx)
}

fn synthetic_if_blank(name: &str, idx: usize) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        format!("column_{}", idx + 1)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimited_payload_decodes_with_null_for_missing_cells() {
        let payload = b"Area,Year,Price\nDowntown,2020,100\nUptown,2021\n";
        let dataset = decode_delimited(payload, b',', 0).expect("decode");

        assert_eq!(dataset.columns, ["Area", "Year", "Price"]);
        assert_eq!(dataset.rows.len(), 2);
        assert_eq!(
            dataset.rows[1].get("Price"),
            Some(&Value::Null),
            "short row backfills null"
        );
        assert_eq!(
            dataset.rows[0].get("Year"),
            Some(&Value::String("2020".into()))
        );
    }

    #[test]
    fn delimited_payload_skips_fully_empty_rows() {
        let payload = b"Area,Year\n,,\nDowntown,2020\n";
        let dataset = decode_delimited(payload, b',', 0).expect("decode");
        assert_eq!(dataset.rows.len(), 1);
    }

    #[test]
    fn delimited_payload_drops_cells_beyond_header_width() {
        let payload = b"Area,Year\nDowntown,2020,surprise\n";
        let dataset = decode_delimited(payload, b',', 0).expect("decode");
        assert_eq!(dataset.rows[0].len(), 2);
    }

    #[test]
    fn blank_headers_get_synthetic_names() {
        let payload = b"Area,,Price\nDowntown,x,100\n";
        let dataset = decode_delimited(payload, b',', 0).expect("decode");
        assert_eq!(dataset.columns, ["Area", "column_2", "Price"]);
    }

    #[test]
    fn row_limit_caps_decoded_rows() {
        let payload = b"Year\n2020\n2021\n2022\n";
        let dataset = decode_delimited(payload, b',', 2).expect("decode");
        assert_eq!(dataset.rows.len(), 2);
    }

    #[test]
    fn empty_payload_yields_empty_dataset() {
        let dataset = decode_delimited(b"", b',', 0).expect("decode");
        assert!(dataset.columns.is_empty());
        assert!(dataset.rows.is_empty());
    }

    #[test]
    fn garbage_xlsx_payload_is_a_decode_error() {
        let err = decode_xlsx(b"definitely not a zip archive", 0).unwrap_err();
        assert!(matches!(err, EstateError::Decode(_)));
    }

    #[test]
    fn cell_values_map_to_json_scalars() {
        assert_eq!(cell_to_value(&Data::Empty), Value::Null);
        assert_eq!(
            cell_to_value(&Data::String("Downtown".into())),
            Value::String("Downtown".into())
        );
        assert_eq!(cell_to_value(&Data::Int(7)), Value::Number(7.into()));
        assert_eq!(cell_to_value(&Data::Bool(true)), Value::Bool(true));
        let float = cell_to_value(&Data::Float(2020.0));
        assert_eq!(float.as_f64(), Some(2020.0));
    }

    #[test]
    fn header_names_trim_and_synthesize() {
        assert_eq!(header_name(&Data::String(" Year ".into()), 3), "Year");
        assert_eq!(header_name(&Data::Empty, 3), "column_4");
        assert_eq!(header_name(&Data::Float(2020.0), 0), "2020");
    }
}
