//! Payload ingestion and delimiter resolution.
//!
//! All input in estate-trends flows through [`read_payload`], which loads the
//! whole file (or stdin when the path is `-`) into memory and enforces the
//! ingestion size ceiling. Delimiter resolution for text inputs is
//! extension-based (`.tsv` → tab, otherwise comma) with manual override.

use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use anyhow::{Context, Result};

use crate::error::EstateError;

/// Upper bound on an ingested spreadsheet payload.
pub const MAX_PAYLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

/// Reads the full payload for `path`, rejecting anything over
/// [`MAX_PAYLOAD_BYTES`] with a decode error.
pub fn read_payload(path: &Path) -> Result<Vec<u8>> {
    if is_dash(path) {
        let mut buffer = Vec::new();
        io::stdin()
            .lock()
            .take(MAX_PAYLOAD_BYTES + 1)
            .read_to_end(&mut buffer)
            .context("Reading payload from stdin")?;
        if buffer.len() as u64 > MAX_PAYLOAD_BYTES {
            return Err(oversize_error().into());
        }
        return Ok(buffer);
    }
    let metadata = fs::metadata(path).with_context(|| format!("Reading input file {path:?}"))?;
    if metadata.len() > MAX_PAYLOAD_BYTES {
        return Err(oversize_error().into());
    }
    fs::read(path).with_context(|| format!("Reading input file {path:?}"))
}

fn oversize_error() -> EstateError {
    EstateError::decode(format!(
        "payload exceeds the {MAX_PAYLOAD_BYTES} byte ingestion ceiling"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn delimiter_resolution_prefers_override_then_extension() {
        assert_eq!(
            resolve_input_delimiter(&PathBuf::from("data.tsv"), None),
            b'\t'
        );
        assert_eq!(
            resolve_input_delimiter(&PathBuf::from("data.csv"), None),
            b','
        );
        assert_eq!(
            resolve_input_delimiter(&PathBuf::from("data.tsv"), Some(b'|')),
            b'|'
        );
    }

    #[test]
    fn dash_path_is_recognized() {
        assert!(is_dash(&PathBuf::from("-")));
        assert!(!is_dash(&PathBuf::from("-.csv")));
    }
}
