use std::io;

use thiserror::Error;

/// Fatal failures the pipeline can surface to a caller.
///
/// Per-cell problems (a non-numeric price, a malformed year) are never errors:
/// they degrade to zero or drop the affected record during aggregation. Only
/// whole-request failures appear here.
#[derive(Debug, Error)]
pub enum EstateError {
    /// The payload is not a readable spreadsheet, has no usable sheet, or
    /// exceeds the ingestion size ceiling.
    #[error("failed to decode spreadsheet: {0}")]
    Decode(String),
    /// A report was requested without the required analysis fields.
    #[error("invalid report request: {0}")]
    MissingInput(String),
    /// The report document could not be written to its destination.
    #[error("failed to write report: {source}")]
    Write {
        #[source]
        source: io::Error,
    },
}

impl EstateError {
    pub fn decode(reason: impl Into<String>) -> Self {
        EstateError::Decode(reason.into())
    }

    pub fn missing_field(field: &str) -> Self {
        EstateError::MissingInput(format!("missing required field '{field}'"))
    }
}
