//! Report rendering and output.
//!
//! The report is a deterministic paginated plain-text document with four
//! ordered sections: title, summary, one flat key-value line per yearly stat,
//! and one per raw table row. Pages are separated by form feeds.
//!
//! The destination defaults to a single well-known path, overwritten on every
//! request; callers needing to keep several reports pass an explicit output
//! path instead. Writes are serialized behind a process-wide lock and flushed
//! before success is reported, and a failed write removes the partial file.

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use anyhow::{Context, Result};
use log::info;
use serde_json::Value;

use crate::{
    aggregate::{YearlyStat, format_number},
    analyze::Analysis,
    cli::ReportArgs,
    error::EstateError,
    io_utils,
};

/// Shared destination used when no explicit output path is given.
pub const DEFAULT_REPORT_PATH: &str = "RealEstate_Report.txt";

const REPORT_TITLE: &str = "Real Estate Analysis Report";
const LINES_PER_PAGE: usize = 54;

static REPORT_LOCK: Mutex<()> = Mutex::new(());

pub fn execute(args: &ReportArgs) -> Result<()> {
    let request: Value = if io_utils::is_dash(&args.input) {
        serde_json::from_reader(io::stdin().lock()).context("Reading report request from stdin")?
    } else {
        let file = File::open(&args.input)
            .with_context(|| format!("Opening report request {:?}", args.input))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Reading report request {:?}", args.input))?
    };
    let analysis = parse_request(request)?;

    let destination = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH));
    write_report(&analysis, &destination)?;
    info!(
        "Report with {} yearly stat(s) and {} table row(s) written to '{}'",
        analysis.chart_data.len(),
        analysis.table.len(),
        destination.display()
    );
    Ok(())
}

/// Validates a report request: all three analysis fields must be present and
/// well-formed, otherwise the request is rejected.
pub fn parse_request(request: Value) -> Result<Analysis, EstateError> {
    let Some(object) = request.as_object() else {
        return Err(EstateError::MissingInput(
            "request body must be a JSON object".to_string(),
        ));
    };
    for field in ["summary", "chart_data", "table"] {
        if !object.contains_key(field) {
            return Err(EstateError::missing_field(field));
        }
    }
    serde_json::from_value(request).map_err(|err| EstateError::MissingInput(err.to_string()))
}

/// Renders the full document text. Deliberately timestamp-free so that
/// identical analyses produce byte-identical reports.
pub fn render_document(analysis: &Analysis) -> String {
    let mut lines = Vec::new();
    lines.push(REPORT_TITLE.to_string());
    lines.push(String::new());
    lines.push("Summary:".to_string());
    lines.push(analysis.summary.clone());
    lines.push(String::new());
    lines.push("Chart Data (Year-wise Aggregation):".to_string());
    for stat in &analysis.chart_data {
        lines.push(render_stat_line(stat));
    }
    lines.push(String::new());
    lines.push("Complete Table Data:".to_string());
    for row in &analysis.table {
        lines.push(render_record_line(row));
    }
    paginate(&lines)
}

/// Writes the rendered document to `path`, overwriting any prior report.
///
/// The write is serialized process-wide and fully flushed before returning;
/// on failure the partial file is removed rather than left as a misleading
/// artifact.
pub fn write_report(analysis: &Analysis, path: &Path) -> Result<(), EstateError> {
    let _guard = REPORT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let document = render_document(analysis);
    if let Err(source) = write_flushed(path, document.as_bytes()) {
        let _ = fs::remove_file(path);
        return Err(EstateError::Write { source });
    }
    Ok(())
}

fn write_flushed(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|err| err.into_error())?
        .sync_all()
}

fn render_stat_line(stat: &YearlyStat) -> String {
    format!(
        "year={}, price={}, demand={}, size={}, supply={}",
        stat.year,
        format_number(stat.price),
        format_number(stat.demand),
        format_number(stat.size),
        format_number(stat.supply)
    )
}

fn render_record_line(row: &serde_json::Map<String, Value>) -> String {
    row.iter()
        .map(|(name, value)| format!("{name}={}", render_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn paginate(lines: &[String]) -> String {
    let mut output = String::new();
    for (page, chunk) in lines.chunks(LINES_PER_PAGE).enumerate() {
        if page > 0 {
            output.push('\u{0c}');
        }
        for line in chunk {
            output.push_str(line);
            output.push('\n');
        }
    }
    output
}
