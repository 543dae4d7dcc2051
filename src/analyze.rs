//! The analyze pipeline: decode, infer roles, aggregate, summarize.

use std::{
    fs::File,
    io::{BufWriter, Write},
};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    aggregate::{self, YearlyStat},
    cli::AnalyzeArgs,
    columns,
    decode::{self, Dataset, Record},
    io_utils, table,
};

/// The complete analysis result: the machine-readable boundary between the
/// pipeline and any report or chart consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: String,
    pub chart_data: Vec<YearlyStat>,
    pub table: Vec<Record>,
}

/// Runs inference and aggregation over a decoded dataset.
pub fn analyze(dataset: Dataset) -> Analysis {
    let roles = columns::infer_roles(&dataset.columns);
    let chart_data = aggregate::aggregate_by_year(&dataset.rows, &roles);
    let summary = summarize(dataset.rows.len(), &chart_data);
    Analysis {
        summary,
        chart_data,
        table: dataset.rows,
    }
}

/// Builds the one-line display summary. The row count covers every decoded
/// record, including those dropped during aggregation; an empty stat sequence
/// renders both year bounds as `unavailable`.
pub fn summarize(row_count: usize, stats: &[YearlyStat]) -> String {
    let first = stats
        .first()
        .map_or_else(|| "unavailable".to_string(), |s| s.year.to_string());
    let last = stats
        .last()
        .map_or_else(|| "unavailable".to_string(), |s| s.year.to_string());
    format!("Uploaded file contains {row_count} rows. Showing trends from {first} to {last}.")
}

pub fn execute(args: &AnalyzeArgs) -> Result<()> {
    let dataset = decode::load(&args.input, args.delimiter, args.limit)
        .with_context(|| format!("Decoding spreadsheet {:?}", args.input))?;
    info!(
        "Decoded {} row(s) across {} column(s) from '{}'",
        dataset.rows.len(),
        dataset.columns.len(),
        args.input.display()
    );

    let analysis = analyze(dataset);
    if args.table {
        print_stats_table(&analysis.chart_data);
    }

    let rendered = serde_json::to_string_pretty(&analysis).context("Serializing analysis")?;
    match &args.output {
        Some(path) if !io_utils::is_dash(path) => {
            let file =
                File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
            let mut writer = BufWriter::new(file);
            writer.write_all(rendered.as_bytes())?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            info!("Analysis written to {:?}", path);
        }
        _ => println!("{rendered}"),
    }
    info!(
        "Aggregated {} yearly stat(s) from {} row(s)",
        analysis.chart_data.len(),
        analysis.table.len()
    );
    Ok(())
}

fn print_stats_table(stats: &[YearlyStat]) {
    let headers = vec![
        "year".to_string(),
        "price".to_string(),
        "demand".to_string(),
        "size".to_string(),
        "supply".to_string(),
    ];
    let rows = stats
        .iter()
        .map(|s| {
            vec![
                s.year.to_string(),
                aggregate::format_number(s.price),
                aggregate::format_number(s.demand),
                aggregate::format_number(s.size),
                aggregate::format_number(s.supply),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
}
