use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Analyze real-estate spreadsheets and render yearly trend reports",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode a spreadsheet, infer column roles, and aggregate by year
    Analyze(AnalyzeArgs),
    /// Render a printable report from a saved analysis result
    Report(ReportArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Input spreadsheet (.xlsx, .csv, .tsv; '-' reads delimited text from stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination for the analysis JSON (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter for text inputs (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Maximum data rows to decode (0 = all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
    /// Print the yearly aggregates as a formatted table
    #[arg(long)]
    pub table: bool,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Analysis JSON produced by `analyze` ('-' reads from stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Report destination (defaults to the shared well-known report path)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_parsing_accepts_names_and_literals() {
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("").is_err());
    }
}
