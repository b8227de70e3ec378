//! CSV loading
//!
//! Tabular data embeds poorly as raw comma soup, so CSV files are rendered
//! into a structured text summary (shape, columns, numeric statistics, and a
//! row sample) that chunks and retrieves well.

use super::text::decode_bytes;
use crate::error::{Error, Result};
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

/// Candidate delimiters, tried in order
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

const SAMPLE_ROWS: usize = 10;

pub fn load(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let content = decode_bytes(&bytes);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let delimiter = detect_delimiter(&content);
    debug!(
        "Parsing '{}' with delimiter {:?}",
        file_name, delimiter as char
    );

    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(Error::Load(format!("'{file_name}' has no header row")));
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|f| f.trim().to_string()).collect());
    }

    Ok(summarize(&file_name, &headers, &rows))
}

/// First delimiter that yields more than one column wins; comma otherwise
fn detect_delimiter(content: &str) -> u8 {
    for delimiter in DELIMITERS {
        let mut reader = ::csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .from_reader(content.as_bytes());
        if let Ok(headers) = reader.headers() {
            if headers.len() > 1 {
                return delimiter;
            }
        }
    }
    b','
}

fn summarize(file_name: &str, headers: &[String], rows: &[Vec<String>]) -> String {
    let mut out = format!("CSV file: {file_name}\n");
    let _ = writeln!(out, "Rows: {}, Columns: {}", rows.len(), headers.len());
    let _ = writeln!(out, "Columns: {}", headers.join(", "));

    out.push_str("\nColumn details:\n");
    for (i, header) in headers.iter().enumerate() {
        let values: Vec<&str> = rows
            .iter()
            .filter_map(|row| row.get(i))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .collect();

        match numeric_stats(&values) {
            Some(stats) => {
                let _ = writeln!(
                    out,
                    "  {} (numeric): min={}, max={}, mean={:.2}, median={:.2}",
                    header, stats.min, stats.max, stats.mean, stats.median
                );
            }
            None => {
                let _ = writeln!(out, "  {} (text): {} non-empty values", header, values.len());
            }
        }
    }

    let _ = writeln!(out, "\nFirst {} rows:", SAMPLE_ROWS.min(rows.len()));
    let _ = writeln!(out, "{}", headers.join(" | "));
    for row in rows.iter().take(SAMPLE_ROWS) {
        let _ = writeln!(out, "{}", row.join(" | "));
    }
    if rows.len() > SAMPLE_ROWS {
        let _ = writeln!(out, "(+{} more rows)", rows.len() - SAMPLE_ROWS);
    }

    out
}

struct NumericStats {
    min: f64,
    max: f64,
    mean: f64,
    median: f64,
}

/// Stats for a column whose every non-empty value parses as a number
fn numeric_stats(values: &[&str]) -> Option<NumericStats> {
    if values.is_empty() {
        return None;
    }

    let mut numbers = Vec::with_capacity(values.len());
    for value in values {
        numbers.push(value.parse::<f64>().ok()?);
    }
    numbers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let min = numbers[0];
    let max = numbers[numbers.len() - 1];
    let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
    let median = if numbers.len() % 2 == 0 {
        (numbers[numbers.len() / 2 - 1] + numbers[numbers.len() / 2]) / 2.0
    } else {
        numbers[numbers.len() / 2]
    };

    Some(NumericStats {
        min,
        max,
        mean,
        median,
    })
}
