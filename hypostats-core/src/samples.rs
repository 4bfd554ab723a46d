//! Turning uploaded CSV text into numeric samples.
//!
//! One sample means one value per row; two samples means two columns. Empty
//! cells in ragged rows are treated as missing. A first row in which no cell
//! starts like a number is taken as a header. Anything else that is not a finite number is
//! rejected with its row and column.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{CoreError, FieldErrors, Result};

const FIELD: &str = "csvData";

/// Parse `csv_data` into `sample_count` columns of observations.
pub fn parse_samples(csv_data: &str, sample_count: usize) -> Result<Vec<Vec<f64>>> {
    if sample_count != 1 && sample_count != 2 {
        return Err(CoreError::validation("numSamples", "must be 1 or 2"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());

    let mut samples = vec![Vec::new(); sample_count];
    let mut errors = FieldErrors::new();
    let mut seen_data_row = false;

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| CoreError::validation(FIELD, format!("unreadable CSV: {}", e)))?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 1);

        let cells: Vec<(usize, &str)> = record
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_empty())
            .collect();
        if cells.is_empty() {
            continue;
        }

        if !seen_data_row && header_like(&cells) {
            seen_data_row = true;
            continue;
        }
        seen_data_row = true;

        if sample_count == 1 && cells.len() > 1 {
            errors.push(
                FIELD,
                format!("row {}: expected a single value, found {}", line, cells.len()),
            );
            continue;
        }

        for &(column, cell) in &cells {
            let target = if sample_count == 1 { 0 } else { column };
            if target >= sample_count {
                errors.push(
                    FIELD,
                    format!(
                        "row {}: unexpected value in column {}, only {} columns expected",
                        line,
                        column + 1,
                        sample_count
                    ),
                );
                continue;
            }

            match parse_cell(cell) {
                Some(value) => samples[target].push(value),
                None => errors.push(
                    FIELD,
                    format!(
                        "row {}, column {}: '{}' is not a finite number",
                        line,
                        column + 1,
                        cell
                    ),
                ),
            }
        }
    }

    for (index, sample) in samples.iter().enumerate() {
        if sample.is_empty() {
            errors.push(
                FIELD,
                format!("sample {} contains no numeric values", index + 1),
            );
        }
    }

    errors.into_result()?;
    Ok(samples)
}

/// Build CSV text from free-form value lists such as `"1, 2 3\n4"`.
///
/// Values are split on commas and whitespace. With two lists the shorter
/// one leaves its column empty on the trailing rows.
pub fn values_to_csv(sample1: &str, sample2: Option<&str>) -> String {
    let first = split_values(sample1);
    match sample2 {
        None => first.join("\n"),
        Some(second) => {
            let second = split_values(second);
            let rows = first.len().max(second.len());
            (0..rows)
                .map(|i| {
                    format!(
                        "{},{}",
                        first.get(i).copied().unwrap_or_default(),
                        second.get(i).copied().unwrap_or_default()
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

fn split_values(input: &str) -> Vec<&str> {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    let separator = SEPARATOR.get_or_init(|| Regex::new(r"[,\s]+").expect("valid separator pattern"));
    separator
        .split(input)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect()
}

fn parse_cell(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A header row has no cell starting with a digit, sign or decimal point,
/// so a mistyped first value like `1O` is reported instead of skipped.
fn header_like(cells: &[(usize, &str)]) -> bool {
    cells
        .iter()
        .all(|(_, cell)| !cell.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '.')))
}
