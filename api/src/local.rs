//! In-process formatter and normaliser.
//!
//! Mirrors what the backend does for `/upload` and `/normalise` so the app can
//! run without a server. PCA importance is never computed here.

use std::collections::BTreeMap;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::ApiError;
use crate::model::{CalibrationBundle, CalibrationRecord, PatientRow, SessionValue};

struct Table {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Table {
    fn read(bytes: &[u8]) -> Result<Self, ApiError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|err| ApiError::format(format!("unreadable CSV header ({err})")))?
            .iter()
            .map(str::to_string)
            .collect();

        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| ApiError::format(format!("unreadable CSV row ({err})")))?;

        Ok(Self { headers, rows })
    }

    fn column_containing(&self, needle: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.to_lowercase().contains(needle))
    }

    fn cell<'a>(&self, row: &'a StringRecord, column: usize) -> &'a str {
        row.get(column).unwrap_or_default()
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Pivot a long-format patient CSV (one row per timepoint × task) into one
/// wide row per metric × task with a column per timepoint.
pub fn format_patient_csv(bytes: &[u8]) -> Result<Vec<PatientRow>, ApiError> {
    let table = Table::read(bytes)?;
    if table.rows.is_empty() {
        return Ok(Vec::new());
    }

    let timepoint_col = table
        .column_containing("timepoint")
        .ok_or_else(|| ApiError::format("patient CSV has no timepoint column"))?;
    let task_col = table.column_containing("condition");
    let participant_col = table.column_containing("participant");

    let units_row = table
        .rows
        .iter()
        .find(|row| table.cell(row, timepoint_col).is_empty());
    let measured: Vec<&StringRecord> = table
        .rows
        .iter()
        .filter(|row| {
            let timepoint = table.cell(row, timepoint_col);
            !timepoint.is_empty() && timepoint != "Units"
        })
        .collect();

    let metric_cols = table
        .headers
        .iter()
        .enumerate()
        .filter(|(index, header)| {
            !header.is_empty()
                && *index != timepoint_col
                && Some(*index) != task_col
                && Some(*index) != participant_col
        });

    let mut formatted = Vec::new();
    for (column, metric) in metric_cols {
        let units = units_row
            .map(|row| table.cell(row, column).to_string())
            .unwrap_or_default();

        // Insertion-ordered groups keyed by task condition.
        let mut grouped: Vec<PatientRow> = Vec::new();
        for row in &measured {
            let Some(value) = parse_number(table.cell(row, column)) else {
                continue;
            };
            let task = task_col
                .map(|col| table.cell(row, col).to_string())
                .unwrap_or_default();
            let timepoint = table.cell(row, timepoint_col).to_string();

            let position = match grouped.iter().position(|g| g.task_condition == task) {
                Some(position) => position,
                None => {
                    let participant = participant_col
                        .map(|col| table.cell(row, col).to_string())
                        .unwrap_or_default();
                    grouped.push(PatientRow::new(metric.clone(), units.clone(), task, participant));
                    grouped.len() - 1
                }
            };
            grouped[position]
                .sessions
                .insert(timepoint, SessionValue::Numeric(value));
        }
        formatted.extend(grouped);
    }

    debug!(rows = formatted.len(), "formatted patient csv locally");
    Ok(formatted)
}

/// Map free-text walk task names onto ST / HT / DT.
pub fn standardize_condition(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_lowercase();
    let upper = trimmed.to_uppercase();

    if lower.contains("single task") || upper == "ST" {
        "ST".to_string()
    } else if lower.contains("head turn") || upper == "HT" {
        "HT".to_string()
    } else if lower.contains("dual task") || upper == "DT" {
        "DT".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Collapse post-injury spellings ("Post Injury 2", "pi2") onto `PI-<n>`.
pub fn standardize_timepoint(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_lowercase();

    if lower.contains("post injury") || lower.contains("pi") {
        let digits: String = trimmed
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(char::is_ascii_digit)
            .collect();
        if !digits.is_empty() {
            return format!("PI-{digits}");
        }
    }

    trimmed.to_string()
}

fn is_identifier_column(header: &str) -> bool {
    let lower = header.to_lowercase();
    lower.contains("participant") || lower.ends_with("id") || lower.starts_with("id")
}

/// Population mean and sample standard deviation per metric, grouped by
/// standardized timepoint and condition.
pub fn normalise_calibration_csv(bytes: &[u8]) -> Result<CalibrationBundle, ApiError> {
    let table = Table::read(bytes)?;

    let timepoint_col = table
        .column_containing("timepoint")
        .ok_or_else(|| ApiError::format("Could not find a column containing 'timepoint'"))?;
    let condition_col = table
        .column_containing("condition")
        .ok_or_else(|| ApiError::format("Could not find a column containing 'condition'"))?;

    let numeric_cols: Vec<(usize, &String)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(index, header)| {
            *index != timepoint_col
                && *index != condition_col
                && !header.is_empty()
                && !is_identifier_column(header)
        })
        .collect();

    let mut groups: BTreeMap<(String, String), Vec<&StringRecord>> = BTreeMap::new();
    for row in &table.rows {
        let timepoint = standardize_timepoint(table.cell(row, timepoint_col));
        let condition = standardize_condition(table.cell(row, condition_col));
        if timepoint.is_empty() || condition.is_empty() {
            continue;
        }
        groups.entry((timepoint, condition)).or_default().push(row);
    }

    let mut records = Vec::new();
    for ((timepoint, condition), rows) in &groups {
        for (column, name) in &numeric_cols {
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|row| parse_number(table.cell(row, *column)))
                .collect();
            if values.is_empty() {
                continue;
            }
            records.push(CalibrationRecord {
                metric_name: (*name).clone(),
                task_condition: Some(condition.clone()),
                timepoint: Some(timepoint.clone()),
                mean: mean(&values),
                stdev: sample_std_dev(&values),
            });
        }
    }

    debug!(records = records.len(), "normalised calibration csv locally");
    Ok(CalibrationBundle {
        records,
        pca_suggestions: None,
    })
}

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

fn sample_std_dev(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = mean(data);
    let variance = data
        .iter()
        .map(|value| {
            let diff = value - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n as f64 - 1.0);
    variance.sqrt()
}
