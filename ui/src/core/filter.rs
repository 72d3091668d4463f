//! Row filters shared by the reconcilers and the report.

use api::local::standardize_condition;
use api::PatientRow;

/// Task conditions compare without surrounding whitespace.
pub fn same_task(row_task: &str, task: &str) -> bool {
    row_task.trim() == task.trim()
}

/// Current task/timepoint/condition narrowing of the patient rows.
///
/// `task` matches a row's trimmed task condition, `condition` matches its
/// standardized code (ST/HT/DT) and `timepoint` requires the row to carry a
/// value under that session label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowFilter<'a> {
    pub task: Option<&'a str>,
    pub timepoint: Option<&'a str>,
    pub condition: Option<&'a str>,
}

impl<'a> RowFilter<'a> {
    pub fn new(task: Option<&'a str>, timepoint: Option<&'a str>, condition: Option<&'a str>) -> Self {
        Self {
            task,
            timepoint,
            condition,
        }
    }

    /// Same filter with the task constraint dropped (used to list tasks).
    pub fn without_task(self) -> Self {
        Self { task: None, ..self }
    }

    pub fn matches(&self, row: &PatientRow) -> bool {
        if let Some(task) = self.task {
            if !same_task(&row.task_condition, task) {
                return false;
            }
        }
        if let Some(timepoint) = self.timepoint {
            if !row.has_session(timepoint) {
                return false;
            }
        }
        if let Some(condition) = self.condition {
            if standardize_condition(&row.task_condition) != condition {
                return false;
            }
        }
        true
    }

    pub fn apply<'r>(self, rows: &'r [PatientRow]) -> impl Iterator<Item = &'r PatientRow> + 'r
    where
        'a: 'r,
    {
        rows.iter().filter(move |row| self.matches(row))
    }
}

/// Distinct standardized condition codes, in order of first appearance.
pub fn condition_codes(rows: &[PatientRow]) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for row in rows {
        if row.task_condition.trim().is_empty() {
            continue;
        }
        let code = standardize_condition(&row.task_condition);
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}
