//! Task reconciliation: which walking tasks can be picked, and which one is.

use api::PatientRow;

use super::filter::RowFilter;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskReconciliation {
    pub tasks: Vec<String>,
    pub selected: Option<String>,
}

/// Distinct non-empty task conditions among rows passing the
/// timepoint/condition filter, in order of first appearance.
pub fn available_tasks(rows: &[PatientRow], filter: RowFilter<'_>) -> Vec<String> {
    let mut tasks: Vec<String> = Vec::new();
    for row in filter.without_task().apply(rows) {
        let task = row.task_condition.trim();
        if task.is_empty() || tasks.iter().any(|known| known == task) {
            continue;
        }
        tasks.push(task.to_string());
    }
    tasks
}

/// Keep the current task while it is still offered, otherwise fall back to the
/// first offered task (or nothing).
pub fn reconcile_task(tasks: &[String], current: Option<&str>) -> Option<String> {
    match current {
        Some(task) if tasks.iter().any(|known| known == task) => Some(task.to_string()),
        _ => tasks.first().cloned(),
    }
}

/// Task availability is gated on calibration data: without a baseline there
/// is nothing to score a task against.
pub fn reconcile(
    calibration_loaded: bool,
    rows: Option<&[PatientRow]>,
    filter: RowFilter<'_>,
    current: Option<&str>,
) -> TaskReconciliation {
    if !calibration_loaded {
        return TaskReconciliation::default();
    }
    let tasks = available_tasks(rows.unwrap_or_default(), filter);
    let selected = reconcile_task(&tasks, current);
    TaskReconciliation { tasks, selected }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<PatientRow> {
        vec![
            PatientRow::new("Speed", "m/s", "HT", "P1").with_session("Baseline", 1.0),
            PatientRow::new("Speed", "m/s", "ST", "P1")
                .with_session("Baseline", 1.1)
                .with_session("PI-1", 1.0),
            PatientRow::new("Cadence", "steps/min", "HT", "P1").with_session("PI-1", 98.0),
            PatientRow::new("Cadence", "steps/min", "  ", "P1").with_session("PI-1", 98.0),
        ]
    }

    #[test]
    fn tasks_keep_first_occurrence_order() {
        let rows = rows();
        assert_eq!(available_tasks(&rows, RowFilter::default()), vec!["HT", "ST"]);
    }

    #[test]
    fn tasks_respect_timepoint_filter_but_ignore_task_filter() {
        let rows = rows();
        let filter = RowFilter::new(Some("ST"), Some("PI-1"), None);
        assert_eq!(available_tasks(&rows, filter), vec!["ST", "HT"]);
    }

    #[test]
    fn first_task_is_selected_when_none_is() {
        let outcome = reconcile(true, Some(rows().as_slice()), RowFilter::default(), None);
        assert_eq!(outcome.selected.as_deref(), Some("HT"));
    }

    #[test]
    fn valid_selection_is_kept() {
        let outcome = reconcile(true, Some(rows().as_slice()), RowFilter::default(), Some("ST"));
        assert_eq!(outcome.selected.as_deref(), Some("ST"));
    }

    #[test]
    fn vanished_selection_is_replaced_or_cleared() {
        let rows = rows();
        let outcome = reconcile(true, Some(rows.as_slice()), RowFilter::default(), Some("DT"));
        assert_eq!(outcome.selected.as_deref(), Some("HT"));

        let outcome = reconcile(true, Some(&rows[..0]), RowFilter::default(), Some("DT"));
        assert!(outcome.tasks.is_empty());
        assert_eq!(outcome.selected, None);
    }

    #[test]
    fn missing_calibration_clears_everything() {
        let outcome = reconcile(false, Some(rows().as_slice()), RowFilter::default(), Some("ST"));
        assert_eq!(outcome, TaskReconciliation::default());
    }
}
