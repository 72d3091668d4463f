//! Metric reconciliation: which metrics can be plotted right now.
//!
//! A metric is plottable when the calibration data knows it *and* the
//! filtered patient rows carry it. Names are compared after collapsing
//! whitespace runs to a single underscore; case matters.

use std::collections::BTreeSet;

use api::{CalibrationRecord, PatientRow, PcaSuggestions};

use super::filter::RowFilter;

/// Identity form of a metric name: trimmed, whitespace runs → `_`.
pub fn normalize_metric_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join("_")
}

pub fn calibration_names(records: Option<&[CalibrationRecord]>) -> BTreeSet<String> {
    records
        .unwrap_or_default()
        .iter()
        .map(|record| normalize_metric_name(&record.metric_name))
        .filter(|name| !name.is_empty())
        .collect()
}

pub fn patient_metric_names(rows: Option<&[PatientRow]>, filter: RowFilter<'_>) -> BTreeSet<String> {
    filter
        .apply(rows.unwrap_or_default())
        .map(|row| normalize_metric_name(&row.metric))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Sorted intersection of the two name sets.
pub fn common_vars(calibration: &BTreeSet<String>, csv: &BTreeSet<String>) -> Vec<String> {
    calibration.intersection(csv).cloned().collect()
}

/// Drop selected metrics that are no longer plottable. Returns what was removed.
pub fn prune_selection(selected: &mut BTreeSet<String>, common: &[String]) -> Vec<String> {
    let stale: Vec<String> = selected
        .iter()
        .filter(|name| common.binary_search(name).is_err())
        .cloned()
        .collect();
    for name in &stale {
        selected.remove(name);
    }
    stale
}

/// Plottable metrics ranked by PCA importance, best first.
pub fn ranked_suggestions(suggestions: &PcaSuggestions, common: &[String], limit: usize) -> Vec<String> {
    let mut ranked: Vec<(String, f64)> = suggestions
        .iter()
        .map(|(name, score)| (normalize_metric_name(name), *score))
        .filter(|(name, score)| score.is_finite() && common.binary_search(name).is_ok())
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut seen = BTreeSet::new();
    ranked
        .into_iter()
        .filter(|(name, _)| seen.insert(name.clone()))
        .take(limit)
        .map(|(name, _)| name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn whitespace_runs_collapse_to_one_underscore() {
        assert_eq!(normalize_metric_name("Stride  Length"), "Stride_Length");
        assert_eq!(normalize_metric_name(" Step\tWidth "), "Step_Width");
        assert_eq!(normalize_metric_name("velocity"), "velocity");
    }

    #[test]
    fn common_vars_is_the_sorted_intersection() {
        let calibration = names(&["Stride_Length", "Step_Width", "Velocity"]);
        let csv = names(&["Stride_Length", "Step_Width", "HeartRate"]);
        assert_eq!(
            common_vars(&calibration, &csv),
            vec!["Step_Width", "Stride_Length"]
        );
        assert_eq!(common_vars(&csv, &calibration), common_vars(&calibration, &csv));
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let calibration = names(&["Velocity"]);
        let csv = names(&["velocity"]);
        assert!(common_vars(&calibration, &csv).is_empty());
    }

    #[test]
    fn missing_inputs_give_no_variables() {
        assert!(calibration_names(None).is_empty());
        assert!(patient_metric_names(None, RowFilter::default()).is_empty());
    }

    #[test]
    fn names_are_collected_from_both_sources() {
        let records = vec![
            CalibrationRecord::new("Average Speed", 1.0, 0.2),
            CalibrationRecord::new("Average Speed", 1.1, 0.2).with_condition("DT"),
        ];
        let rows = vec![
            PatientRow::new("Average  Speed", "m/s", "ST", "P1"),
            PatientRow::new("Cadence", "steps/min", "DT", "P1"),
        ];
        assert_eq!(calibration_names(Some(records.as_slice())), names(&["Average_Speed"]));
        assert_eq!(
            patient_metric_names(Some(rows.as_slice()), RowFilter::new(Some("ST"), None, None)),
            names(&["Average_Speed"])
        );
    }

    #[test]
    fn pruning_removes_stale_metrics_and_is_idempotent() {
        let common = vec!["Step_Width".to_string(), "Stride_Length".to_string()];
        let mut selected = names(&["Velocity", "Step_Width"]);

        let removed = prune_selection(&mut selected, &common);
        assert_eq!(removed, vec!["Velocity"]);
        assert_eq!(selected, names(&["Step_Width"]));

        let removed = prune_selection(&mut selected, &common);
        assert!(removed.is_empty());
        assert_eq!(selected, names(&["Step_Width"]));
    }

    #[test]
    fn suggestions_rank_only_plottable_metrics() {
        let common = vec!["Cadence".to_string(), "Step_Width".to_string(), "Stride_Length".to_string()];
        let suggestions: PcaSuggestions = [
            ("Stride Length".to_string(), 0.8),
            ("Cadence".to_string(), 0.3),
            ("HeartRate".to_string(), 0.9),
            ("Step Width".to_string(), 0.5),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            ranked_suggestions(&suggestions, &common, 2),
            vec!["Stride_Length", "Step_Width"]
        );
    }
}
