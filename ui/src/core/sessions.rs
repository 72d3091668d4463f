//! Compared-session reconciliation and the toggle contract.
//!
//! Two caps apply: when new patient data arrives at most
//! [`MAX_RETAINED_ON_RELOAD`] previous picks survive, while a user may toggle
//! up to [`MAX_COMPARED_SESSIONS`] sessions on.

use api::model::METADATA_KEYS;
use api::PatientRow;

pub const MAX_COMPARED_SESSIONS: usize = 4;
pub const MAX_RETAINED_ON_RELOAD: usize = 2;

/// Sorted session labels, taken from the first row's columns.
pub fn session_labels(rows: Option<&[PatientRow]>) -> Vec<String> {
    let Some(first) = rows.and_then(|rows| rows.first()) else {
        return Vec::new();
    };
    let mut labels: Vec<String> = first
        .sessions
        .keys()
        .filter(|key| !METADATA_KEYS.contains(&key.as_str()))
        .cloned()
        .collect();
    labels.sort();
    labels
}

/// Selection after the patient data changed.
pub fn reconcile_sessions(labels: &[String], previous: &[String]) -> Vec<String> {
    let mut kept: Vec<String> = previous
        .iter()
        .filter(|label| labels.contains(label))
        .take(MAX_RETAINED_ON_RELOAD)
        .cloned()
        .collect();
    if kept.is_empty() {
        if let Some(first) = labels.first() {
            kept.push(first.clone());
        }
    }
    kept
}

/// Selection after clicking `label`, or `None` when the click changes nothing
/// (an unselected label while already at the cap).
pub fn toggle_session(current: &[String], label: &str) -> Option<Vec<String>> {
    if current.iter().any(|selected| selected == label) {
        return Some(
            current
                .iter()
                .filter(|selected| selected.as_str() != label)
                .cloned()
                .collect(),
        );
    }
    if current.len() >= MAX_COMPARED_SESSIONS {
        return None;
    }
    let mut next = current.to_vec();
    next.push(label.to_string());
    Some(next)
}

/// Toggle and hand the new selection to `on_change`. The callback is not
/// invoked when the click is rejected. Returns whether it was invoked.
pub fn apply_toggle(current: &[String], label: &str, on_change: impl FnOnce(Vec<String>)) -> bool {
    match toggle_session(current, label) {
        Some(next) => {
            on_change(next);
            true
        }
        None => false,
    }
}
