//! The dashboard's single store.
//!
//! `DashboardState` owns the two uploaded datasets, the PCA suggestions and
//! the user's selection. Every mutation goes through a named setter which
//! re-runs [`reconcile`], so the selection is valid for the current data
//! whenever a component reads it. Views share one instance through a
//! `Signal<DashboardState>` context.

use std::collections::BTreeSet;

use api::{CalibrationBundle, CalibrationRecord, PatientRow, PcaSuggestions};
use tracing::{debug, info};

use super::error::StorageError;
use super::filter::{condition_codes, RowFilter};
use super::metrics::{
    calibration_names, common_vars, patient_metric_names, prune_selection, ranked_suggestions,
};
use super::sessions::{self, reconcile_sessions, session_labels};
use super::storage::{self, SessionStore};
use super::tasks;

/// How many PCA suggestions get a badge in the metric selector.
pub const SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Normalized metric names.
    pub metrics: BTreeSet<String>,
    pub task: Option<String>,
    pub timepoint: Option<String>,
    pub condition: Option<String>,
    /// Compared sessions in click order.
    pub sessions: Vec<String>,
}

impl Selection {
    pub fn filter(&self) -> RowFilter<'_> {
        RowFilter::new(
            self.task.as_deref(),
            self.timepoint.as_deref(),
            self.condition.as_deref(),
        )
    }
}

/// Option lists derived from the data; recomputed together with the selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Derived {
    pub common_vars: Vec<String>,
    pub tasks: Vec<String>,
    pub session_labels: Vec<String>,
    pub conditions: Vec<String>,
    pub suggested: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileInputs<'a> {
    pub calibration: Option<&'a [CalibrationRecord]>,
    pub patient_rows: Option<&'a [PatientRow]>,
    pub pca_suggestions: Option<&'a PcaSuggestions>,
}

/// Bring `previous` in line with the data.
///
/// Order matters: timepoint and condition are validated first, tasks are
/// derived under those filters, metrics under all three. The session cap of
/// two only applies when `rows_changed`; otherwise stale sessions are dropped
/// and the rest keep their order.
pub fn reconcile(
    inputs: ReconcileInputs<'_>,
    previous: &Selection,
    rows_changed: bool,
) -> (Selection, Derived) {
    let rows = inputs.patient_rows.unwrap_or_default();
    let labels = session_labels(inputs.patient_rows);
    let conditions = condition_codes(rows);

    let timepoint = previous
        .timepoint
        .clone()
        .filter(|timepoint| labels.contains(timepoint));
    let condition = previous
        .condition
        .clone()
        .filter(|condition| conditions.contains(condition));

    let task_outcome = tasks::reconcile(
        inputs.calibration.is_some(),
        inputs.patient_rows,
        RowFilter::new(None, timepoint.as_deref(), condition.as_deref()),
        previous.task.as_deref(),
    );

    let filter = RowFilter::new(
        task_outcome.selected.as_deref(),
        timepoint.as_deref(),
        condition.as_deref(),
    );
    let common = common_vars(
        &calibration_names(inputs.calibration),
        &patient_metric_names(inputs.patient_rows, filter),
    );
    let mut metrics = previous.metrics.clone();
    let removed = prune_selection(&mut metrics, &common);
    if !removed.is_empty() {
        debug!(?removed, "pruned metrics that are no longer plottable");
    }

    let sessions = if rows_changed {
        reconcile_sessions(&labels, &previous.sessions)
    } else {
        previous
            .sessions
            .iter()
            .filter(|label| labels.contains(label))
            .cloned()
            .collect()
    };

    let suggested = inputs
        .pca_suggestions
        .map(|suggestions| ranked_suggestions(suggestions, &common, SUGGESTION_LIMIT))
        .unwrap_or_default();

    let selection = Selection {
        metrics,
        task: task_outcome.selected,
        timepoint,
        condition,
        sessions,
    };
    let derived = Derived {
        common_vars: common,
        tasks: task_outcome.tasks,
        session_labels: labels,
        conditions,
        suggested,
    };
    (selection, derived)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    calibration: Option<Vec<CalibrationRecord>>,
    pca_suggestions: Option<PcaSuggestions>,
    patient_rows: Option<Vec<PatientRow>>,
    selection: Selection,
    derived: Derived,
}

impl DashboardState {
    /// State seeded from whatever the session store kept across a reload.
    pub fn restore(store: &dyn SessionStore) -> Result<Self, StorageError> {
        let mut state = Self {
            calibration: storage::load_calibration(store)?,
            pca_suggestions: storage::load_pca_suggestions(store)?,
            ..Self::default()
        };
        if let Some(records) = &state.calibration {
            info!(records = records.len(), "restored calibration data");
        }
        state.refresh(false);
        Ok(state)
    }

    pub fn calibration(&self) -> Option<&[CalibrationRecord]> {
        self.calibration.as_deref()
    }

    pub fn pca_suggestions(&self) -> Option<&PcaSuggestions> {
        self.pca_suggestions.as_ref()
    }

    pub fn patient_rows(&self) -> Option<&[PatientRow]> {
        self.patient_rows.as_deref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn derived(&self) -> &Derived {
        &self.derived
    }

    pub fn inputs(&self) -> ReconcileInputs<'_> {
        ReconcileInputs {
            calibration: self.calibration(),
            patient_rows: self.patient_rows(),
            pca_suggestions: self.pca_suggestions(),
        }
    }

    /// Participant of the loaded patient file, if any.
    pub fn participant_id(&self) -> Option<&str> {
        self.patient_rows()?
            .iter()
            .map(|row| row.participant_id.trim())
            .find(|id| !id.is_empty())
    }

    /// Whether a metric carries a PCA suggestion badge.
    pub fn is_suggested(&self, metric: &str) -> bool {
        self.derived.suggested.iter().any(|name| name == metric)
    }

    /// Replace the calibration data wholesale and persist it. The in-memory
    /// state is updated even when persisting fails.
    pub fn set_calibration(
        &mut self,
        bundle: CalibrationBundle,
        store: &dyn SessionStore,
    ) -> Result<(), StorageError> {
        info!(
            records = bundle.records.len(),
            suggestions = bundle.pca_suggestions.as_ref().map_or(0, |s| s.len()),
            "calibration data replaced"
        );
        self.calibration = (!bundle.records.is_empty()).then_some(bundle.records);
        self.pca_suggestions = bundle.pca_suggestions.filter(|s| !s.is_empty());
        self.refresh(false);

        storage::persist_calibration(store, self.calibration().unwrap_or_default())?;
        storage::persist_pca_suggestions(store, self.pca_suggestions())
    }

    pub fn clear_calibration(&mut self, store: &dyn SessionStore) -> Result<(), StorageError> {
        self.set_calibration(CalibrationBundle::default(), store)
    }

    pub fn set_patient_rows(&mut self, rows: Vec<PatientRow>) {
        info!(rows = rows.len(), "patient data replaced");
        self.patient_rows = Some(rows);
        self.refresh(true);
    }

    pub fn select_task(&mut self, task: Option<String>) {
        self.selection.task = task;
        self.refresh(false);
    }

    pub fn select_timepoint(&mut self, timepoint: Option<String>) {
        self.selection.timepoint = timepoint;
        self.refresh(false);
    }

    pub fn select_condition(&mut self, condition: Option<String>) {
        self.selection.condition = condition;
        self.refresh(false);
    }

    /// Add or remove a metric. Only plottable metrics can be added.
    pub fn toggle_metric(&mut self, metric: &str) {
        if !self.selection.metrics.remove(metric)
            && self.derived.common_vars.iter().any(|name| name == metric)
        {
            self.selection.metrics.insert(metric.to_string());
        }
    }

    /// Replace the metric selection with the badged PCA suggestions.
    pub fn select_suggested(&mut self) {
        self.selection.metrics = self.derived.suggested.iter().cloned().collect();
    }

    pub fn clear_metrics(&mut self) {
        self.selection.metrics.clear();
    }

    /// Whether toggling `label` would be accepted, without touching the
    /// selection. Removing is always allowed; adding stops at the cap.
    pub fn accepts_session_toggle(&self, label: &str) -> bool {
        sessions::toggle_session(&self.selection.sessions, label).is_some()
    }

    /// Toggle a compared session. Returns `false` when the click was rejected
    /// because four sessions are already selected.
    pub fn toggle_session(&mut self, label: &str) -> bool {
        let current = self.selection.sessions.clone();
        let applied = sessions::apply_toggle(&current, label, |next| {
            self.selection.sessions = next;
        });
        if !applied {
            debug!(label, "session toggle rejected at the cap");
        }
        applied
    }

    fn refresh(&mut self, rows_changed: bool) {
        let (selection, derived) = reconcile(self.inputs(), &self.selection, rows_changed);
        self.selection = selection;
        self.derived = derived;
    }
}
