//! Report assembly: the selected metrics × selected sessions, scored against
//! the baseline population, plus the radar series drawn from the same scores.
//!
//! The dashboard table, the on-screen radar and the PDF all read from one
//! [`Report`], so what is exported is exactly what was shown.

pub mod export;
pub mod pdf;
pub mod radar;

use api::{CalibrationRecord, PatientRow, SessionValue};
use time::macros::format_description;
use time::OffsetDateTime;

use crate::core::error::{DashboardError, Prerequisite};
use crate::core::format::{display_metric_name, format_number, format_z, MISSING};
use crate::core::metrics::normalize_metric_name;
use crate::core::state::{DashboardState, Selection};
use crate::core::zscore::{resolve_baseline, score};

pub use radar::RadarChart;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportHeader {
    pub participant_id: String,
    pub date: String,
    pub task: Option<String>,
    pub sessions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// `z` is `None` when no calibration record matches the metric.
    Score { raw: f64, z: Option<f64> },
    Unparsed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportCell {
    pub session: String,
    pub value: CellValue,
}

impl ReportCell {
    pub fn z(&self) -> Option<f64> {
        match self.value {
            CellValue::Score { z, .. } => z,
            CellValue::Unparsed => None,
        }
    }

    /// `0.90 (z 1.00)`, `0.90` without a baseline or a usable z, `-` when
    /// unparsed.
    pub fn display(&self) -> String {
        match self.value {
            CellValue::Score { raw, z: Some(z) } if !z.is_finite() => format_number(raw, 2),
            CellValue::Score { raw, z: Some(z) } => {
                format!("{} (z {})", format_number(raw, 2), format_z(z))
            }
            CellValue::Score { raw, z: None } => format_number(raw, 2),
            CellValue::Unparsed => MISSING.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub metric: String,
    pub label: String,
    pub units: String,
    pub population_mean: Option<f64>,
    /// Scored against a task-agnostic record.
    pub approximate: bool,
    pub cells: Vec<ReportCell>,
}

impl ReportRow {
    pub fn cell(&self, session: &str) -> Option<&ReportCell> {
        self.cells.iter().find(|cell| cell.session == session)
    }

    pub fn population_display(&self) -> String {
        self.population_mean
            .map_or_else(|| MISSING.to_string(), |mean| format_number(mean, 2))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub header: ReportHeader,
    pub rows: Vec<ReportRow>,
    pub radar: RadarChart,
}

impl Report {
    /// Assemble the report for the current selection, or say what is missing.
    pub fn assemble(state: &DashboardState, generated: OffsetDateTime) -> Result<Self, DashboardError> {
        let calibration = state
            .calibration()
            .ok_or(DashboardError::MissingPrerequisite(Prerequisite::Calibration))?;
        let rows = state
            .patient_rows()
            .ok_or(DashboardError::MissingPrerequisite(Prerequisite::PatientData))?;
        let selection = state.selection();
        if selection.metrics.is_empty() {
            return Err(DashboardError::MissingPrerequisite(Prerequisite::Metrics));
        }
        if selection.sessions.is_empty() {
            return Err(DashboardError::MissingPrerequisite(Prerequisite::Sessions));
        }

        let report_rows = assemble_rows(Some(calibration), rows, selection);
        let radar = RadarChart::build(&report_rows, &selection.sessions);
        let header = ReportHeader {
            participant_id: state.participant_id().unwrap_or_default().to_string(),
            date: report_date(generated),
            task: selection.task.clone(),
            sessions: selection.sessions.clone(),
        };
        Ok(Self {
            header,
            rows: report_rows,
            radar,
        })
    }

    /// `(metric label, session)` pairs whose z-score is not a finite number,
    /// typically a zero standard deviation in the calibration data.
    pub fn invalid_scores(&self) -> Vec<(String, String)> {
        self.rows
            .iter()
            .flat_map(|row| {
                row.cells
                    .iter()
                    .filter(|cell| cell.z().is_some_and(|z| !z.is_finite()))
                    .map(|cell| (row.label.clone(), cell.session.clone()))
            })
            .collect()
    }
}

/// Wall-clock time in the local offset, for report dates and file names.
/// Falls back to UTC where the offset cannot be determined.
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn report_date(generated: OffsetDateTime) -> String {
    generated
        .format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

/// One row per selected metric that the filtered patient data carries, one
/// cell per selected session that row has a value for.
pub fn assemble_rows(
    calibration: Option<&[CalibrationRecord]>,
    rows: &[PatientRow],
    selection: &Selection,
) -> Vec<ReportRow> {
    let task = selection.task.as_deref();
    let filter = selection.filter();

    selection
        .metrics
        .iter()
        .filter_map(|metric| {
            let row = filter
                .apply(rows)
                .find(|row| normalize_metric_name(&row.metric) == *metric)?;
            let baseline = resolve_baseline(metric, calibration, task);

            let cells = selection
                .sessions
                .iter()
                .filter_map(|session| {
                    let value = match row.session(session)? {
                        SessionValue::Numeric(raw) => CellValue::Score {
                            raw: *raw,
                            z: score(metric, *raw, calibration, task).map(|z| z.value),
                        },
                        SessionValue::Unparsed(_) => CellValue::Unparsed,
                    };
                    Some(ReportCell {
                        session: session.clone(),
                        value,
                    })
                })
                .collect();

            Some(ReportRow {
                metric: metric.clone(),
                label: display_metric_name(metric),
                units: row.units.clone(),
                population_mean: baseline.map(|b| b.record.mean),
                approximate: baseline.is_some_and(|b| b.approximate),
                cells,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::round2;
    use crate::core::storage::MemoryStore;
    use api::CalibrationBundle;
    use time::macros::datetime;

    fn calibration() -> Vec<CalibrationRecord> {
        vec![
            CalibrationRecord::new("Average Speed", 0.6, 0.3)
                .with_condition("ST")
                .with_timepoint("Baseline"),
            CalibrationRecord::new("Cadence", 100.0, 0.0)
                .with_condition("ST")
                .with_timepoint("Baseline"),
        ]
    }

    fn patient() -> Vec<PatientRow> {
        let mut cadence = PatientRow::new("Cadence", "steps/min", "ST", "P07")
            .with_session("Baseline", 104.0);
        cadence
            .sessions
            .insert("PI-1".to_string(), SessionValue::Unparsed("n/a".to_string()));
        vec![
            PatientRow::new("Average Speed", "m/s", "ST", "P07")
                .with_session("Baseline", 0.9)
                .with_session("PI-2", 0.7),
            cadence,
        ]
    }

    fn selection(metrics: &[&str], sessions: &[&str]) -> Selection {
        Selection {
            metrics: metrics.iter().map(|s| s.to_string()).collect(),
            task: Some("ST".to_string()),
            sessions: sessions.iter().map(|s| s.to_string()).collect(),
            ..Selection::default()
        }
    }

    #[test]
    fn cells_carry_raw_value_and_z_score() {
        let records = calibration();
        let rows = assemble_rows(
            Some(records.as_slice()),
            &patient(),
            &selection(&["Average_Speed"], &["Baseline"]),
        );
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.label, "Average Speed");
        assert_eq!(row.units, "m/s");
        assert_eq!(row.population_display(), "0.60");
        let cell = row.cell("Baseline").unwrap();
        assert_eq!(cell.z().map(round2), Some(1.0));
        assert_eq!(cell.display(), "0.90 (z 1.00)");
    }

    #[test]
    fn missing_sessions_are_skipped_not_synthesized() {
        let records = calibration();
        let rows = assemble_rows(
            Some(records.as_slice()),
            &patient(),
            &selection(&["Average_Speed"], &["Baseline", "PI-1", "PI-2"]),
        );
        let sessions: Vec<&str> = rows[0].cells.iter().map(|c| c.session.as_str()).collect();
        assert_eq!(sessions, vec!["Baseline", "PI-2"]);
    }

    #[test]
    fn unparsed_values_show_the_sentinel_without_z() {
        let records = calibration();
        let rows = assemble_rows(
            Some(records.as_slice()),
            &patient(),
            &selection(&["Cadence"], &["PI-1"]),
        );
        let cell = rows[0].cell("PI-1").unwrap();
        assert_eq!(cell.value, CellValue::Unparsed);
        assert_eq!(cell.display(), "-");
        assert_eq!(cell.z(), None);
    }

    #[test]
    fn undefined_z_scores_show_the_raw_value_only() {
        let cell = ReportCell {
            session: "Baseline".to_string(),
            value: CellValue::Score {
                raw: 110.0,
                z: Some(f64::NAN),
            },
        };
        assert_eq!(cell.display(), "110.00");

        let cell = ReportCell {
            value: CellValue::Score {
                raw: 110.0,
                z: Some(f64::INFINITY),
            },
            ..cell
        };
        assert_eq!(cell.display(), "110.00");
    }

    #[test]
    fn local_now_is_the_current_instant() {
        let before = OffsetDateTime::now_utc();
        let now = local_now();
        let after = OffsetDateTime::now_utc();
        assert!(before <= now && now <= after);
        assert_eq!(report_date(now).len(), "2024-03-05".len());
    }

    #[test]
    fn metrics_without_baseline_keep_raw_values() {
        let rows = assemble_rows(
            None,
            &patient(),
            &selection(&["Average_Speed"], &["Baseline"]),
        );
        assert_eq!(rows[0].population_mean, None);
        assert_eq!(rows[0].cell("Baseline").unwrap().display(), "0.90");
    }

    #[test]
    fn assemble_reports_missing_prerequisites() {
        let at = datetime!(2024-03-05 14:30:00 UTC);
        let state = DashboardState::default();
        assert!(matches!(
            Report::assemble(&state, at),
            Err(DashboardError::MissingPrerequisite(Prerequisite::Calibration))
        ));

        let store = MemoryStore::new();
        let mut state = DashboardState::default();
        state
            .set_calibration(
                CalibrationBundle {
                    records: calibration(),
                    pca_suggestions: None,
                },
                &store,
            )
            .unwrap();
        assert!(matches!(
            Report::assemble(&state, at),
            Err(DashboardError::MissingPrerequisite(Prerequisite::PatientData))
        ));

        state.set_patient_rows(patient());
        assert!(matches!(
            Report::assemble(&state, at),
            Err(DashboardError::MissingPrerequisite(Prerequisite::Metrics))
        ));
    }

    #[test]
    fn assembled_report_flags_zero_stdev_scores() {
        let store = MemoryStore::new();
        let mut state = DashboardState::default();
        state
            .set_calibration(
                CalibrationBundle {
                    records: calibration(),
                    pca_suggestions: None,
                },
                &store,
            )
            .unwrap();
        state.set_patient_rows(patient());
        state.toggle_metric("Cadence");
        state.toggle_metric("Average_Speed");

        let report = Report::assemble(&state, datetime!(2024-03-05 14:30:00 UTC)).unwrap();
        assert_eq!(report.header.participant_id, "P07");
        assert_eq!(report.header.date, "2024-03-05");
        assert_eq!(report.header.task.as_deref(), Some("ST"));
        assert_eq!(report.header.sessions, vec!["Baseline"]);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(
            report.invalid_scores(),
            vec![("Cadence".to_string(), "Baseline".to_string())]
        );
    }
}
