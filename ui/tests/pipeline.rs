//! Upload to PDF without a backend: both CSVs go through the in-process
//! formatter, the dashboard state picks defaults, and the assembled report
//! renders to a PDF.

use api::local::{format_patient_csv, normalise_calibration_csv};
use time::macros::datetime;
use ui::core::error::{DashboardError, Prerequisite};
use ui::core::state::DashboardState;
use ui::core::storage::{MemoryStore, SessionStore, CALIBRATION_KEY};
use ui::report::export::{render_pdf, report_file_name, PdfLabels};
use ui::report::radar::PointKind;
use ui::report::Report;

const PATIENT_CSV: &str = "\
Participant ID,Timepoint,Walk Task Condition,Average Speed,Cadence
,,,m/s,steps/min
P-07,Baseline,ST,1.20,112
P-07,PI-1,ST,0.95,104
P-07,Baseline,DT,1.05,
P-07,PI-1,DT,,99
";

const CALIBRATION_CSV: &str = "\
Participant ID,Timepoint,Walk Task Condition,Average Speed,Cadence
1,Baseline,Single Task,1.0,100
2,Baseline,single task,1.4,110
3,Baseline,DT,0.9,90
";

fn loaded(store: &MemoryStore) -> DashboardState {
    let bundle = normalise_calibration_csv(CALIBRATION_CSV.as_bytes()).unwrap();
    let rows = format_patient_csv(PATIENT_CSV.as_bytes()).unwrap();

    let mut state = DashboardState::default();
    state.set_calibration(bundle, store).unwrap();
    state.set_patient_rows(rows);
    state
}

#[test]
fn uploads_populate_dashboard_defaults() {
    let store = MemoryStore::new();
    let state = loaded(&store);

    assert_eq!(state.participant_id(), Some("P-07"));
    assert_eq!(state.derived().tasks, vec!["ST", "DT"]);
    assert_eq!(state.selection().task.as_deref(), Some("ST"));
    assert_eq!(state.derived().session_labels, vec!["Baseline", "PI-1"]);
    assert_eq!(state.selection().sessions, vec!["Baseline"]);
    assert_eq!(state.derived().common_vars, vec!["Average_Speed", "Cadence"]);
    assert!(store.get(CALIBRATION_KEY).unwrap().is_some());
}

#[test]
fn report_waits_for_metrics_and_sessions() {
    let store = MemoryStore::new();
    let mut state = loaded(&store);
    let now = datetime!(2026-03-14 09:30:00 UTC);

    let err = Report::assemble(&state, now).unwrap_err();
    assert!(matches!(
        err,
        DashboardError::MissingPrerequisite(Prerequisite::Metrics)
    ));

    state.toggle_metric("Cadence");
    assert!(state.toggle_session("Baseline"));
    assert!(state.selection().sessions.is_empty());
    let err = Report::assemble(&state, now).unwrap_err();
    assert!(matches!(
        err,
        DashboardError::MissingPrerequisite(Prerequisite::Sessions)
    ));
}

#[test]
fn single_task_report_scores_against_baseline_population() {
    let store = MemoryStore::new();
    let mut state = loaded(&store);
    state.toggle_metric("Average_Speed");
    state.toggle_metric("Cadence");
    assert!(state.toggle_session("PI-1"));

    let report = Report::assemble(&state, datetime!(2026-03-14 09:30:00 UTC)).unwrap();
    assert_eq!(report.header.participant_id, "P-07");
    assert_eq!(report.header.date, "2026-03-14");
    assert_eq!(report.header.task.as_deref(), Some("ST"));
    assert_eq!(report.header.sessions, vec!["Baseline", "PI-1"]);
    assert_eq!(report.rows.len(), 2);
    assert!(report.invalid_scores().is_empty());

    let speed = &report.rows[0];
    assert_eq!(speed.units, "m/s");
    assert!(!speed.approximate);
    assert!((speed.population_mean.unwrap() - 1.2).abs() < 1e-9);
    assert!(speed.cell("Baseline").unwrap().z().unwrap().abs() < 1e-9);
    let pi1 = speed.cell("PI-1").unwrap().z().unwrap();
    assert!((pi1 - -0.883_883_476_483_184_4).abs() < 1e-9);

    let cadence = &report.rows[1];
    let baseline = cadence.cell("Baseline").unwrap().z().unwrap();
    assert!((baseline - 0.989_949_493_661_166_5).abs() < 1e-9);

    assert_eq!(report.radar.axes.len(), 2);
    assert_eq!(report.radar.series.len(), 2);
    assert!(report
        .radar
        .series
        .iter()
        .flat_map(|series| series.points.iter())
        .all(|point| point.kind == PointKind::Normal));
}

#[test]
fn single_sample_calibration_is_reported_as_invalid() {
    let store = MemoryStore::new();
    let mut state = loaded(&store);
    state.toggle_metric("Average_Speed");
    state.toggle_metric("Cadence");
    assert!(state.toggle_session("PI-1"));
    state.select_task(Some("DT".to_string()));
    assert_eq!(state.selection().metrics.len(), 2);

    // One DT participant in the calibration: no sample deviation.
    let report = Report::assemble(&state, datetime!(2026-03-14 09:30:00 UTC)).unwrap();
    assert_eq!(report.invalid_scores().len(), 2);
}

#[test]
fn assembled_report_renders_to_pdf() {
    let store = MemoryStore::new();
    let mut state = loaded(&store);
    state.select_suggested();
    state.toggle_metric("Average_Speed");
    assert!(state.toggle_session("PI-1"));

    let report = Report::assemble(&state, datetime!(2026-03-14 09:30:00 UTC)).unwrap();
    let bytes = render_pdf(&report, &PdfLabels::default()).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));

    let name = report_file_name(
        &report.header.participant_id,
        datetime!(2026-03-14 09:30:05 UTC),
    );
    assert_eq!(name, "GaitReport_P-07_20260314_093005.pdf");
}

#[test]
fn calibration_survives_restore_but_patient_data_does_not() {
    let store = MemoryStore::new();
    let state = loaded(&store);

    let restored = DashboardState::restore(&store).unwrap();
    assert_eq!(restored.calibration(), state.calibration());
    assert!(restored.patient_rows().is_none());
    assert!(restored.selection().sessions.is_empty());
}
