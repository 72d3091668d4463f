use dioxus::prelude::*;
use tracing::warn;

use crate::report::export::{export_report, PdfLabels};
use crate::report::{local_now, Report};
use crate::t;

#[derive(Clone, Debug, PartialEq)]
enum ExportStatus {
    Idle,
    Working,
    Done(String),
    Error(String),
}

/// PDF labels in the active locale.
pub fn localized_pdf_labels() -> PdfLabels {
    PdfLabels {
        title: t!("pdf-title"),
        participant: t!("pdf-participant"),
        date: t!("pdf-date"),
        task: t!("pdf-task"),
        sessions: t!("pdf-sessions"),
        population: t!("report-column-population"),
        metric: t!("report-column-metric"),
        unit: t!("report-column-unit"),
        data_title: t!("pdf-data-title"),
        approximate_note: t!("report-approximate-note"),
        no_data: t!("chart-empty"),
    }
}

#[component]
pub fn ExportPanel(report: Report) -> Element {
    let mut status = use_signal(|| ExportStatus::Idle);
    let mut busy = use_signal(|| false);

    let feedback = match &status() {
        ExportStatus::Idle => None,
        ExportStatus::Working => Some((
            "dashboard-card__meta".to_string(),
            format!("{}…", t!("export-working")),
        )),
        ExportStatus::Done(message) => Some((
            "dashboard-card__meta dashboard-card__meta--success".to_string(),
            format!("✅ {message}"),
        )),
        ExportStatus::Error(err) => Some((
            "dashboard-card__meta dashboard-card__meta--error".to_string(),
            format!("⚠️ {err}"),
        )),
    };

    let pdf_handler = {
        let report = report.clone();
        move |_| {
            if busy() {
                return;
            }
            busy.set(true);
            status.set(ExportStatus::Working);
            let report = report.clone();
            let labels = localized_pdf_labels();
            spawn(async move {
                match export_report(&report, &labels, local_now()).await {
                    Ok(outcome) => {
                        let message = match outcome.saved_to {
                            Some(path) => t!("export-saved", path = path),
                            None => t!("export-downloaded", file = outcome.file_name),
                        };
                        status.set(ExportStatus::Done(message));
                    }
                    Err(err) => {
                        warn!(%err, "report export failed");
                        status.set(ExportStatus::Error(t!("export-failed", detail = err.to_string())));
                    }
                }
                busy.set(false);
            });
        }
    };

    rsx! {
        section { class: "dashboard-card export-panel",
            div { class: "dashboard-card__header",
                h2 { {t!("export-title")} }
            }
            p { {t!("export-description")} }
            div { class: "export-panel__actions",
                button {
                    r#type: "button",
                    class: "button button--primary",
                    disabled: busy() || report.rows.is_empty(),
                    onclick: pdf_handler,
                    {t!("export-pdf")}
                }
            }
            if let Some((class_name, message)) = feedback {
                p { class: "{class_name}", "{message}" }
            }
        }
    }
}
