use dioxus::prelude::*;

use crate::components::{ExportPanel, RadarChartView, ReportTable};
use crate::context::{prerequisite_message, use_dashboard, use_language_marker};
use crate::core::error::DashboardError;
use crate::core::format::MISSING;
use crate::report::{local_now, Report};
use crate::t;

#[component]
pub fn ReportView() -> Element {
    let _lang = use_language_marker();
    let state = use_dashboard();
    let assembled = Report::assemble(&state.read(), local_now());

    let body = match assembled {
        Ok(report) => {
            let participant = report.header.participant_id.clone();
            let date = report.header.date.clone();
            let task = report.header.task.clone().unwrap_or_else(|| MISSING.to_string());
            let sessions = report.header.sessions.join(", ");
            rsx! {
                dl { class: "report__summary",
                    dt { {t!("pdf-participant")} }
                    dd { "{participant}" }
                    dt { {t!("pdf-date")} }
                    dd { "{date}" }
                    dt { {t!("pdf-task")} }
                    dd { "{task}" }
                    dt { {t!("pdf-sessions")} }
                    dd { "{sessions}" }
                }
                div { class: "dashboard__panels",
                    section { class: "dashboard-card",
                        RadarChartView { chart: report.radar.clone() }
                    }
                    ExportPanel { report: report.clone() }
                }
                ReportTable { report }
            }
        }
        Err(DashboardError::MissingPrerequisite(missing)) => rsx! {
            p { class: "dashboard-card__placeholder", {prerequisite_message(missing)} }
        },
        Err(err) => rsx! {
            p { class: "dashboard-card__meta dashboard-card__meta--error", "{err}" }
        },
    };

    rsx! {
        section { class: "page page-report",
            h1 { {t!("report-title")} }
            {body}
        }
    }
}
