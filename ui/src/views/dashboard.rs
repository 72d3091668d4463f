use dioxus::prelude::*;

use crate::components::{FilterBar, MetricPicker, RadarChartView, SessionPicker};
use crate::context::{prerequisite_message, use_dashboard, use_language_marker};
use crate::core::error::DashboardError;
use crate::report::{local_now, Report};
use crate::t;

#[component]
pub fn Dashboard() -> Element {
    let _lang = use_language_marker();
    let state = use_dashboard();
    let assembled = Report::assemble(&state.read(), local_now());

    let chart = match assembled {
        Ok(report) => {
            let invalid = report.invalid_scores();
            rsx! {
                RadarChartView { chart: report.radar.clone() }
                for (metric, session) in invalid.iter() {
                    p { class: "dashboard-card__meta dashboard-card__meta--error",
                        {t!("report-invalid-score", metric = metric.clone(), session = session.clone())}
                    }
                }
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
        section { class: "page page-dashboard",
            h1 { {t!("dashboard-title")} }
            FilterBar {}
            div { class: "dashboard__panels",
                div { class: "dashboard__controls",
                    MetricPicker {}
                    SessionPicker {}
                }
                section { class: "dashboard-card dashboard__chart",
                    div { class: "dashboard-card__header",
                        h2 { {t!("chart-title")} }
                    }
                    {chart}
                }
            }
        }
    }
}
