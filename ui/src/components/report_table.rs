use dioxus::prelude::*;

use crate::core::format::MISSING;
use crate::report::Report;
use crate::t;

struct TableRow {
    metric: String,
    label: String,
    units: String,
    population: String,
    approximate: bool,
    cells: Vec<(String, String)>,
}

#[component]
pub fn ReportTable(report: Report) -> Element {
    let sessions = report.header.sessions.clone();
    let any_approximate = report.rows.iter().any(|row| row.approximate);
    let invalid = report.invalid_scores();
    let rows: Vec<TableRow> = report
        .rows
        .iter()
        .map(|row| TableRow {
            metric: row.metric.clone(),
            label: row.label.clone(),
            units: row.units.clone(),
            population: row.population_display(),
            approximate: row.approximate,
            cells: sessions
                .iter()
                .map(|session| {
                    let text = row
                        .cell(session)
                        .map(|cell| cell.display())
                        .unwrap_or_else(|| MISSING.to_string());
                    (session.clone(), text)
                })
                .collect(),
        })
        .collect();

    rsx! {
        section { class: "dashboard-card report-table",
            div { class: "dashboard-card__header",
                h2 { {t!("report-table-title")} }
                if let Some(task) = report.header.task.clone() {
                    span { class: "dashboard-card__meta", {t!("report-task", task = task)} }
                }
            }
            table { class: "report-table__grid",
                thead {
                    tr {
                        th { {t!("report-column-metric")} }
                        th { {t!("report-column-unit")} }
                        th { {t!("report-column-population")} }
                        for session in sessions.iter() {
                            th { key: "{session}", "{session}" }
                        }
                    }
                }
                tbody {
                    for TableRow { metric, label, units, population, approximate, cells } in rows.iter() {
                        tr { key: "{metric}",
                            th { class: "report-table__metric", scope: "row",
                                "{label}"
                                if *approximate {
                                    span {
                                        class: "report-table__approx",
                                        title: t!("report-approximate-title"),
                                        "*"
                                    }
                                }
                            }
                            td { class: "report-table__unit", "{units}" }
                            td { "{population}" }
                            for (session, text) in cells.iter() {
                                td { key: "{session}", "{text}" }
                            }
                        }
                    }
                }
            }
            if any_approximate {
                p { class: "dashboard-card__meta", {t!("report-approximate-note")} }
            }
            for (metric, session) in invalid.iter() {
                p { class: "dashboard-card__meta dashboard-card__meta--error",
                    {t!("report-invalid-score", metric = metric.clone(), session = session.clone())}
                }
            }
        }
    }
}
