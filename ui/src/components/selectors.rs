//! Filter, metric and session pickers. All of them write through the
//! dashboard setters so the selection stays reconciled.

use dioxus::prelude::*;

use crate::context::use_dashboard;
use crate::core::format::display_metric_name;
use crate::core::sessions::MAX_COMPARED_SESSIONS;
use crate::t;

fn optional(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

#[component]
pub fn FilterBar() -> Element {
    let mut state = use_dashboard();
    let (selection, derived) = {
        let snapshot = state.read();
        (snapshot.selection().clone(), snapshot.derived().clone())
    };

    let task = selection.task.clone().unwrap_or_default();
    let timepoint = selection.timepoint.clone().unwrap_or_default();
    let condition = selection.condition.clone().unwrap_or_default();

    rsx! {
        section { class: "dashboard-card filter-bar",
            div { class: "filter-bar__field",
                label { r#for: "filter-task", {t!("filter-task")} }
                select {
                    id: "filter-task",
                    disabled: derived.tasks.is_empty(),
                    onchange: move |evt: FormEvent| state.write().select_task(optional(evt.value())),
                    if derived.tasks.is_empty() {
                        option { value: "", {t!("filter-task-none")} }
                    }
                    for name in derived.tasks.iter() {
                        option {
                            key: "{name}",
                            value: "{name}",
                            selected: *name == task,
                            "{name}"
                        }
                    }
                }
            }
            div { class: "filter-bar__field",
                label { r#for: "filter-timepoint", {t!("filter-timepoint")} }
                select {
                    id: "filter-timepoint",
                    onchange: move |evt: FormEvent| state.write().select_timepoint(optional(evt.value())),
                    option { value: "", selected: timepoint.is_empty(), {t!("filter-all")} }
                    for label in derived.session_labels.iter() {
                        option {
                            key: "{label}",
                            value: "{label}",
                            selected: *label == timepoint,
                            "{label}"
                        }
                    }
                }
            }
            div { class: "filter-bar__field",
                label { r#for: "filter-condition", {t!("filter-condition")} }
                select {
                    id: "filter-condition",
                    onchange: move |evt: FormEvent| state.write().select_condition(optional(evt.value())),
                    option { value: "", selected: condition.is_empty(), {t!("filter-all")} }
                    for code in derived.conditions.iter() {
                        option {
                            key: "{code}",
                            value: "{code}",
                            selected: *code == condition,
                            "{code}"
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn MetricPicker() -> Element {
    let mut state = use_dashboard();
    let (selection, derived) = {
        let snapshot = state.read();
        (snapshot.selection().clone(), snapshot.derived().clone())
    };
    let selected_count = selection.metrics.len();
    let has_suggestions = !derived.suggested.is_empty();

    rsx! {
        section { class: "dashboard-card metric-picker",
            div { class: "dashboard-card__header",
                h2 { {t!("metrics-title")} }
                span { class: "dashboard-card__meta",
                    {t!("metrics-selected", count = selected_count)}
                }
            }

            if derived.common_vars.is_empty() {
                p { class: "dashboard-card__placeholder", {t!("metrics-none-available")} }
            } else {
                div { class: "metric-picker__actions",
                    if has_suggestions {
                        button {
                            r#type: "button",
                            class: "button button--accent",
                            onclick: move |_| state.write().select_suggested(),
                            {t!("metrics-use-suggestions")}
                        }
                    }
                    button {
                        r#type: "button",
                        class: "button button--ghost",
                        disabled: selected_count == 0,
                        onclick: move |_| state.write().clear_metrics(),
                        {t!("metrics-clear")}
                    }
                }
                ul { class: "metric-picker__list",
                    for metric in derived.common_vars.iter().cloned() {
                        li {
                            key: "{metric}",
                            class: "metric-picker__item",
                            label {
                                input {
                                    r#type: "checkbox",
                                    checked: selection.metrics.contains(&metric),
                                    onchange: {
                                        let metric = metric.clone();
                                        move |_| state.write().toggle_metric(&metric)
                                    },
                                }
                                span { class: "metric-picker__name", {display_metric_name(&metric)} }
                                if state.read().is_suggested(&metric) {
                                    span {
                                        class: "metric-picker__badge",
                                        title: t!("metrics-suggested-title"),
                                        {t!("metrics-suggested")}
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn SessionPicker() -> Element {
    let mut state = use_dashboard();
    let mut at_cap = use_signal(|| false);
    let (selected, labels) = {
        let snapshot = state.read();
        (
            snapshot.selection().sessions.clone(),
            snapshot.derived().session_labels.clone(),
        )
    };

    rsx! {
        section { class: "dashboard-card session-picker",
            div { class: "dashboard-card__header",
                h2 { {t!("sessions-title")} }
                span { class: "dashboard-card__meta",
                    {t!("sessions-selected", count = selected.len(), max = MAX_COMPARED_SESSIONS)}
                }
            }

            if labels.is_empty() {
                p { class: "dashboard-card__placeholder", {t!("sessions-none-available")} }
            } else {
                div { class: "session-picker__chips",
                    for label in labels.iter().cloned() {
                        button {
                            key: "{label}",
                            r#type: "button",
                            class: if selected.contains(&label) { "session-chip session-chip--active" } else { "session-chip" },
                            aria_pressed: selected.contains(&label),
                            onclick: {
                                let label = label.clone();
                                move |_| {
                                    // A rejected click must not mark the state dirty.
                                    let accepted = state.read().accepts_session_toggle(&label);
                                    if accepted {
                                        state.write().toggle_session(&label);
                                    }
                                    at_cap.set(!accepted);
                                }
                            },
                            "{label}"
                        }
                    }
                }
                if at_cap() {
                    p { class: "dashboard-card__meta dashboard-card__meta--error",
                        {t!("sessions-cap-reached", max = MAX_COMPARED_SESSIONS)}
                    }
                }
            }
        }
    }
}
