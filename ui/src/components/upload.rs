use dioxus::prelude::*;
use tracing::{info, warn};

use crate::context::{api_error_message, use_api, use_dashboard};
use crate::core::storage::session_store;
use crate::t;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Calibration,
    Patient,
}

#[derive(Clone, Debug, PartialEq)]
enum UploadStatus {
    Idle,
    Processing,
    Done(String),
    Error(String),
}

/// File picker for one of the two CSV inputs. A new pick while an upload is
/// in flight is ignored.
#[component]
pub fn UploadCard(kind: UploadKind) -> Element {
    let mut state = use_dashboard();
    let api = use_api();
    let mut status = use_signal(|| UploadStatus::Idle);
    let mut busy = use_signal(|| false);

    let on_file = move |evt: FormEvent| {
        if busy() {
            return;
        }
        let Some(engine) = evt.files() else {
            return;
        };
        let Some(name) = engine.files().into_iter().next() else {
            return;
        };
        busy.set(true);
        status.set(UploadStatus::Processing);
        let api = api.clone();

        spawn(async move {
            let outcome = match engine.read_file(&name).await {
                None => Err(t!("error-read-file", name = name.clone())),
                Some(bytes) => match kind {
                    UploadKind::Calibration => api
                        .normalise_calibration_csv(&name, bytes)
                        .await
                        .map(|bundle| {
                            let count = bundle.records.len();
                            if let Err(err) = state.write().set_calibration(bundle, session_store()) {
                                warn!(%err, "calibration kept in memory only");
                            }
                            t!("upload-calibration-done", count = count)
                        })
                        .map_err(|err| api_error_message(&err)),
                    UploadKind::Patient => api
                        .upload_patient_csv(&name, bytes)
                        .await
                        .map(|rows| {
                            let count = rows.len();
                            state.write().set_patient_rows(rows);
                            t!("upload-patient-done", count = count)
                        })
                        .map_err(|err| api_error_message(&err)),
                },
            };
            match outcome {
                Ok(message) => status.set(UploadStatus::Done(message)),
                Err(message) => {
                    warn!(file = %name, %message, "upload rejected");
                    status.set(UploadStatus::Error(message));
                }
            }
            busy.set(false);
        });
    };

    let on_clear = move |_| {
        if busy() {
            return;
        }
        if let Err(err) = state.write().clear_calibration(session_store()) {
            warn!(%err, "could not clear stored calibration");
        }
        info!("calibration cleared");
        status.set(UploadStatus::Idle);
    };

    let (title, hint, loaded) = {
        let snapshot = state.read();
        match kind {
            UploadKind::Calibration => (
                t!("upload-calibration-title"),
                t!("upload-calibration-hint"),
                snapshot
                    .calibration()
                    .map(|records| t!("upload-calibration-loaded", count = records.len())),
            ),
            UploadKind::Patient => (
                t!("upload-patient-title"),
                t!("upload-patient-hint"),
                snapshot.patient_rows().map(|rows| {
                    t!(
                        "upload-patient-loaded",
                        count = rows.len(),
                        participant = snapshot.participant_id().unwrap_or("-").to_string()
                    )
                }),
            ),
        }
    };

    let feedback = match &status() {
        UploadStatus::Idle => None,
        UploadStatus::Processing => Some((
            "dashboard-card__meta".to_string(),
            format!("{}…", t!("status-processing")),
        )),
        UploadStatus::Done(message) => Some((
            "dashboard-card__meta dashboard-card__meta--success".to_string(),
            format!("✅ {message}"),
        )),
        UploadStatus::Error(err) => Some((
            "dashboard-card__meta dashboard-card__meta--error".to_string(),
            format!("⚠️ {err}"),
        )),
    };

    let picker_class = if busy() {
        "button button--primary upload-card__picker upload-card__picker--busy"
    } else {
        "button button--primary upload-card__picker"
    };
    let input_id = match kind {
        UploadKind::Calibration => "upload-calibration",
        UploadKind::Patient => "upload-patient",
    };
    let can_clear = kind == UploadKind::Calibration && loaded.is_some();

    rsx! {
        section { class: "dashboard-card upload-card",
            div { class: "dashboard-card__header",
                h2 { "{title}" }
                if let Some(summary) = loaded {
                    span { class: "dashboard-card__meta", "{summary}" }
                }
            }
            p { class: "dashboard-card__placeholder", "{hint}" }

            div { class: "upload-card__actions",
                label { class: "{picker_class}", r#for: "{input_id}",
                    {t!("upload-choose-file")}
                }
                input {
                    id: "{input_id}",
                    class: "visually-hidden",
                    r#type: "file",
                    accept: ".csv,text/csv",
                    disabled: busy(),
                    onchange: on_file,
                }
                if can_clear {
                    button {
                        r#type: "button",
                        class: "button button--ghost",
                        disabled: busy(),
                        onclick: on_clear,
                        {t!("upload-calibration-clear")}
                    }
                }
            }

            if let Some((class_name, message)) = feedback {
                p { class: "{class_name}", "{message}" }
            }
        }
    }
}
