use dioxus::prelude::*;

use crate::components::{UploadCard, UploadKind};
use crate::context::{use_dashboard, use_language_marker};
use crate::t;

#[component]
pub fn Home() -> Element {
    // Re-render on locale change.
    let _lang = use_language_marker();
    let state = use_dashboard();
    let ready = {
        let snapshot = state.read();
        snapshot.calibration().is_some() && snapshot.patient_rows().is_some()
    };

    rsx! {
        section { class: "page page-home",
            h1 { {t!("home-title")} }
            p { {t!("home-intro")} }

            ol { class: "page-home__steps",
                li { {t!("home-step-calibration")} }
                li { {t!("home-step-patient")} }
                li { {t!("home-step-explore")} }
            }

            div { class: "dashboard__panels",
                UploadCard { kind: UploadKind::Calibration }
                UploadCard { kind: UploadKind::Patient }
            }

            if ready {
                p { class: "page-home__cta", {t!("home-ready")} }
            }
        }
    }
}
