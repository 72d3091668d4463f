//! Context plumbing shared by every view: the dashboard store and the API
//! client. Launchers call [`provide_dashboard`] once in their root component.

use api::{ApiError, GaitApi};
use dioxus::prelude::*;
use tracing::{info, warn};

use crate::core::error::Prerequisite;
use crate::core::state::DashboardState;
use crate::core::storage::session_store;
use crate::t;

/// Install the dashboard store (restored from session storage) and the API
/// client as context for the routed subtree.
pub fn provide_dashboard() -> Signal<DashboardState> {
    let state = use_signal(|| match DashboardState::restore(session_store()) {
        Ok(state) => state,
        Err(err) => {
            warn!(%err, "discarding unreadable session data");
            DashboardState::default()
        }
    });
    use_context_provider(|| state);
    use_context_provider(|| {
        let api = GaitApi::from_env();
        info!(backend = ?api.config().backend, "api client configured");
        api
    });
    state
}

pub fn use_dashboard() -> Signal<DashboardState> {
    use_context::<Signal<DashboardState>>()
}

pub fn use_api() -> GaitApi {
    use_context::<GaitApi>()
}

/// Subscribe to the platform's language signal, if one was provided, so the
/// caller re-renders when the locale changes.
pub fn use_language_marker() -> String {
    try_use_context::<Signal<String>>()
        .map(|code| code())
        .unwrap_or_else(|| "en-US".to_string())
}

pub fn api_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Format(detail) => t!("error-invalid-format", detail = detail.clone()),
        ApiError::Transport(detail) => t!("error-upload-failed", detail = detail.clone()),
        ApiError::Server { message, .. } => t!("error-upload-failed", detail = message.clone()),
    }
}

pub fn prerequisite_message(missing: Prerequisite) -> String {
    match missing {
        Prerequisite::Calibration => t!("prerequisite-calibration"),
        Prerequisite::PatientData => t!("prerequisite-patient"),
        Prerequisite::Metrics => t!("prerequisite-metrics"),
        Prerequisite::Sessions => t!("prerequisite-sessions"),
    }
}
