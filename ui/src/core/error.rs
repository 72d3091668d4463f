//! Error types surfaced by the dashboard.
//!
//! None of these are fatal: every failure ends up as a status message next to
//! the control that triggered it and the dashboard state is left untouched.

use api::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    /// Upload or normalisation request failed (transport, server or format).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An action needs data that has not been loaded or picked yet.
    #[error("{0}")]
    MissingPrerequisite(Prerequisite),

    #[error("Could not persist dashboard data: {0}")]
    Storage(#[from] StorageError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

/// Upstream data an action depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    Calibration,
    PatientData,
    Metrics,
    Sessions,
}

impl std::fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::Calibration => "Upload calibration data first",
            Self::PatientData => "Upload a patient file first",
            Self::Metrics => "Select at least one metric",
            Self::Sessions => "Select at least one session",
        };
        f.write_str(message)
    }
}

impl DashboardError {
    /// Format failures get their own wording in the UI.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Api(err) if err.is_format())
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("session storage is unavailable")]
    Unavailable,

    #[error("storage rejected key {key}: {message}")]
    Backend { key: String, message: String },

    #[error("stored value under {key} is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode value for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("nothing to export: {0}")]
    Empty(String),

    #[error("could not render the PDF: {0}")]
    Render(String),

    #[error("browser download failed: {0}")]
    Download(String),

    #[error("could not resolve an export directory")]
    NoExportDir,

    #[error("could not write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
