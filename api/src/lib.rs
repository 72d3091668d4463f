//! Backend contract for GaitVision.
//!
//! Two endpoints feed the dashboard: `/upload` turns a patient CSV into wide
//! per-metric rows and `/normalise` turns a population CSV into calibration
//! statistics (plus optional PCA importance scores). This crate owns the typed
//! records both endpoints produce, the HTTP client that talks to them and an
//! in-process fallback that performs the same formatting/normalisation
//! without a server.

pub mod client;
pub mod config;
pub mod error;
pub mod local;
pub mod model;

pub use client::GaitApi;
pub use config::{ApiConfig, Backend};
pub use error::ApiError;
pub use model::{CalibrationBundle, CalibrationRecord, PatientRow, PcaSuggestions, SessionValue};
