//! Client for the `/upload` and `/normalise` endpoints.

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{ApiConfig, Backend};
use crate::error::ApiError;
use crate::local;
use crate::model::{decode_calibration, decode_patient_rows, CalibrationBundle, PatientRow};

const UPLOAD_PATH: &str = "upload";
const NORMALISE_PATH: &str = "normalise";

#[derive(Debug, Clone, Default)]
pub struct GaitApi {
    config: ApiConfig,
    http: reqwest::Client,
}

impl GaitApi {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Send a single patient CSV and get its wide-format rows back.
    pub async fn upload_patient_csv(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<PatientRow>, ApiError> {
        let rows = match &self.config.backend {
            Backend::Local => local::format_patient_csv(&bytes)?,
            Backend::Remote(_) => {
                let body = self.post_csv(UPLOAD_PATH, file_name, bytes).await?;
                decode_patient_rows(body)?
            }
        };
        info!(file = file_name, rows = rows.len(), "patient csv processed");
        Ok(rows)
    }

    /// Send a population CSV and get calibration statistics back.
    pub async fn normalise_calibration_csv(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<CalibrationBundle, ApiError> {
        let bundle = match &self.config.backend {
            Backend::Local => local::normalise_calibration_csv(&bytes)?,
            Backend::Remote(_) => {
                let body = self.post_csv(NORMALISE_PATH, file_name, bytes).await?;
                decode_calibration(body)?
            }
        };
        if bundle.pca_suggestions.is_none() {
            warn!(file = file_name, "calibration processed without PCA suggestions");
        }
        info!(
            file = file_name,
            records = bundle.records.len(),
            "calibration csv processed"
        );
        Ok(bundle)
    }

    async fn post_csv(&self, path: &str, file_name: &str, bytes: Vec<u8>) -> Result<Value, ApiError> {
        let url = self
            .config
            .endpoint(path)
            .ok_or_else(|| ApiError::transport("no backend configured"))?;
        debug!(%url, bytes = bytes.len(), "posting csv");

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(ApiError::transport)?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::transport)?;
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "backend rejected csv");
            return Err(ApiError::server(status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|err| ApiError::format(format!("response is not valid JSON ({err})")))
    }
}
