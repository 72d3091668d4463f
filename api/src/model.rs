//! Typed records for calibration statistics and patient rows.
//!
//! Both endpoints answer with loosely shaped JSON. Everything is validated
//! here, once, so the dashboard only ever sees these types.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Keys of a patient row that describe the row rather than a session.
pub const METADATA_KEYS: [&str; 4] = ["metric", "units", "Task condition", "participant id"];

/// Population statistics for one metric under one task/timepoint context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    #[serde(rename = "name")]
    pub metric_name: String,
    #[serde(
        rename = "condition",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub task_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timepoint: Option<String>,
    #[serde(deserialize_with = "nullable_f64")]
    pub mean: f64,
    // Single-sample groups have no sample deviation; the backend sends null.
    #[serde(deserialize_with = "nullable_f64")]
    pub stdev: f64,
}

impl CalibrationRecord {
    pub fn new(metric_name: impl Into<String>, mean: f64, stdev: f64) -> Self {
        Self {
            metric_name: metric_name.into(),
            task_condition: None,
            timepoint: None,
            mean,
            stdev,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.task_condition = Some(condition.into());
        self
    }

    pub fn with_timepoint(mut self, timepoint: impl Into<String>) -> Self {
        self.timepoint = Some(timepoint.into());
        self
    }
}

fn nullable_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Metric name → PCA importance score.
pub type PcaSuggestions = BTreeMap<String, f64>;

/// Decoded `/normalise` response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalibrationBundle {
    pub records: Vec<CalibrationRecord>,
    pub pca_suggestions: Option<PcaSuggestions>,
}

/// A single session cell as it arrived from the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionValue {
    Numeric(f64),
    Unparsed(String),
}

impl SessionValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(number) => number
                .as_f64()
                .map(Self::Numeric)
                .unwrap_or_else(|| Self::Unparsed(number.to_string())),
            Value::String(text) => match text.trim().parse::<f64>() {
                Ok(parsed) if parsed.is_finite() => Self::Numeric(parsed),
                _ => Self::Unparsed(text.clone()),
            },
            Value::Null => Self::Unparsed(String::new()),
            other => Self::Unparsed(other.to_string()),
        }
    }
}

/// One metric under one task condition for a single patient, with one value
/// per measurement session ("Baseline", "PI-1", ...).
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRow {
    pub metric: String,
    pub units: String,
    pub task_condition: String,
    pub participant_id: String,
    pub sessions: BTreeMap<String, SessionValue>,
}

impl PatientRow {
    pub fn new(
        metric: impl Into<String>,
        units: impl Into<String>,
        task_condition: impl Into<String>,
        participant_id: impl Into<String>,
    ) -> Self {
        Self {
            metric: metric.into(),
            units: units.into(),
            task_condition: task_condition.into(),
            participant_id: participant_id.into(),
            sessions: BTreeMap::new(),
        }
    }

    pub fn with_session(mut self, label: impl Into<String>, value: f64) -> Self {
        self.sessions
            .insert(label.into(), SessionValue::Numeric(value));
        self
    }

    pub fn session(&self, label: &str) -> Option<&SessionValue> {
        self.sessions.get(label)
    }

    pub fn has_session(&self, label: &str) -> bool {
        self.sessions.contains_key(label)
    }
}

#[derive(Deserialize)]
struct RawPatientRow {
    metric: Value,
    #[serde(default)]
    units: Value,
    #[serde(rename = "Task condition", default)]
    task_condition: Value,
    #[serde(rename = "participant id", default)]
    participant_id: Value,
    #[serde(flatten)]
    sessions: BTreeMap<String, Value>,
}

impl RawPatientRow {
    fn into_row(self, index: usize) -> Result<PatientRow, ApiError> {
        let metric = text(&self.metric);
        if metric.trim().is_empty() {
            return Err(ApiError::format(format!("row {index} has no metric name")));
        }

        let sessions = self
            .sessions
            .iter()
            .filter(|(key, _)| !METADATA_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), SessionValue::from_json(value)))
            .collect();

        Ok(PatientRow {
            metric,
            units: text(&self.units),
            task_condition: text(&self.task_condition),
            participant_id: text(&self.participant_id),
            sessions,
        })
    }
}

/// Cell text with surrounding whitespace removed; the backend passes cells
/// through unstripped.
fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.trim().to_string(),
        other => other.to_string(),
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string())
}

/// Validate an `/upload` response body.
pub fn decode_patient_rows(value: Value) -> Result<Vec<PatientRow>, ApiError> {
    let Value::Array(items) = value else {
        return Err(ApiError::format("expected an array of patient rows"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<RawPatientRow>(item)
                .map_err(|err| ApiError::format(format!("row {index}: {err}")))
                .and_then(|raw| raw.into_row(index))
        })
        .collect()
}

/// Validate a `/normalise` response body.
pub fn decode_calibration(value: Value) -> Result<CalibrationBundle, ApiError> {
    let variables = value
        .get("normalization_data")
        .and_then(|data| data.get("variables"))
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::format("response is missing normalization_data.variables"))?;

    let records = variables
        .iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<CalibrationRecord>(item.clone())
                .map(|record| CalibrationRecord {
                    metric_name: record.metric_name.trim().to_string(),
                    task_condition: trimmed(record.task_condition),
                    timepoint: trimmed(record.timepoint),
                    ..record
                })
                .map_err(|err| ApiError::format(format!("variable {index}: {err}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let pca_suggestions = value
        .get("pca_suggestions")
        .and_then(Value::as_object)
        .map(|scores| {
            scores
                .iter()
                .filter_map(|(name, score)| score.as_f64().map(|s| (name.clone(), s)))
                .collect::<PcaSuggestions>()
        });

    Ok(CalibrationBundle {
        records,
        pca_suggestions,
    })
}
