use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("TLE directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Invalid elements for {satellite}: {message}")]
    InvalidElements { satellite: String, message: String },
    #[error("Invalid observer: {0}")]
    InvalidObserver(String),
    #[error("Invalid time window: {start} is not before {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("Time window starting {start} with length {length} leaves the supported date range")]
    WindowOutOfRange {
        start: DateTime<Utc>,
        length: chrono::Duration,
    },
    #[error("Invalid scan step: {0}")]
    InvalidStep(String),
    #[error("Scan cancelled")]
    Cancelled,
    #[error("No satellites loaded")]
    NoSatellites,
}

impl PredictError {
    pub(crate) fn invalid_elements(satellite: impl Into<String>, message: impl ToString) -> Self {
        PredictError::InvalidElements {
            satellite: satellite.into(),
            message: message.to_string(),
        }
    }
}
