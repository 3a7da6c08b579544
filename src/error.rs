use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaffeineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid time label '{label}': {reason}")]
    InvalidTimeLabel { label: String, reason: String },

    #[error("Invalid dosing schedule: {0}")]
    InvalidDosing(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Parameter validation error: {0}")]
    Validation(String),

    #[error("Chart rendering error: {0}")]
    Render(#[from] std::fmt::Error),
}

impl CaffeineError {
    pub(crate) fn time_label(label: &str, reason: impl Into<String>) -> Self {
        CaffeineError::InvalidTimeLabel {
            label: label.to_string(),
            reason: reason.into(),
        }
    }
}

pub type CaffeineResult<T> = Result<T, CaffeineError>;
