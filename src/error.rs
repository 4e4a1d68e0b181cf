//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    /// A one-shot daemon step (`key create`, `sphere create`, ...) failed.
    #[error("`orb {step}` failed: {detail}")]
    Step { step: String, detail: String },

    #[error("launch error: {0}")]
    Launch(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn step(step: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Step {
            step: step.into(),
            detail: detail.into(),
        }
    }
}
