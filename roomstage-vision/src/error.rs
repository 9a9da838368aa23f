//! Error types for roomstage-vision

use roomstage_core::Error as CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Oracle returned an empty result: {0}")]
    OracleEmptyResult(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("No eligible segment for product: {0}")]
    NoEligibleMatch(String),

    #[error("Empty mask: no object found at the given point(s)")]
    EmptyMask,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, StagingError>;

impl StagingError {
    /// Whether a mask-resolution tier may recover from this error by
    /// falling through to the next tier
    pub fn is_tier_recoverable(&self) -> bool {
        matches!(
            self,
            StagingError::OracleUnavailable(_)
                | StagingError::OracleEmptyResult(_)
                | StagingError::InvalidGeometry(_)
        )
    }
}
