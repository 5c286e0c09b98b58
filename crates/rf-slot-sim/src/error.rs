//! Simulator errors

use rf_slot_math::SlotError;
use thiserror::Error;

/// Errors raised by a simulation run
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error("Criteria '{criteria}' not met for round {round} after {attempts} attempts")]
    CriteriaNotMet {
        criteria: String,
        round: u64,
        attempts: u32,
    },

    #[error("Invalid simulation settings: {0}")]
    Settings(String),

    #[error("Thread pool: {0}")]
    ThreadPool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
