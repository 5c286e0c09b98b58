//! Error types for the slot math engine

use thiserror::Error;

/// Errors raised while loading a game or playing a round
#[derive(Debug, Error)]
pub enum SlotError {
    #[error("Missing required symbol: {0}")]
    MissingSymbol(String),

    #[error("Duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("Unknown symbol '{symbol}' referenced by {context}")]
    UnknownSymbol { symbol: String, context: String },

    #[error("Invalid line {line}: {reason}")]
    InvalidLine { line: u16, reason: String },

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Weight table '{0}' has no positive weight")]
    EmptyWeights(String),

    #[error("Unknown reel set: {0}")]
    UnknownReelSet(String),

    #[error("Unknown game mode: {0}")]
    UnknownMode(String),

    #[error("Unknown criteria: {0}")]
    UnknownCriteria(String),

    #[error("No free spin table for spin type {0}")]
    MissingFreeSpinTable(String),

    #[error("Unsatisfiable constraint: {scenario} found no valid board after {attempts} attempts")]
    UnsatisfiableConstraint { scenario: String, attempts: u32 },

    #[error("Reel generation failed: {0}")]
    ReelGeneration(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Book error: {0}")]
    Book(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for SlotError {
    fn from(e: serde_json::Error) -> Self {
        SlotError::Parse(format!("JSON: {e}"))
    }
}

impl From<serde_yml::Error> for SlotError {
    fn from(e: serde_yml::Error) -> Self {
        SlotError::Parse(format!("YAML: {e}"))
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, SlotError>;
