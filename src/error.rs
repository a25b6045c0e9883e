//! Crate-level errors.

use thiserror::Error;

use crate::validation::ValidationError;

/// Why a checked simulation could not run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// The requested policy name is not recognized.
    #[error("unknown scheduling algorithm: {0}")]
    UnknownAlgorithm(String),
    /// The processes or options failed validation.
    #[error("invalid simulation input: {}", summarize(.0))]
    InvalidInput(Vec<ValidationError>),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
