use crate::core::load_power::InvalidLoadInputError;
use crate::core::transformer::SelectionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrafoError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Error identified during sizing calculation: {0}")]
    FailureInCalculation(#[from] CalculationError),
    #[error("Error while writing output: {0}")]
    ErrorInOutput(OutputError),
}

/// The validation failures the calculation itself can report. Neither is recoverable: the
/// batch is abandoned and no partial result is produced.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CalculationError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidLoadInputError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct OutputError {
    error: anyhow::Error,
}

impl OutputError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}
