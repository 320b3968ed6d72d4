use thiserror::Error;

use crate::form::payload::SubmissionError;
use crate::form::stage::Stage;
use crate::form::state::Field;

/// Failures raised while driving the donation workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("A donation submission is already in progress")]
    SubmissionInFlight,
    #[error("Field `{field}` cannot be edited on the {stage} stage")]
    FieldNotInStage { field: Field, stage: Stage },
    #[error("{stage} stage has {count} invalid field(s)")]
    StageInvalid { stage: Stage, count: usize },
    #[error("Submission is only available on the confirmation stage (currently on {0})")]
    NotAtConfirmation(Stage),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Failures raised while reading or writing configuration and outbox files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
