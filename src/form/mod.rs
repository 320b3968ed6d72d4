//! The donation interview: shared form state, per-stage validation, field
//! formatting and the step controller that ties them together.

pub mod formatter;
pub mod payload;
pub mod stage;
pub mod state;
pub mod summary;
pub mod validation;
pub mod workflow;

pub use payload::{Cause, DonationPayload, DonationSubmitter, SubmissionError, SubmissionReceipt};
pub use stage::{Stage, StepController};
pub use state::{AmountChoice, DispatchOutcome, DonationForm, Field, FieldUpdate, TextField};
pub use validation::FieldErrors;
pub use workflow::DonationWorkflow;
