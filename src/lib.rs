#![doc(test(attr(deny(warnings))))]

//! Pledge Core runs the guided donation interview: amount, donor details,
//! payment card and confirmation, ending in a single validated payload for
//! an external submission service.

pub mod cli;
pub mod config;
pub mod errors;
pub mod form;
pub mod time;
pub mod utils;

pub use errors::WorkflowError;
pub use form::payload::{Cause, DonationPayload, DonationSubmitter};
pub use form::workflow::DonationWorkflow;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Pledge Core tracing initialized.");
    });
}
