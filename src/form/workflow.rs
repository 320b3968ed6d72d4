use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::WorkflowError;
use crate::form::payload::{
    Cause, DonationPayload, DonationSubmitter, SubmissionError, SubmissionReceipt,
};
use crate::form::stage::{Stage, StepController};
use crate::form::state::{DispatchOutcome, DonationForm, Field, FieldUpdate};
use crate::form::summary::ConfirmationSummary;
use crate::form::validation::{validate_amount, validate_stage, FieldErrors};
use crate::time::{Clock, SystemClock};

/// One run of the donation interview, from the amount stage to submission.
///
/// The workflow owns the shared form, the step controller and the per-field
/// errors. Stages never touch the form directly; they send [`FieldUpdate`]s
/// through [`DonationWorkflow::dispatch`] and ask to move with
/// [`DonationWorkflow::proceed`] / [`DonationWorkflow::retreat`].
pub struct DonationWorkflow {
    cause: Cause,
    form: DonationForm,
    controller: StepController,
    errors: FieldErrors,
    is_submitting: bool,
    clock: Arc<dyn Clock>,
}

impl DonationWorkflow {
    pub fn new(cause: Cause) -> Self {
        Self::with_clock(cause, Arc::new(SystemClock))
    }

    pub fn with_clock(cause: Cause, clock: Arc<dyn Clock>) -> Self {
        Self {
            cause,
            form: DonationForm::new(),
            controller: StepController::new(),
            errors: FieldErrors::new(),
            is_submitting: false,
            clock,
        }
    }

    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    pub fn stage(&self) -> Stage {
        self.controller.current()
    }

    pub fn form(&self) -> &DonationForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Applies an edit owned by the active stage and clears that field's error.
    pub fn dispatch(&mut self, update: FieldUpdate) -> Result<DispatchOutcome, WorkflowError> {
        if self.is_submitting {
            return Err(WorkflowError::SubmissionInFlight);
        }
        let field: Field = update.field();
        let stage = self.stage();
        if field.stage() != stage {
            return Err(WorkflowError::FieldNotInStage { field, stage });
        }

        self.errors.clear(field);
        let outcome = self.form.apply(update);
        debug!(%field, ?outcome, "field update dispatched");
        Ok(outcome)
    }

    /// Validates the active stage and, when it passes, moves to the next one.
    pub fn proceed(&mut self) -> Result<Stage, WorkflowError> {
        if self.is_submitting {
            return Err(WorkflowError::SubmissionInFlight);
        }
        let stage = self.stage();
        if stage.is_terminal() {
            return Ok(stage);
        }

        let errors = validate_stage(stage, &self.form, self.clock.as_ref());
        if !errors.is_empty() {
            let count = errors.len();
            warn!(%stage, count, "stage validation blocked advance");
            self.errors = errors;
            return Err(WorkflowError::StageInvalid { stage, count });
        }

        self.errors = FieldErrors::new();
        let next = self.controller.advance();
        debug!(from = %stage, to = %next, "advanced stage");
        Ok(next)
    }

    /// Steps back one stage without validating or discarding answers.
    pub fn retreat(&mut self) -> Result<Stage, WorkflowError> {
        if self.is_submitting {
            return Err(WorkflowError::SubmissionInFlight);
        }
        let from = self.stage();
        let to = self.controller.retreat();
        debug!(%from, %to, "retreated stage");
        Ok(to)
    }

    pub fn summary(&self) -> ConfirmationSummary {
        ConfirmationSummary::build(&self.cause, &self.form)
    }

    /// Packages the payload and marks a submission as in flight. A second call
    /// before [`DonationWorkflow::finish_submission`] is refused.
    pub fn begin_submission(&mut self) -> Result<DonationPayload, WorkflowError> {
        let stage = self.stage();
        if !stage.is_terminal() {
            return Err(WorkflowError::NotAtConfirmation(stage));
        }
        if self.is_submitting {
            return Err(WorkflowError::SubmissionInFlight);
        }

        let amount_errors = validate_amount(&self.form);
        let amount = match self.form.effective_amount() {
            Some(amount) if amount_errors.is_empty() => amount,
            _ => {
                return Err(WorkflowError::StageInvalid {
                    stage: Stage::Amount,
                    count: amount_errors.len(),
                })
            }
        };

        self.is_submitting = true;
        let payload = DonationPayload::from_form(&self.cause, &self.form, amount);
        info!(cause = %self.cause.id, amount, "submitting donation");
        Ok(payload)
    }

    /// Records the collaborator's answer and re-enables the controls.
    pub fn finish_submission(
        &mut self,
        outcome: Result<SubmissionReceipt, SubmissionError>,
    ) -> Result<SubmissionReceipt, WorkflowError> {
        self.is_submitting = false;
        match outcome {
            Ok(receipt) => {
                info!(reference = %receipt.reference, "donation submitted");
                Ok(receipt)
            }
            Err(err) => {
                warn!(reason = %err.reason, "donation submission failed");
                Err(err.into())
            }
        }
    }

    pub async fn submit(
        &mut self,
        submitter: &dyn DonationSubmitter,
    ) -> Result<SubmissionReceipt, WorkflowError> {
        let payload = self.begin_submission()?;
        let outcome = submitter.submit_donation(payload).await;
        self.finish_submission(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::state::{AmountChoice, TextField};
    use crate::form::validation::{CARD_EXPIRED, EMAIL_INVALID, FIRST_NAME_REQUIRED};
    use crate::time::FixedClock;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct RecordingSubmitter {
        calls: AtomicUsize,
        payloads: Mutex<Vec<DonationPayload>>,
        fail_with: Option<String>,
    }

    impl RecordingSubmitter {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                payloads: Mutex::new(Vec::new()),
                fail_with: None,
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                fail_with: Some(reason.to_string()),
                ..Self::ok()
            }
        }
    }

    #[async_trait]
    impl DonationSubmitter for RecordingSubmitter {
        async fn submit_donation(
            &self,
            payload: DonationPayload,
        ) -> Result<SubmissionReceipt, SubmissionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.payloads.lock().unwrap().push(payload);
            match &self.fail_with {
                Some(reason) => Err(SubmissionError::new(reason.clone())),
                None => Ok(SubmissionReceipt {
                    reference: format!("ref-{call}"),
                }),
            }
        }
    }

    fn workflow() -> DonationWorkflow {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        DonationWorkflow::with_clock(Cause::new("cause-1", "School roof"), Arc::new(clock))
    }

    fn fill_donor(flow: &mut DonationWorkflow) {
        for (field, value) in [
            (TextField::FirstName, "Ada"),
            (TextField::LastName, "Lovelace"),
            (TextField::Email, "ada@example.org"),
        ] {
            flow.dispatch(FieldUpdate::text(field, value)).unwrap();
        }
    }

    fn fill_payment(flow: &mut DonationWorkflow) {
        for (field, value) in [
            (TextField::CardNumber, "4111111111111111"),
            (TextField::CardName, "A Lovelace"),
            (TextField::ExpiryDate, "1230"),
            (TextField::Cvv, "123"),
        ] {
            flow.dispatch(FieldUpdate::text(field, value)).unwrap();
        }
    }

    fn at_confirmation() -> DonationWorkflow {
        let mut flow = workflow();
        flow.dispatch(FieldUpdate::Amount(AmountChoice::Preset(50)))
            .unwrap();
        flow.proceed().unwrap();
        fill_donor(&mut flow);
        flow.proceed().unwrap();
        fill_payment(&mut flow);
        assert_eq!(flow.proceed().unwrap(), Stage::Confirmation);
        flow
    }

    #[test]
    fn amount_stage_blocks_without_amount() {
        let mut flow = workflow();
        let err = flow.proceed().unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::StageInvalid {
                stage: Stage::Amount,
                count: 1
            }
        ));
        assert_eq!(flow.stage(), Stage::Amount);
        assert!(flow.errors().contains(Field::Amount));

        flow.dispatch(FieldUpdate::Amount(AmountChoice::Custom("5".into())))
            .unwrap();
        assert!(flow.errors().is_empty());
        assert_eq!(flow.proceed().unwrap(), Stage::DonorInformation);
    }

    #[test]
    fn editing_clears_only_that_field_error() {
        let mut flow = workflow();
        flow.dispatch(FieldUpdate::Amount(AmountChoice::Preset(10)))
            .unwrap();
        flow.proceed().unwrap();
        flow.dispatch(FieldUpdate::text(TextField::Email, "abc"))
            .unwrap();
        assert!(flow.proceed().is_err());
        assert_eq!(flow.errors().get(TextField::Email), Some(EMAIL_INVALID));
        assert_eq!(
            flow.errors().get(TextField::FirstName),
            Some(FIRST_NAME_REQUIRED)
        );

        flow.dispatch(FieldUpdate::text(TextField::Email, ""))
            .unwrap();
        flow.dispatch(FieldUpdate::text(TextField::Email, "a@b.com"))
            .unwrap();
        assert!(!flow.errors().contains(TextField::Email));
        assert_eq!(flow.errors().len(), 2);
    }

    #[test]
    fn updates_for_other_stages_are_refused() {
        let mut flow = workflow();
        let err = flow
            .dispatch(FieldUpdate::text(TextField::Cvv, "123"))
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::FieldNotInStage {
                field: Field::Text(TextField::Cvv),
                stage: Stage::Amount
            }
        ));
        assert_eq!(flow.form().cvv, "");
    }

    #[test]
    fn retreat_keeps_answers() {
        let mut flow = at_confirmation();
        assert_eq!(flow.retreat().unwrap(), Stage::PaymentMethod);
        assert_eq!(flow.retreat().unwrap(), Stage::DonorInformation);
        assert_eq!(flow.retreat().unwrap(), Stage::Amount);
        assert_eq!(flow.retreat().unwrap(), Stage::Amount);
        assert_eq!(flow.form().amount, 50);
        assert_eq!(flow.form().card_number, "4111 1111 1111 1111");
    }

    #[test]
    fn expired_card_blocks_payment_stage() {
        let mut flow = workflow();
        flow.dispatch(FieldUpdate::Amount(AmountChoice::Preset(10)))
            .unwrap();
        flow.proceed().unwrap();
        fill_donor(&mut flow);
        flow.proceed().unwrap();
        fill_payment(&mut flow);
        flow.dispatch(FieldUpdate::text(TextField::ExpiryDate, "0120"))
            .unwrap();
        assert!(flow.proceed().is_err());
        assert_eq!(flow.stage(), Stage::PaymentMethod);
        assert_eq!(flow.errors().get(TextField::ExpiryDate), Some(CARD_EXPIRED));
    }

    #[test]
    fn submission_requires_confirmation_stage() {
        let mut flow = workflow();
        assert!(matches!(
            flow.begin_submission(),
            Err(WorkflowError::NotAtConfirmation(Stage::Amount))
        ));
    }

    #[test]
    fn second_begin_is_refused_while_in_flight() {
        let mut flow = at_confirmation();
        let payload = flow.begin_submission().unwrap();
        assert_eq!(payload.amount, 50.0);
        assert!(flow.is_submitting());

        assert!(matches!(
            flow.begin_submission(),
            Err(WorkflowError::SubmissionInFlight)
        ));
        assert!(matches!(
            flow.retreat(),
            Err(WorkflowError::SubmissionInFlight)
        ));
        assert_eq!(flow.stage(), Stage::Confirmation);

        flow.finish_submission(Ok(SubmissionReceipt {
            reference: "r".into(),
        }))
        .unwrap();
        assert!(!flow.is_submitting());
    }

    #[tokio::test]
    async fn submit_invokes_collaborator_once() {
        let mut flow = at_confirmation();
        let submitter = RecordingSubmitter::ok();

        let receipt = flow.submit(&submitter).await.unwrap();
        assert_eq!(receipt.reference, "ref-1");
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);

        let payloads = submitter.payloads.lock().unwrap();
        assert_eq!(payloads[0].cause_id, "cause-1");
        assert_eq!(payloads[0].donor.email, "ada@example.org");
        assert_eq!(payloads[0].payment.card_number_last4, "1111");
    }

    #[tokio::test]
    async fn submit_while_pending_never_reaches_collaborator() {
        let mut flow = at_confirmation();
        let submitter = RecordingSubmitter::ok();

        flow.begin_submission().unwrap();
        let err = flow.submit(&submitter).await.unwrap_err();
        assert!(matches!(err, WorkflowError::SubmissionInFlight));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_submission_resets_flag_for_manual_retry() {
        let mut flow = at_confirmation();
        let failing = RecordingSubmitter::failing("card declined");

        let err = flow.submit(&failing).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Submission(ref e) if e.reason == "card declined"));
        assert!(!flow.is_submitting());
        assert_eq!(flow.stage(), Stage::Confirmation);

        let retry = RecordingSubmitter::ok();
        assert!(flow.submit(&retry).await.is_ok());
        assert_eq!(retry.calls.load(Ordering::SeqCst), 1);
    }
}
