//! Drives a [`DonationWorkflow`] stage by stage through a [`StageInteraction`].
//!
//! The runner owns no state of its own. Every answer becomes a
//! [`FieldUpdate`] dispatched to the workflow, and moving between stages goes
//! through the workflow's validators.

use crate::cli::output;
use crate::cli::prompts::{choice_menu, text_input, ChoicePromptResult, TextPromptResult};
use crate::errors::WorkflowError;
use crate::form::payload::{DonationSubmitter, SubmissionReceipt};
use crate::form::stage::Stage;
use crate::form::state::{
    AmountChoice, DispatchOutcome, DonationForm, Field, FieldUpdate, TextField, PRESET_AMOUNTS,
};
use crate::form::summary::ConfirmationSummary;
use crate::form::validation::FieldErrors;
use crate::form::workflow::DonationWorkflow;

/// Outcome of a wizard run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardResult {
    Submitted(SubmissionReceipt),
    Cancelled,
}

/// Answer to a single text prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    Value(String),
    /// Leave the current value as it is.
    Keep,
    /// Return to the previous stage.
    Back,
    Cancel,
}

/// Answer to the amount prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountResponse {
    Choice(AmountChoice),
    Keep,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationResponse {
    Submit,
    Back,
    Cancel,
}

/// One input on a stage screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageInput {
    Text(TextField),
    Anonymous,
}

const DONOR_INPUTS: [StageInput; 9] = [
    StageInput::Text(TextField::FirstName),
    StageInput::Text(TextField::LastName),
    StageInput::Text(TextField::Email),
    StageInput::Text(TextField::Phone),
    StageInput::Text(TextField::Address),
    StageInput::Text(TextField::City),
    StageInput::Text(TextField::Country),
    StageInput::Anonymous,
    StageInput::Text(TextField::Message),
];

const PAYMENT_INPUTS: [StageInput; 4] = [
    StageInput::Text(TextField::CardNumber),
    StageInput::Text(TextField::CardName),
    StageInput::Text(TextField::ExpiryDate),
    StageInput::Text(TextField::Cvv),
];

/// Inputs rendered on `stage`, in prompt order.
pub fn stage_inputs(stage: Stage) -> &'static [StageInput] {
    match stage {
        Stage::DonorInformation => &DONOR_INPUTS,
        Stage::PaymentMethod => &PAYMENT_INPUTS,
        Stage::Amount | Stage::Confirmation => &[],
    }
}

/// Context handed to [`StageInteraction::prompt_text`].
pub struct FieldPrompt<'a> {
    pub field: TextField,
    pub current: &'a str,
    pub error: Option<&'a str>,
}

/// Interaction surface used by the wizard. The terminal implementation lives
/// in [`TerminalInteraction`]; tests substitute scripted ones.
pub trait StageInteraction {
    fn stage_started(&mut self, _stage: Stage) {}

    fn choose_amount(&mut self, form: &DonationForm, error: Option<&str>) -> AmountResponse;

    fn prompt_text(&mut self, prompt: &FieldPrompt<'_>) -> PromptResponse;

    fn prompt_anonymous(&mut self, current: bool) -> Option<bool>;

    fn confirm(&mut self, summary: &ConfirmationSummary, currency: &str) -> ConfirmationResponse;

    fn report_errors(&mut self, _errors: &FieldErrors) {}

    fn report_submission_failure(&mut self, _err: &WorkflowError) {}
}

/// Runs the four-stage interview and hands the payload to the submitter.
pub struct DonationWizard<'a> {
    submitter: &'a dyn DonationSubmitter,
    currency: String,
}

impl<'a> DonationWizard<'a> {
    pub fn new(submitter: &'a dyn DonationSubmitter, currency: impl Into<String>) -> Self {
        Self {
            submitter,
            currency: currency.into(),
        }
    }

    pub async fn run<I: StageInteraction>(
        &self,
        workflow: &mut DonationWorkflow,
        interaction: &mut I,
    ) -> Result<WizardResult, WorkflowError> {
        loop {
            let stage = workflow.stage();
            interaction.stage_started(stage);

            let step = match stage {
                Stage::Amount => collect_amount(workflow, interaction)?,
                Stage::DonorInformation | Stage::PaymentMethod => {
                    collect_inputs(workflow, interaction, stage)?
                }
                Stage::Confirmation => {
                    let summary = workflow.summary();
                    match interaction.confirm(&summary, &self.currency) {
                        ConfirmationResponse::Submit => {
                            match workflow.submit(self.submitter).await {
                                Ok(receipt) => return Ok(WizardResult::Submitted(receipt)),
                                Err(err @ WorkflowError::Submission(_)) => {
                                    interaction.report_submission_failure(&err);
                                }
                                Err(err) => return Err(err),
                            }
                            continue;
                        }
                        ConfirmationResponse::Back => Step::Back,
                        ConfirmationResponse::Cancel => Step::Cancel,
                    }
                }
            };

            match step {
                Step::Continue => match workflow.proceed() {
                    Ok(_) => {}
                    Err(WorkflowError::StageInvalid { .. }) => {
                        interaction.report_errors(workflow.errors());
                    }
                    Err(err) => return Err(err),
                },
                Step::Repeat => {}
                Step::Back => {
                    workflow.retreat()?;
                }
                Step::Cancel => return Ok(WizardResult::Cancelled),
            }
        }
    }
}

enum Step {
    Continue,
    Repeat,
    Back,
    Cancel,
}

fn collect_amount<I: StageInteraction>(
    workflow: &mut DonationWorkflow,
    interaction: &mut I,
) -> Result<Step, WorkflowError> {
    let error = workflow.errors().get(Field::Amount);
    match interaction.choose_amount(workflow.form(), error) {
        AmountResponse::Choice(choice) => {
            // A refused custom amount leaves the form as it was; ask again.
            match workflow.dispatch(FieldUpdate::Amount(choice))? {
                DispatchOutcome::Applied => Ok(Step::Continue),
                DispatchOutcome::Rejected => Ok(Step::Repeat),
            }
        }
        AmountResponse::Keep => Ok(Step::Continue),
        AmountResponse::Cancel => Ok(Step::Cancel),
    }
}

fn collect_inputs<I: StageInteraction>(
    workflow: &mut DonationWorkflow,
    interaction: &mut I,
    stage: Stage,
) -> Result<Step, WorkflowError> {
    for input in stage_inputs(stage) {
        let update = match *input {
            StageInput::Text(field) => {
                let prompt = FieldPrompt {
                    field,
                    current: workflow.form().text(field),
                    error: workflow.errors().get(field),
                };
                match interaction.prompt_text(&prompt) {
                    PromptResponse::Value(value) => FieldUpdate::text(field, value),
                    PromptResponse::Keep => continue,
                    PromptResponse::Back => return Ok(Step::Back),
                    PromptResponse::Cancel => return Ok(Step::Cancel),
                }
            }
            StageInput::Anonymous => match interaction.prompt_anonymous(workflow.form().is_anonymous) {
                Some(flag) => FieldUpdate::Anonymous(flag),
                None => return Ok(Step::Cancel),
            },
        };
        workflow.dispatch(update)?;
    }
    Ok(Step::Continue)
}

/// Terminal implementation backed by the shared prompt and output helpers.
#[derive(Debug, Default)]
pub struct TerminalInteraction;

impl TerminalInteraction {
    pub fn new() -> Self {
        Self
    }
}

const ANONYMOUS_OPTIONS: [&str; 2] = ["Show my name", "Stay anonymous"];
const CONFIRM_OPTIONS: [&str; 2] = ["Submit donation", "Cancel"];

impl StageInteraction for TerminalInteraction {
    fn stage_started(&mut self, stage: Stage) {
        output::section(format!(
            "Step {} of {}: {}",
            stage.index() + 1,
            Stage::ALL.len(),
            stage.label()
        ));
    }

    fn choose_amount(&mut self, form: &DonationForm, error: Option<&str>) -> AmountResponse {
        if let Some(message) = error {
            output::warning(message);
        }
        let presets: Vec<String> = PRESET_AMOUNTS.iter().map(u32::to_string).collect();
        output::detail(format!(
            "Choose {} or type any other amount (up to 2 decimals).",
            presets.join(", ")
        ));
        output::detail("Type :cancel to leave the wizard.");

        let current = if form.custom_amount.is_empty() && form.amount > 0 {
            form.amount.to_string()
        } else {
            form.custom_amount.clone()
        };
        match text_input("Donation amount", Some(&current)) {
            Ok(TextPromptResult::Value(raw)) => AmountResponse::Choice(parse_amount_choice(&raw)),
            Ok(TextPromptResult::Keep) => AmountResponse::Keep,
            Ok(TextPromptResult::Back) => AmountResponse::Keep,
            Ok(TextPromptResult::Cancel) | Err(_) => AmountResponse::Cancel,
        }
    }

    fn prompt_text(&mut self, prompt: &FieldPrompt<'_>) -> PromptResponse {
        if let Some(message) = prompt.error {
            output::warning(message);
        }
        let label = if prompt.field.is_required() {
            prompt.field.label().to_string()
        } else {
            format!("{} (optional)", prompt.field.label())
        };
        match text_input(&label, Some(prompt.current)) {
            Ok(TextPromptResult::Value(value)) => PromptResponse::Value(value),
            Ok(TextPromptResult::Keep) => PromptResponse::Keep,
            Ok(TextPromptResult::Back) => PromptResponse::Back,
            Ok(TextPromptResult::Cancel) | Err(_) => PromptResponse::Cancel,
        }
    }

    fn prompt_anonymous(&mut self, current: bool) -> Option<bool> {
        let default = usize::from(current);
        match choice_menu("How should we show your name?", &ANONYMOUS_OPTIONS, default, false) {
            Ok(ChoicePromptResult::Selected(index)) => Some(index == 1),
            _ => None,
        }
    }

    fn confirm(&mut self, summary: &ConfirmationSummary, currency: &str) -> ConfirmationResponse {
        for (label, value) in summary.entries() {
            if label == "Amount" {
                output::detail(format!("{label}: {value} {currency}"));
            } else {
                output::detail(format!("{label}: {value}"));
            }
        }
        match choice_menu("Review your donation", &CONFIRM_OPTIONS, 0, true) {
            Ok(ChoicePromptResult::Selected(0)) => ConfirmationResponse::Submit,
            Ok(ChoicePromptResult::Back) => ConfirmationResponse::Back,
            _ => ConfirmationResponse::Cancel,
        }
    }

    fn report_errors(&mut self, errors: &FieldErrors) {
        output::warning(format!("{} field(s) need attention:", errors.len()));
        for (field, message) in errors.iter() {
            output::detail(format!("{}: {}", field.label(), message));
        }
    }

    fn report_submission_failure(&mut self, err: &WorkflowError) {
        output::error(err);
        output::detail("Nothing was charged. Choose submit to try again.");
    }
}

/// A listed preset selects it; anything else is treated as a custom amount.
pub fn parse_amount_choice(raw: &str) -> AmountChoice {
    let trimmed = raw.trim();
    match trimmed.parse::<u32>() {
        Ok(value) if PRESET_AMOUNTS.contains(&value) => AmountChoice::Preset(value),
        _ => AmountChoice::Custom(trimmed.to_string()),
    }
}
