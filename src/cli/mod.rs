pub mod outbox;
pub mod output;
pub mod prompts;
pub mod test_mode;
pub mod wizard;

use std::error::Error;

use crate::config::ConfigManager;
use crate::form::payload::Cause;
use crate::form::workflow::DonationWorkflow;

use outbox::OutboxSubmitter;
use wizard::{DonationWizard, TerminalInteraction, WizardResult};

const DEFAULT_CAUSE_ID: &str = "general-fund";
const DEFAULT_CAUSE_TITLE: &str = "General fund";

const USAGE: &str = "Usage: pledge_cli [CAUSE_ID [CAUSE_TITLE]]\n\
    Walks through amount, donor details, payment and confirmation,\n\
    then stores the finished donation in the outbox directory.";

/// Entry point for the `pledge_cli` binary.
pub fn run_cli(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    if args
        .first()
        .map(|arg| arg == "-h" || arg == "--help")
        .unwrap_or(false)
    {
        println!("{USAGE}");
        return Ok(());
    }

    let manager = ConfigManager::new()?;
    let config = manager.load()?;

    let mut args = args.into_iter();
    let cause_id = args
        .next()
        .or_else(|| config.default_cause_id.clone())
        .unwrap_or_else(|| DEFAULT_CAUSE_ID.to_string());
    let cause_title = args
        .next()
        .or_else(|| config.default_cause_title.clone())
        .unwrap_or_else(|| DEFAULT_CAUSE_TITLE.to_string());

    let submitter = OutboxSubmitter::new(manager.outbox_dir(&config));
    let wizard = DonationWizard::new(&submitter, config.currency.clone());
    let mut workflow = DonationWorkflow::new(Cause::new(cause_id, cause_title));
    let mut interaction = TerminalInteraction::new();

    output::section(format!("Donate to {}", workflow.cause().title));
    if test_mode::is_enabled() {
        tracing::debug!("prompts answered from scripted inputs");
    }

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    match runtime.block_on(wizard.run(&mut workflow, &mut interaction))? {
        WizardResult::Submitted(receipt) => {
            output::success(format!(
                "Donation submitted. Reference: {}",
                receipt.reference
            ));
        }
        WizardResult::Cancelled => output::info("Donation cancelled."),
    }
    Ok(())
}
