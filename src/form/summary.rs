use crate::form::payload::{card_last4, Cause};
use crate::form::state::DonationForm;

const ANONYMOUS_DONOR: &str = "Anonymous";

/// Read-only view rendered on the confirmation stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationSummary {
    pub cause_id: String,
    pub cause_title: String,
    pub amount: f64,
    pub donor_name: String,
    pub masked_card: String,
    pub card_name: String,
    pub expiry_date: String,
    pub message: Option<String>,
}

impl ConfirmationSummary {
    pub fn build(cause: &Cause, form: &DonationForm) -> Self {
        let message = form.message.trim();
        Self {
            cause_id: cause.id.clone(),
            cause_title: cause.title.clone(),
            amount: form.effective_amount().unwrap_or(0.0),
            donor_name: display_name(form),
            masked_card: mask_card_number(&form.card_number),
            card_name: form.card_name.trim().to_string(),
            expiry_date: form.expiry_date.clone(),
            message: (!message.is_empty()).then(|| message.to_string()),
        }
    }

    pub fn formatted_amount(&self) -> String {
        format!("{:.2}", self.amount)
    }

    /// Label/value pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![
            ("Cause", format!("{} ({})", self.cause_title, self.cause_id)),
            ("Amount", self.formatted_amount()),
            ("Donor", self.donor_name.clone()),
            ("Card", self.masked_card.clone()),
            ("Name on card", self.card_name.clone()),
            ("Expiry", self.expiry_date.clone()),
        ];
        if let Some(message) = &self.message {
            entries.push(("Message", message.clone()));
        }
        entries
    }
}

pub fn display_name(form: &DonationForm) -> String {
    if form.is_anonymous {
        ANONYMOUS_DONOR.to_string()
    } else {
        format!("{} {}", form.first_name.trim(), form.last_name.trim())
    }
}

/// Hides everything but the last four digits: `**** **** **** 1111`.
pub fn mask_card_number(card_number: &str) -> String {
    format!("**** **** **** {}", card_last4(card_number))
}
