use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::form::state::DonationForm;

/// The cause a pledge is made towards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    pub id: String,
    pub title: String,
}

impl Cause {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Card details forwarded downstream. Only the last four digits leave the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub card_number_last4: String,
    pub card_name: String,
    pub expiry_date: String,
}

/// Finished pledge handed to the submission collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationPayload {
    pub cause_id: String,
    pub amount: f64,
    pub is_anonymous: bool,
    pub donor: DonorDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub payment: PaymentDetails,
}

impl DonationPayload {
    /// Packages the form. `amount` is the already validated effective amount.
    pub fn from_form(cause: &Cause, form: &DonationForm, amount: f64) -> Self {
        Self {
            cause_id: cause.id.clone(),
            amount,
            is_anonymous: form.is_anonymous,
            donor: DonorDetails {
                first_name: form.first_name.trim().to_string(),
                last_name: form.last_name.trim().to_string(),
                email: form.email.trim().to_string(),
                phone: optional(&form.phone),
                address: optional(&form.address),
                city: optional(&form.city),
                country: optional(&form.country),
            },
            message: optional(&form.message),
            payment: PaymentDetails {
                card_number_last4: card_last4(&form.card_number),
                card_name: form.card_name.trim().to_string(),
                expiry_date: form.expiry_date.clone(),
            },
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Last four digits of a card number, ignoring separators.
pub fn card_last4(card_number: &str) -> String {
    let digits: Vec<char> = card_number.chars().filter(|ch| ch.is_ascii_digit()).collect();
    let start = digits.len().saturating_sub(4);
    digits[start..].iter().collect()
}

/// Acknowledgement returned by the collaborator for a stored donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub reference: String,
}

/// Failure reported by the collaborator. The reason is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Donation submission failed: {reason}")]
pub struct SubmissionError {
    pub reason: String,
}

impl SubmissionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// External component that persists a donation and updates cause totals.
#[async_trait]
pub trait DonationSubmitter: Send + Sync {
    async fn submit_donation(
        &self,
        payload: DonationPayload,
    ) -> Result<SubmissionReceipt, SubmissionError>;
}
