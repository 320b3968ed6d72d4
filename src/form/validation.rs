//! Per-stage validators. Each one reads only its own slice of the form and
//! reports every failing field at once.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::form::stage::Stage;
use crate::form::state::{DonationForm, Field, TextField};
use crate::time::Clock;

pub const AMOUNT_INVALID: &str = "Please select or enter a valid donation amount.";
pub const FIRST_NAME_REQUIRED: &str = "First name is required.";
pub const LAST_NAME_REQUIRED: &str = "Last name is required.";
pub const EMAIL_REQUIRED: &str = "Email is required.";
pub const EMAIL_INVALID: &str = "Please enter a valid email address.";
pub const CARD_NUMBER_REQUIRED: &str = "Card number is required.";
pub const CARD_NUMBER_INVALID: &str = "Please enter a valid card number.";
pub const CARD_NAME_REQUIRED: &str = "Name on card is required.";
pub const EXPIRY_REQUIRED: &str = "Expiry date is required.";
pub const EXPIRY_INVALID: &str = "Please enter a valid expiry date (MM/YY).";
pub const CARD_EXPIRED: &str = "Card has expired.";
pub const CVV_REQUIRED: &str = "CVV is required.";
pub const CVV_INVALID: &str = "Please enter a valid CVV.";

const MIN_CARD_DIGITS: usize = 16;
const MIN_CVV_LEN: usize = 3;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid email pattern"));

static EXPIRY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{2})/([0-9]{2})$").expect("valid expiry pattern"));

/// Field-level validation failures keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: BTreeMap<Field, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<Field>, message: impl Into<String>) {
        self.entries.insert(field.into(), message.into());
    }

    pub fn get(&self, field: impl Into<Field>) -> Option<&str> {
        self.entries.get(&field.into()).map(String::as_str)
    }

    pub fn contains(&self, field: impl Into<Field>) -> bool {
        self.entries.contains_key(&field.into())
    }

    /// Drops the entry for `field`, returning whether one existed.
    pub fn clear(&mut self, field: impl Into<Field>) -> bool {
        self.entries.remove(&field.into()).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.entries
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }
}

pub fn validate_amount(form: &DonationForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let valid = form
        .effective_amount()
        .map(|amount| amount.is_finite() && amount > 0.0)
        .unwrap_or(false);
    if !valid {
        errors.insert(Field::Amount, AMOUNT_INVALID);
    }
    errors
}

pub fn validate_donor(form: &DonationForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if form.first_name.trim().is_empty() {
        errors.insert(TextField::FirstName, FIRST_NAME_REQUIRED);
    }
    if form.last_name.trim().is_empty() {
        errors.insert(TextField::LastName, LAST_NAME_REQUIRED);
    }
    if form.email.is_empty() {
        errors.insert(TextField::Email, EMAIL_REQUIRED);
    } else if !EMAIL_PATTERN.is_match(&form.email) {
        errors.insert(TextField::Email, EMAIL_INVALID);
    }
    errors
}

pub fn validate_payment(form: &DonationForm, clock: &dyn Clock) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let digits = form
        .card_number
        .chars()
        .filter(|ch| ch.is_ascii_digit())
        .count();
    if form.card_number.is_empty() {
        errors.insert(TextField::CardNumber, CARD_NUMBER_REQUIRED);
    } else if digits < MIN_CARD_DIGITS {
        errors.insert(TextField::CardNumber, CARD_NUMBER_INVALID);
    }

    if form.card_name.trim().is_empty() {
        errors.insert(TextField::CardName, CARD_NAME_REQUIRED);
    }

    if form.expiry_date.is_empty() {
        errors.insert(TextField::ExpiryDate, EXPIRY_REQUIRED);
    } else {
        match expiry_month_start(&form.expiry_date) {
            None => errors.insert(TextField::ExpiryDate, EXPIRY_INVALID),
            Some(start) if start < clock.today() => {
                errors.insert(TextField::ExpiryDate, CARD_EXPIRED)
            }
            Some(_) => {}
        }
    }

    if form.cvv.is_empty() {
        errors.insert(TextField::Cvv, CVV_REQUIRED);
    } else if form.cvv.len() < MIN_CVV_LEN {
        errors.insert(TextField::Cvv, CVV_INVALID);
    }

    errors
}

/// First day of the month named by an `MM/YY` string, years read as `20YY`.
pub fn expiry_month_start(expiry: &str) -> Option<NaiveDate> {
    let captures = EXPIRY_PATTERN.captures(expiry)?;
    let month: u32 = captures.get(1)?.as_str().parse().ok()?;
    let year: i32 = captures.get(2)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, 1)
}

/// Runs the validator owned by `stage`. The confirmation stage has no inputs.
pub fn validate_stage(stage: Stage, form: &DonationForm, clock: &dyn Clock) -> FieldErrors {
    match stage {
        Stage::Amount => validate_amount(form),
        Stage::DonorInformation => validate_donor(form),
        Stage::PaymentMethod => validate_payment(form, clock),
        Stage::Confirmation => FieldErrors::new(),
    }
}
