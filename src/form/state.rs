use std::fmt;

use crate::form::formatter::{accept_custom_amount, format_text_field};
use crate::form::stage::Stage;

/// Donation amounts offered as one-click choices.
pub const PRESET_AMOUNTS: [u32; 6] = [10, 25, 50, 100, 250, 500];

/// Free-text fields of the form, named by what they hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TextField {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    City,
    Country,
    Message,
    CardNumber,
    CardName,
    ExpiryDate,
    Cvv,
}

impl TextField {
    pub fn key(self) -> &'static str {
        match self {
            TextField::FirstName => "firstName",
            TextField::LastName => "lastName",
            TextField::Email => "email",
            TextField::Phone => "phone",
            TextField::Address => "address",
            TextField::City => "city",
            TextField::Country => "country",
            TextField::Message => "message",
            TextField::CardNumber => "cardNumber",
            TextField::CardName => "cardName",
            TextField::ExpiryDate => "expiryDate",
            TextField::Cvv => "cvv",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TextField::FirstName => "First name",
            TextField::LastName => "Last name",
            TextField::Email => "Email",
            TextField::Phone => "Phone",
            TextField::Address => "Address",
            TextField::City => "City",
            TextField::Country => "Country",
            TextField::Message => "Message",
            TextField::CardNumber => "Card number",
            TextField::CardName => "Name on card",
            TextField::ExpiryDate => "Expiry date (MM/YY)",
            TextField::Cvv => "CVV",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(
            self,
            TextField::FirstName
                | TextField::LastName
                | TextField::Email
                | TextField::CardNumber
                | TextField::CardName
                | TextField::ExpiryDate
                | TextField::Cvv
        )
    }

    /// Stage whose input handlers own this field.
    pub fn stage(self) -> Stage {
        match self {
            TextField::CardNumber
            | TextField::CardName
            | TextField::ExpiryDate
            | TextField::Cvv => Stage::PaymentMethod,
            _ => Stage::DonorInformation,
        }
    }
}

/// Every field an error can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Amount,
    IsAnonymous,
    Text(TextField),
}

impl Field {
    pub fn key(self) -> &'static str {
        match self {
            Field::Amount => "amount",
            Field::IsAnonymous => "isAnonymous",
            Field::Text(field) => field.key(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Amount => "Donation amount",
            Field::IsAnonymous => "Display name",
            Field::Text(field) => field.label(),
        }
    }

    pub fn stage(self) -> Stage {
        match self {
            Field::Amount => Stage::Amount,
            Field::IsAnonymous => Stage::DonorInformation,
            Field::Text(field) => field.stage(),
        }
    }
}

impl From<TextField> for Field {
    fn from(field: TextField) -> Self {
        Field::Text(field)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// How the donor picked the amount. Choosing one variant always discards the other.
/// `Preset` values outside [`PRESET_AMOUNTS`] are refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountChoice {
    Preset(u32),
    Custom(String),
}

/// A single edit to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Amount(AmountChoice),
    Text { field: TextField, value: String },
    Anonymous(bool),
}

impl FieldUpdate {
    pub fn text(field: TextField, value: impl Into<String>) -> Self {
        FieldUpdate::Text {
            field,
            value: value.into(),
        }
    }

    pub fn field(&self) -> Field {
        match self {
            FieldUpdate::Amount(_) => Field::Amount,
            FieldUpdate::Text { field, .. } => Field::Text(*field),
            FieldUpdate::Anonymous(_) => Field::IsAnonymous,
        }
    }
}

/// Whether an update changed the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied,
    /// The formatter refused the input; the form is untouched.
    Rejected,
}

/// Answers collected across every stage of the interview.
/// Holds the full card number and CVV; only [`crate::form::payload::DonationPayload`]
/// is meant to leave the process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonationForm {
    pub amount: u32,
    pub custom_amount: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub is_anonymous: bool,
    pub message: String,
    pub card_number: String,
    pub card_name: String,
    pub expiry_date: String,
    pub cvv: String,
}

impl DonationForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom text when present, otherwise the preset. `None` when the custom
    /// text does not parse as a number.
    pub fn effective_amount(&self) -> Option<f64> {
        if self.custom_amount.is_empty() {
            Some(f64::from(self.amount))
        } else {
            self.custom_amount.parse::<f64>().ok()
        }
    }

    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::FirstName => &self.first_name,
            TextField::LastName => &self.last_name,
            TextField::Email => &self.email,
            TextField::Phone => &self.phone,
            TextField::Address => &self.address,
            TextField::City => &self.city,
            TextField::Country => &self.country,
            TextField::Message => &self.message,
            TextField::CardNumber => &self.card_number,
            TextField::CardName => &self.card_name,
            TextField::ExpiryDate => &self.expiry_date,
            TextField::Cvv => &self.cvv,
        }
    }

    fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::FirstName => &mut self.first_name,
            TextField::LastName => &mut self.last_name,
            TextField::Email => &mut self.email,
            TextField::Phone => &mut self.phone,
            TextField::Address => &mut self.address,
            TextField::City => &mut self.city,
            TextField::Country => &mut self.country,
            TextField::Message => &mut self.message,
            TextField::CardNumber => &mut self.card_number,
            TextField::CardName => &mut self.card_name,
            TextField::ExpiryDate => &mut self.expiry_date,
            TextField::Cvv => &mut self.cvv,
        }
    }

    /// Applies one update, running the formatter for the targeted field.
    pub fn apply(&mut self, update: FieldUpdate) -> DispatchOutcome {
        match update {
            FieldUpdate::Amount(choice) => self.set_amount_choice(choice),
            FieldUpdate::Text { field, value } => {
                *self.text_mut(field) = format_text_field(field, &value);
                DispatchOutcome::Applied
            }
            FieldUpdate::Anonymous(flag) => {
                self.is_anonymous = flag;
                DispatchOutcome::Applied
            }
        }
    }

    pub fn set_amount_choice(&mut self, choice: AmountChoice) -> DispatchOutcome {
        match choice {
            AmountChoice::Preset(value) if PRESET_AMOUNTS.contains(&value) => {
                self.amount = value;
                self.custom_amount.clear();
                DispatchOutcome::Applied
            }
            AmountChoice::Preset(_) => DispatchOutcome::Rejected,
            AmountChoice::Custom(raw) => match accept_custom_amount(&raw) {
                Some(text) => {
                    self.amount = 0;
                    self.custom_amount = text;
                    DispatchOutcome::Applied
                }
                None => DispatchOutcome::Rejected,
            },
        }
    }
}
