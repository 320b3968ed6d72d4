//! Keystroke normalisation for payment and amount fields.
//!
//! Every formatter is a projection: feeding its own output back in yields the
//! same value.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::form::state::TextField;

/// 16 digits plus three group separators.
pub const CARD_NUMBER_MAX_LEN: usize = 19;
pub const EXPIRY_DATE_LEN: usize = 5;
pub const CVV_MAX_LEN: usize = 4;

const CARD_GROUP: usize = 4;

static CUSTOM_AMOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]*\.?[0-9]{0,2}$").expect("valid custom amount pattern"));

/// Keeps digits only and groups them in fours, e.g. `4111 1111 1111 1111`.
pub fn format_card_number(raw: &str) -> String {
    let mut formatted = String::with_capacity(CARD_NUMBER_MAX_LEN);
    for (position, digit) in raw.chars().filter(|ch| ch.is_ascii_digit()).enumerate() {
        if position > 0 && position % CARD_GROUP == 0 {
            formatted.push(' ');
        }
        formatted.push(digit);
    }
    formatted.chars().take(CARD_NUMBER_MAX_LEN).collect()
}

/// Re-inserts the month separator once two characters are present: `0120` becomes `01/20`.
pub fn format_expiry_date(raw: &str) -> String {
    let stripped: Vec<char> = raw.chars().filter(|ch| *ch != '/').collect();
    let mut formatted = String::with_capacity(EXPIRY_DATE_LEN);
    for (position, ch) in stripped.iter().enumerate() {
        if position == 2 {
            formatted.push('/');
        }
        formatted.push(*ch);
    }
    if stripped.len() == 2 {
        formatted.push('/');
    }
    formatted.chars().take(EXPIRY_DATE_LEN).collect()
}

pub fn format_cvv(raw: &str) -> String {
    raw.chars()
        .filter(|ch| ch.is_ascii_digit())
        .take(CVV_MAX_LEN)
        .collect()
}

/// Returns the text unchanged when it is a valid partial amount, `None` when
/// the keystroke should be refused.
pub fn accept_custom_amount(raw: &str) -> Option<String> {
    if CUSTOM_AMOUNT_PATTERN.is_match(raw) {
        Some(raw.to_string())
    } else {
        None
    }
}

/// Dispatches to the formatter registered for `field`; other fields pass through.
pub fn format_text_field(field: TextField, raw: &str) -> String {
    match field {
        TextField::CardNumber => format_card_number(raw),
        TextField::ExpiryDate => format_expiry_date(raw),
        TextField::Cvv => format_cvv(raw),
        _ => raw.to_string(),
    }
}
