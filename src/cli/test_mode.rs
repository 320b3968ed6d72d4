//! Scripted answers for prompts, read from `PLEDGE_TEST_INPUTS`.
//!
//! Tokens are separated by `|`. `<KEEP>`, `<BACK>`, `<CANCEL>` and `<BLANK>`
//! map to the matching prompt actions; anything else is typed verbatim.
//! `<BLANK>` submits an empty answer even when the field already has a value.

use once_cell::sync::Lazy;
use std::{collections::VecDeque, env, sync::Mutex};

pub const INPUTS_ENV: &str = "PLEDGE_TEST_INPUTS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedInput {
    Value(String),
    Blank,
    Keep,
    Back,
    Cancel,
}

struct InputQueue {
    enabled: bool,
    inputs: VecDeque<ScriptedInput>,
}

impl InputQueue {
    fn from_env() -> Self {
        match env::var(INPUTS_ENV) {
            Ok(raw) => Self {
                enabled: true,
                inputs: parse_inputs(&raw),
            },
            Err(_) => Self {
                enabled: false,
                inputs: VecDeque::new(),
            },
        }
    }
}

static INPUTS: Lazy<Mutex<InputQueue>> = Lazy::new(|| Mutex::new(InputQueue::from_env()));

pub fn is_enabled() -> bool {
    INPUTS
        .lock()
        .map(|guard| guard.enabled)
        .unwrap_or(false)
}

/// Next scripted answer, or `None` when prompts should read the terminal.
/// An exhausted script cancels the wizard.
pub fn next_input(label: &str) -> Option<ScriptedInput> {
    let mut guard = INPUTS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if !guard.enabled {
        return None;
    }
    match guard.inputs.pop_front() {
        Some(input) => Some(input),
        None => {
            tracing::warn!(prompt = label, "scripted inputs exhausted");
            Some(ScriptedInput::Cancel)
        }
    }
}

fn parse_input(token: &str) -> ScriptedInput {
    match token.to_ascii_uppercase().as_str() {
        "<KEEP>" => ScriptedInput::Keep,
        "<BACK>" => ScriptedInput::Back,
        "<CANCEL>" | "<ESC>" => ScriptedInput::Cancel,
        "<BLANK>" | "<EMPTY>" => ScriptedInput::Blank,
        _ => ScriptedInput::Value(token.to_string()),
    }
}

fn parse_inputs(raw: &str) -> VecDeque<ScriptedInput> {
    raw.split('|')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(parse_input)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_map_to_actions() {
        let parsed = parse_inputs("25| <keep> |<BACK>|<blank>||Ada Lovelace|<ESC>");
        assert_eq!(
            parsed,
            VecDeque::from(vec![
                ScriptedInput::Value("25".into()),
                ScriptedInput::Keep,
                ScriptedInput::Back,
                ScriptedInput::Blank,
                ScriptedInput::Value("Ada Lovelace".into()),
                ScriptedInput::Cancel,
            ])
        );
    }
}
