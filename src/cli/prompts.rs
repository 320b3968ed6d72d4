use std::io;

use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::cli::test_mode::{self, ScriptedInput};

const BACK_LABEL: &str = "← Back";

pub enum TextPromptResult {
    Value(String),
    Keep,
    Back,
    Cancel,
}

pub enum ChoicePromptResult {
    Selected(usize),
    Back,
    Cancel,
}

fn to_io(err: dialoguer::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}

/// Reads one line. An empty line keeps `current` when there is one.
pub fn text_input(label: &str, current: Option<&str>) -> io::Result<TextPromptResult> {
    if let Some(scripted) = test_mode::next_input(label) {
        return Ok(scripted_text(scripted, current));
    }

    let theme = ColorfulTheme::default();
    let mut input = Input::<String>::with_theme(&theme)
        .with_prompt(label)
        .allow_empty(true);
    if let Some(value) = current.filter(|value| !value.is_empty()) {
        input = input.with_initial_text(value);
    }
    let buffer = input.interact_text().map_err(to_io)?;
    Ok(interpret_buffer(&buffer, current))
}

/// Lets the user pick one of `options`, optionally with a trailing back entry.
pub fn choice_menu(
    title: &str,
    options: &[&str],
    default: usize,
    enable_back: bool,
) -> io::Result<ChoicePromptResult> {
    if let Some(scripted) = test_mode::next_input(title) {
        return Ok(match scripted {
            ScriptedInput::Value(value) => match resolve_choice(options, &value) {
                Some(index) => ChoicePromptResult::Selected(index),
                None => ChoicePromptResult::Cancel,
            },
            ScriptedInput::Keep | ScriptedInput::Blank => ChoicePromptResult::Selected(default),
            ScriptedInput::Back if enable_back => ChoicePromptResult::Back,
            ScriptedInput::Back | ScriptedInput::Cancel => ChoicePromptResult::Cancel,
        });
    }

    let mut items: Vec<&str> = options.to_vec();
    if enable_back {
        items.push(BACK_LABEL);
    }
    let theme = ColorfulTheme::default();
    let selection = Select::with_theme(&theme)
        .with_prompt(title)
        .items(&items)
        .default(default.min(items.len().saturating_sub(1)))
        .interact_opt()
        .map_err(to_io)?;

    Ok(match selection {
        Some(index) if index < options.len() => ChoicePromptResult::Selected(index),
        Some(_) => ChoicePromptResult::Back,
        None => ChoicePromptResult::Cancel,
    })
}

fn scripted_text(scripted: ScriptedInput, current: Option<&str>) -> TextPromptResult {
    match scripted {
        ScriptedInput::Value(value) => interpret_buffer(&value, current),
        ScriptedInput::Blank => TextPromptResult::Value(String::new()),
        ScriptedInput::Keep => TextPromptResult::Keep,
        ScriptedInput::Back => TextPromptResult::Back,
        ScriptedInput::Cancel => TextPromptResult::Cancel,
    }
}

fn interpret_buffer(buffer: &str, current: Option<&str>) -> TextPromptResult {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return if current.map(|value| !value.is_empty()).unwrap_or(false) {
            TextPromptResult::Keep
        } else {
            TextPromptResult::Value(String::new())
        };
    }

    match trimmed.to_ascii_lowercase().as_str() {
        ":cancel" => TextPromptResult::Cancel,
        ":back" => TextPromptResult::Back,
        ":clear" => TextPromptResult::Value(String::new()),
        _ => TextPromptResult::Value(buffer.to_string()),
    }
}

/// Matches either a 1-based index or an option label, ignoring case.
fn resolve_choice(options: &[&str], input: &str) -> Option<usize> {
    let trimmed = input.trim();
    if let Ok(position) = trimmed.parse::<usize>() {
        return (1..=options.len()).contains(&position).then(|| position - 1);
    }
    options
        .iter()
        .position(|option| option.eq_ignore_ascii_case(trimmed))
}
