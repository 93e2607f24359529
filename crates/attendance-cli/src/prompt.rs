//! Terminal prompts.

use std::str::FromStr;

use attendance_core::error::AppError;

fn input_error(e: dialoguer::Error) -> AppError {
    AppError::input(format!("Input error: {e}"))
}

/// Ask for a line of text. Blank input is not accepted.
pub fn text(prompt: &str) -> Result<String, AppError> {
    dialoguer::Input::<String>::new()
        .with_prompt(prompt)
        .interact_text()
        .map_err(input_error)
}

/// Ask for a line of text, offering `default`.
pub fn text_with_default(prompt: &str, default: &str) -> Result<String, AppError> {
    dialoguer::Input::<String>::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()
        .map_err(input_error)
}

/// Ask for an optional line of text; blank means `None`.
pub fn optional_text(prompt: &str) -> Result<Option<String>, AppError> {
    let value: String = dialoguer::Input::new()
        .with_prompt(format!("{prompt} (optional, press Enter to skip)"))
        .allow_empty(true)
        .interact_text()
        .map_err(input_error)?;
    let value = value.trim();
    Ok(if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    })
}

/// Ask for a value and parse it, re-asking until it parses.
pub fn parsed<T>(prompt: &str, default: Option<&str>) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    loop {
        let raw = match default {
            Some(default) => text_with_default(prompt, default)?,
            None => text(prompt)?,
        };
        match raw.trim().parse() {
            Ok(value) => return Ok(value),
            Err(e) => crate::output::print_warning(&format!("'{}': {e}", raw.trim())),
        }
    }
}

/// Ask for a password without echo.
pub fn password(prompt: &str) -> Result<String, AppError> {
    dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(input_error)
}

/// Ask for a new password twice.
pub fn new_password(prompt: &str) -> Result<String, AppError> {
    dialoguer::Password::new()
        .with_prompt(prompt)
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(input_error)
}

/// Ask for a new password twice; blank means "unchanged".
pub fn optional_new_password(prompt: &str) -> Result<Option<String>, AppError> {
    let value = dialoguer::Password::new()
        .with_prompt(format!("{prompt} (optional, press Enter to skip)"))
        .with_confirmation("Confirm password", "Passwords do not match")
        .allow_empty_password(true)
        .interact()
        .map_err(input_error)?;
    Ok(if value.is_empty() { None } else { Some(value) })
}

/// Yes/no question defaulting to "no".
pub fn confirm(prompt: &str) -> Result<bool, AppError> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(input_error)
}

/// Pick one of `items`; returns its index.
pub fn select<T: std::fmt::Display>(prompt: &str, items: &[T]) -> Result<usize, AppError> {
    dialoguer::Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()
        .map_err(input_error)
}
