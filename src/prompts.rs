use anyhow::{Context, Result};
use inquire::{validator::Validation, Confirm, Password, PasswordDisplayMode, Text};
use std::error::Error;

use crate::utils::{parse_tags, verify_url};

/// Prompt for a URL with validation
pub fn prompt_url() -> Result<String> {
    let url_validator = |input: &str| -> Result<Validation, Box<dyn Error + Send + Sync>> {
        if input.trim().is_empty() {
            return Ok(Validation::Invalid("URL cannot be empty".into()));
        }

        match verify_url(input.trim()) {
            Ok(()) => Ok(Validation::Valid),
            Err(e) => Ok(Validation::Invalid(e.to_string().into())),
        }
    };

    let url = Text::new("URL:")
        .with_validator(url_validator)
        .prompt()
        .context("Failed to read URL input")?;
    Ok(url.trim().to_string())
}

fn prompt_optional(message: &str, what: &str) -> Result<Option<String>> {
    let value = Text::new(message)
        .prompt()
        .with_context(|| format!("Failed to read {} input", what))?;

    let trimmed = value.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

pub fn prompt_title() -> Result<Option<String>> {
    prompt_optional("Title (optional, press Enter to fetch automatically):", "title")
}

pub fn prompt_note() -> Result<Option<String>> {
    prompt_optional("Note (optional, press Enter to skip):", "note")
}

/// Comma or space separated; empty means "suggest tags for me".
pub fn prompt_tags() -> Result<Option<Vec<String>>> {
    let tags = prompt_optional("Tags (optional, press Enter for suggestions):", "tags")?;
    Ok(tags.map(|t| parse_tags(&[t])))
}

pub fn confirm(message: &str) -> Result<bool> {
    Confirm::new(message)
        .with_default(false)
        .prompt()
        .context("Failed to read confirmation")
}

pub fn prompt_secret(message: &str) -> Result<Option<String>> {
    let secret = Password::new(message)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read secret input")?;

    let trimmed = secret.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}
