use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::LinkhutError;

pub const MAX_URL_LENGTH: usize = 2048;

/// Check that a URL is something LinkHut will accept as a bookmark target.
pub fn verify_url(input: &str) -> Result<(), LinkhutError> {
    if !(input.starts_with("http://") || input.starts_with("https://")) {
        return Err(LinkhutError::InvalidUrl(
            "must start with http:// or https://".to_string(),
        ));
    }

    if input.len() > MAX_URL_LENGTH {
        return Err(LinkhutError::InvalidUrl(format!(
            "length exceeds {} characters",
            MAX_URL_LENGTH
        )));
    }

    url::Url::parse(input).map_err(|e| LinkhutError::InvalidUrl(format!("{}: {}", input, e)))?;

    Ok(())
}

/// Flatten repeated `--tag` values, each of which may itself be a comma or
/// whitespace separated list. First occurrence wins.
pub fn parse_tags<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for value in values {
        for tag in value
            .as_ref()
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
    }
    tags
}

/// Normalize a user-supplied date into the `CCYY-MM-DDThh:mm:ssZ` form the
/// posts endpoint expects.
pub fn normalize_date(input: &str) -> Result<String, LinkhutError> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(format!("{}T00:00:00Z", date.format("%Y-%m-%d")));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true));
    }

    Err(LinkhutError::InvalidDate(input.to_string()))
}

/// Hide all but the first and last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
}
