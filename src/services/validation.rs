use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::errors::{CoreError, CoreResult};

const MAX_NAME_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 1000;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap());

/// Trimmed, non-empty name of bounded length
pub fn require_name(name: &str, what: &str) -> CoreResult<String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(CoreError::validation(format!("{} name cannot be empty", what)));
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::validation(format!(
            "{} name is too long (max {} characters)",
            what, MAX_NAME_LENGTH
        )));
    }

    Ok(trimmed.to_string())
}

/// Blank descriptions are stored as absent
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.chars().take(MAX_DESCRIPTION_LENGTH).collect())
        }
    })
}

pub fn validate_color(color: &str) -> CoreResult<String> {
    let trimmed = color.trim();
    if HEX_COLOR.is_match(trimmed) {
        Ok(trimmed.to_uppercase())
    } else {
        Err(CoreError::validation(format!(
            "Invalid color '{}', expected #RGB, #RRGGBB or #RRGGBBAA",
            color
        )))
    }
}

pub fn validate_count(count: i32) -> CoreResult<i32> {
    if count < 1 {
        return Err(CoreError::validation(format!(
            "Count must be at least 1, got {}",
            count
        )));
    }
    Ok(count)
}

pub fn validate_server_url(raw: &str) -> CoreResult<String> {
    let parsed = Url::parse(raw.trim())
        .map_err(|e| CoreError::validation(format!("Invalid server URL '{}': {}", raw, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        other => Err(CoreError::validation(format!(
            "Unsupported URL scheme '{}'",
            other
        ))),
    }
}
