//! Input validation utilities for the service layer.
//!
//! Every failure is reported as a single-field `Error::Validation` so the JSON
//! body can point the client at the offending input.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use uuid::Uuid;

use crate::error::{Error, Result};

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.]{3,32}$").unwrap());

/// Validates email format using structural checks
///
/// # Examples
/// ```
/// use vetportal::validation::validate_email;
///
/// validate_email("owner@example.com").unwrap();
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(Error::validation("email", "Email is required"));
    }

    if email.len() > 254 {
        return Err(Error::validation("email", "Email address is too long (max 254 characters)"));
    }

    let Some((local_part, domain)) = email.split_once('@') else {
        return Err(Error::validation("email", "Invalid email format"));
    };

    if local_part.is_empty() || local_part.len() > 64 || domain.is_empty() || domain.contains('@') {
        return Err(Error::validation("email", "Invalid email format"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') || email.contains("..") {
        return Err(Error::validation("email", "Invalid email format"));
    }

    let invalid_chars = ['<', '>', '(', ')', '[', ']', '\\', ',', ';', ':', '"', ' '];
    if email.chars().any(|c| invalid_chars.contains(&c)) {
        return Err(Error::validation("email", "Invalid email format"));
    }

    Ok(())
}

/// Lowercases and trims an email so lookups and uniqueness are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates password strength and format
pub fn validate_password(password: &str, field: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(Error::validation(field, "Password must be at least 8 characters long"));
    }

    if password.len() > 128 {
        return Err(Error::validation(field, "Password is too long (max 128 characters)"));
    }

    let lowered = password.to_lowercase();
    if ["password", "12345678", "qwerty123", "admin123"].contains(&lowered.as_str()) {
        return Err(Error::validation(field, "Password is too common and weak"));
    }

    if password.contains(' ') {
        return Err(Error::validation(field, "Password cannot contain spaces"));
    }

    Ok(())
}

pub fn validate_username(username: &str) -> Result<()> {
    if !USERNAME_RE.is_match(username) {
        return Err(Error::validation(
            "username",
            "Username must be 3-32 characters: letters, numbers, underscores or periods",
        ));
    }
    Ok(())
}

/// Validates a person's display name
pub fn validate_name(name: &str) -> Result<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::validation("name", "Name is required"));
    }

    if name.chars().count() > 100 {
        return Err(Error::validation("name", "Name must be less than 100 characters"));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(Error::validation("name", "Name cannot contain control characters"));
    }

    Ok(())
}

/// Parses a UUID, reporting errors against `field`.
pub fn parse_uuid(input: &str, field: &str) -> Result<Uuid> {
    let input = input.trim();

    if input.is_empty() {
        return Err(Error::validation(field, format!("{} is required", field)));
    }

    Uuid::parse_str(input).map_err(|_| Error::validation(field, format!("Invalid {}", field)))
}

/// Parses a `YYYY-MM-DD` date, reporting errors against `field`.
pub fn parse_date(input: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| Error::validation(field, "Invalid date format, expected YYYY-MM-DD"))
}

/// Sanitizes string input by trimming whitespace
pub fn sanitize_string(input: &str) -> String {
    input.trim().to_string()
}

/// Trims `input`; `None` or blank becomes a validation error on `field`.
pub fn validate_required_string(input: Option<&str>, field: &str, max_chars: usize) -> Result<String> {
    let sanitized = sanitize_string(input.unwrap_or_default());

    if sanitized.is_empty() {
        return Err(Error::validation(field, format!("{} is required", field)));
    }

    if sanitized.chars().count() > max_chars {
        return Err(Error::validation(
            field,
            format!("{} must be at most {} characters", field, max_chars),
        ));
    }

    Ok(sanitized)
}

/// Blank optional text becomes `None`.
pub fn optional_text(input: Option<&str>) -> Option<String> {
    input.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}
