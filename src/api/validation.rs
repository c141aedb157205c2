use std::sync::OnceLock;

use regex::Regex;

use super::{ApiError, FieldError};

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"))
}

const NAME_LEN: (usize, usize) = (2, 100);
const EMAIL_MAX_LEN: usize = 255;
const MESSAGE_LEN: (usize, usize) = (10, 5000);

pub fn validate_id(id: i32, resource: &str) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {resource} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Returns the pair when both are present and non-empty. Values are not trimmed.
pub fn validate_credentials<'a>(
    username: Option<&'a str>,
    password: Option<&'a str>,
) -> Result<(&'a str, &'a str), ApiError> {
    match (username, password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Ok((u, p)),
        _ => Err(ApiError::validation("Username and password are required")),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Trims every field, lowercases the email, and collects every failed rule.
pub fn validate_contact(
    name: Option<&str>,
    email: Option<&str>,
    message: Option<&str>,
) -> Result<ValidContact, ApiError> {
    let name = name.map(str::trim).unwrap_or_default();
    let email = email.map(str::trim).unwrap_or_default().to_lowercase();
    let message = message.map(str::trim).unwrap_or_default();

    let mut errors = Vec::new();

    let name_len = name.chars().count();
    if name_len == 0 {
        errors.push(FieldError::new("name", "Name is required"));
    } else if !(NAME_LEN.0..=NAME_LEN.1).contains(&name_len) {
        errors.push(FieldError::new(
            "name",
            format!(
                "Name must be between {} and {} characters",
                NAME_LEN.0, NAME_LEN.1
            ),
        ));
    }

    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if email.chars().count() > EMAIL_MAX_LEN {
        errors.push(FieldError::new(
            "email",
            format!("Email must be at most {EMAIL_MAX_LEN} characters"),
        ));
    } else if !email_regex().is_match(&email) {
        errors.push(FieldError::new("email", "Please provide a valid email"));
    }

    let message_len = message.chars().count();
    if message_len == 0 {
        errors.push(FieldError::new("message", "Message is required"));
    } else if !(MESSAGE_LEN.0..=MESSAGE_LEN.1).contains(&message_len) {
        errors.push(FieldError::new(
            "message",
            format!(
                "Message must be between {} and {} characters",
                MESSAGE_LEN.0, MESSAGE_LEN.1
            ),
        ));
    }

    if !errors.is_empty() {
        return Err(ApiError::InvalidFields(errors));
    }

    Ok(ValidContact {
        name: name.to_string(),
        email,
        message: message.to_string(),
    })
}
