use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

use warbler_types::{LoginForm, MessageForm, NewUser, UserEditForm, MAX_MESSAGE_LENGTH};

/// Minimum password length accepted by the signup and login forms
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Loose email shape check: something@something.tld, no whitespace
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Failed to compile email regex")
});

/// Per-field error messages for a submitted form, keyed by field name
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first message for a field wins
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Check whether a string looks like an email address
///
/// # Examples
///
/// ```
/// use warbler_server::validation::is_valid_email;
/// assert!(is_valid_email("test@test.com"));
/// assert!(!is_valid_email("not an email"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

pub fn validate_signup(form: &NewUser) -> FormErrors {
    let mut errors = FormErrors::new();

    if is_blank(form.username.as_deref()) {
        errors.add("username", "This field is required.");
    }

    match form.email.as_deref() {
        e if is_blank(e) => errors.add("email", "This field is required."),
        Some(e) if !is_valid_email(e) => errors.add("email", "Invalid email address."),
        _ => {}
    }

    let password_len = form.password.as_deref().map_or(0, |p| p.chars().count());
    if password_len < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("Field must be at least {} characters long.", MIN_PASSWORD_LENGTH),
        );
    }

    errors
}

pub fn validate_login(form: &LoginForm) -> FormErrors {
    let mut errors = FormErrors::new();

    if form.username.trim().is_empty() {
        errors.add("username", "This field is required.");
    }
    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("Field must be at least {} characters long.", MIN_PASSWORD_LENGTH),
        );
    }

    errors
}

pub fn validate_message(form: &MessageForm) -> FormErrors {
    let mut errors = FormErrors::new();
    let text = form.text.trim();

    if text.is_empty() {
        errors.add("text", "This field is required.");
    } else if text.chars().count() > MAX_MESSAGE_LENGTH {
        errors.add(
            "text",
            format!("Field cannot be longer than {} characters.", MAX_MESSAGE_LENGTH),
        );
    }

    errors
}

pub fn validate_user_edit(form: &UserEditForm) -> FormErrors {
    let mut errors = FormErrors::new();

    if form.username.trim().is_empty() {
        errors.add("username", "This field is required.");
    }
    if form.email.trim().is_empty() {
        errors.add("email", "This field is required.");
    } else if !is_valid_email(&form.email) {
        errors.add("email", "Invalid email address.");
    }
    if form.password.is_empty() {
        errors.add("password", "This field is required.");
    }

    errors
}
