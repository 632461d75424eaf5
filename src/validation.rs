//! Input validation for request bodies.
//!
//! Every create/update DTO implements [`Validate`]. Checks accumulate into a
//! [`Validator`] so a single response reports every failing field.

use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_TEXT_LEN: usize = 5000;
pub const MIN_PASSWORD_LEN: usize = 6;

/// One failing field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Error)]
#[error("invalid fields: {}", field_list(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn field_list(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field: field.into(),
            message: message.into(),
        }])
    }

    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.field.as_str()).collect()
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        // First failure per field wins.
        if !self.errors.iter().any(|e| e.field == field) {
            self.errors.push(FieldError {
                field: field.to_string(),
                message: message.into(),
            });
        }
        self
    }

    /// Non-blank check. Returns whether the value is present.
    pub fn required(&mut self, field: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.error(field, "is required");
            false
        } else {
            true
        }
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.trim().chars().count() < min {
            self.error(field, format!("must be at least {min} characters"));
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.error(field, format!("must be at most {max} characters"));
        }
        self
    }

    /// Required text between `min` and `max` characters.
    pub fn text(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        if self.required(field, value) {
            self.min_len(field, value, min).max_len(field, value, max);
        }
        self
    }

    /// Text that may be absent; when present it is checked like [`Validator::text`].
    pub fn optional_text(
        &mut self,
        field: &str,
        value: Option<&str>,
        min: usize,
        max: usize,
    ) -> &mut Self {
        if let Some(value) = value {
            self.text(field, value, min, max);
        }
        self
    }

    /// Numeric string (prices, salaries): a non-negative decimal.
    pub fn numeric(&mut self, field: &str, value: &str) -> &mut Self {
        if !self.required(field, value) {
            return self;
        }
        match Decimal::from_str(value.trim()) {
            Ok(n) if n.is_sign_negative() => self.error(field, "must not be negative"),
            Ok(_) => self,
            Err(_) => self.error(field, "must be a number"),
        }
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if self.required(field, value) && !is_email(value.trim()) {
            self.error(field, "must be a valid email address");
        }
        self
    }

    pub fn phone(&mut self, field: &str, value: &str) -> &mut Self {
        if self.required(field, value) && !is_phone(value.trim()) {
            self.error(field, "must be a valid phone number");
        }
        self
    }

    pub fn url(&mut self, field: &str, value: &str) -> &mut Self {
        if self.required(field, value) && !is_http_url(value.trim()) {
            self.error(field, "must be an absolute http(s) URL");
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

pub(crate) fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    }
}

fn is_phone(value: &str) -> bool {
    let body = value.strip_prefix('+').unwrap_or(value);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
    {
        return false;
    }
    let digits = body.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits)
}

fn is_http_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}
