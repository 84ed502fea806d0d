// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Contact and enrollment form validator.
//!
//! Checks run in a fixed order and stop at the first failure:
//! - Honeypot (bot) detection
//! - Required field presence
//! - Field length limits
//! - Email shape, and phone length for enrollments
//!
//! Accepted submissions come back trimmed, with the email lower-cased and
//! absent optional fields set to the empty string.

use crate::config::ValidationConfig;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Permissive email shape: something, `@`, something, `.`, something.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

/// Which form a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Contact,
    Enrollment,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Contact => "contact",
            FormKind::Enrollment => "enrollment",
        }
    }

    fn required_fields(&self) -> &'static [Field] {
        match self {
            FormKind::Contact => &[Field::Name, Field::Email, Field::Message],
            FormKind::Enrollment => &[Field::Name, Field::Email, Field::Phone, Field::Course],
        }
    }
}

impl std::fmt::Display for FormKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Phone,
    Message,
    Course,
    Qualification,
}

impl Field {
    /// JSON key the browser sends.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Message => "message",
            Field::Course => "course",
            Field::Qualification => "qualification",
        }
    }

    /// Human label used in error messages.
    fn label(&self, kind: FormKind) -> &'static str {
        match (self, kind) {
            (Field::Name, _) => "Name",
            (Field::Email, _) => "Email",
            (Field::Phone, _) => "Phone",
            (Field::Message, _) => "Message",
            (Field::Course, FormKind::Enrollment) => "Course selection",
            (Field::Course, _) => "Course",
            (Field::Qualification, _) => "Qualification",
        }
    }
}

/// Validation error types. The `Display` output is returned to the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid request body")]
    MalformedBody,

    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be less than {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Valid phone number is required")]
    InvalidPhone,
}

/// Raw, untrusted form input.
///
/// Only string values are kept; a field sent as any other JSON type is
/// treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub course: Option<String>,
    pub qualification: Option<String>,
    pub honeypot: Option<String>,
}

impl SubmissionRequest {
    /// Parse a JSON request body. Anything but a JSON object is malformed.
    pub fn from_slice(body: &[u8], honeypot_field: &str) -> Result<Self, ValidationError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|_| ValidationError::MalformedBody)?;
        Self::from_json(&value, honeypot_field)
    }

    pub fn from_json(value: &Value, honeypot_field: &str) -> Result<Self, ValidationError> {
        let object = value.as_object().ok_or(ValidationError::MalformedBody)?;
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            name: text(Field::Name.key()),
            email: text(Field::Email.key()),
            phone: text(Field::Phone.key()),
            message: text(Field::Message.key()),
            course: text(Field::Course.key()),
            qualification: text(Field::Qualification.key()),
            honeypot: text(honeypot_field),
        })
    }

    /// Trimmed value of a field, empty when absent.
    pub fn trimmed(&self, field: Field) -> &str {
        let value = match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Message => &self.message,
            Field::Course => &self.course,
            Field::Qualification => &self.qualification,
        };
        value.as_deref().map(str::trim).unwrap_or("")
    }
}

/// Submission that passed every check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizedSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub course: String,
    pub qualification: String,
}

/// Result of validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    /// Every check passed
    Accepted(SanitizedSubmission),
    /// A check failed; the error names the reason
    Rejected(ValidationError),
    /// Honeypot filled in; answer as if accepted, do nothing
    Discarded,
}

impl ValidationVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationVerdict::Accepted(_))
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationVerdict::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

/// Contact and enrollment form validator.
pub struct SubmissionValidator {
    config: ValidationConfig,
}

impl SubmissionValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn honeypot_field(&self) -> &str {
        &self.config.honeypot_field
    }

    fn length_limits(&self) -> [(Field, usize); 6] {
        [
            (Field::Name, self.config.max_name_len),
            (Field::Email, self.config.max_email_len),
            (Field::Phone, self.config.max_phone_len),
            (Field::Message, self.config.max_message_len),
            (Field::Course, self.config.max_course_len),
            (Field::Qualification, self.config.max_qualification_len),
        ]
    }

    /// Validate a submission for the given form.
    pub fn validate(&self, kind: FormKind, request: &SubmissionRequest) -> ValidationVerdict {
        if request
            .honeypot
            .as_deref()
            .is_some_and(|h| !h.trim().is_empty())
        {
            debug!(form = %kind, "Honeypot field filled");
            return ValidationVerdict::Discarded;
        }

        for field in kind.required_fields() {
            if request.trimmed(*field).is_empty() {
                debug!(form = %kind, field = field.key(), "Missing required field");
                return ValidationVerdict::Rejected(ValidationError::Required(field.label(kind)));
            }
        }

        for (field, max) in self.length_limits() {
            if request.trimmed(field).chars().count() > max {
                debug!(form = %kind, field = field.key(), max, "Field too long");
                return ValidationVerdict::Rejected(ValidationError::TooLong {
                    field: field.label(kind),
                    max,
                });
            }
        }

        let email = request.trimmed(Field::Email);
        if !email_regex().is_match(email) {
            debug!(form = %kind, "Invalid email format");
            return ValidationVerdict::Rejected(ValidationError::InvalidEmail);
        }

        let phone = request.trimmed(Field::Phone);
        if kind == FormKind::Enrollment && phone.chars().count() < self.config.min_phone_len {
            debug!(form = %kind, "Phone number too short");
            return ValidationVerdict::Rejected(ValidationError::InvalidPhone);
        }

        ValidationVerdict::Accepted(SanitizedSubmission {
            name: request.trimmed(Field::Name).to_string(),
            email: email.to_lowercase(),
            phone: phone.to_string(),
            message: request.trimmed(Field::Message).to_string(),
            course: request.trimmed(Field::Course).to_string(),
            qualification: request.trimmed(Field::Qualification).to_string(),
        })
    }
}
