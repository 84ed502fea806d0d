// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the gate and its downstream collaborators.

use thiserror::Error;

/// Failures outside field validation.
///
/// These never reach a client verbatim; handlers log them and answer with a
/// generic message.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Rate limit store error: {0}")]
    Store(String),

    #[error("Email delivery failed: {0}")]
    Mail(String),

    #[error("Enrollment insert failed: {0}")]
    Persistence(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GateError>;
