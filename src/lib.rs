// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission Gate
//!
//! This crate guards the contact and enrollment forms of the training
//! institute website. Every submission passes through the same gate before
//! anything is stored or sent:
//!
//! - Per-client fixed-window rate limiting (5 per hour default)
//! - Honeypot bot detection, answered with a fake success
//! - Required field, length and email shape validation
//! - Trimming and lower-casing of accepted fields
//! - HTML escaping of every value placed in a notification email

pub mod clock;
pub mod config;
pub mod enrollments;
pub mod error;
pub mod escape;
pub mod gate;
pub mod handlers;
pub mod limiter;
pub mod mail;
pub mod metrics;
pub mod validator;

pub use config::Config;
pub use error::GateError;
pub use gate::{client_identity, GateVerdict, SubmissionGate};
pub use limiter::{MemoryRateLimitStore, RateLimitResult, RateLimitStore, RateLimiter};
pub use validator::{FormKind, SubmissionValidator, ValidationError, ValidationVerdict};
