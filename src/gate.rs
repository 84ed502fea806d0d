// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! The submission gate: rate limiter first, then body parsing, then field
//! validation.
//!
//! The limiter runs before anything looks at the body, so malformed and
//! invalid submissions use up the quota exactly like valid ones.

use crate::limiter::{RateLimitResult, RateLimiter};
use crate::validator::{
    FormKind, SanitizedSubmission, SubmissionRequest, SubmissionValidator, ValidationError,
    ValidationVerdict,
};
use axum::http::HeaderMap;
use tracing::{debug, info};

/// Identity used when no forwarding header names the client.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the rate limit identity from request headers.
///
/// Takes the first hop of `X-Forwarded-For`, then `CF-Connecting-IP`,
/// then falls back to [`UNKNOWN_CLIENT`].
pub fn client_identity(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let connecting = || {
        headers
            .get("cf-connecting-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(connecting)
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// Outcome of passing one request through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateVerdict {
    /// Quota exhausted; nothing else was looked at
    RateLimited { retry_after_secs: u64 },
    /// Honeypot filled in
    Discarded,
    /// Body malformed or a field check failed
    Rejected(ValidationError),
    /// Safe to act on
    Accepted(SanitizedSubmission),
}

impl GateVerdict {
    /// Short label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            GateVerdict::RateLimited { .. } => "rate_limited",
            GateVerdict::Discarded => "discarded",
            GateVerdict::Rejected(_) => "rejected",
            GateVerdict::Accepted(_) => "accepted",
        }
    }
}

/// Rate limiter and validator composed into a single decision.
pub struct SubmissionGate {
    limiter: RateLimiter,
    validator: SubmissionValidator,
}

impl SubmissionGate {
    pub fn new(limiter: RateLimiter, validator: SubmissionValidator) -> Self {
        Self { limiter, validator }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Decide what to do with one submission.
    pub async fn evaluate(&self, identity: &str, kind: FormKind, body: &[u8]) -> GateVerdict {
        if let RateLimitResult::Limited { .. } = self.limiter.check(identity).await {
            let retry_after_secs = self.limiter.config().window_duration().as_secs();
            info!(identity, form = %kind, retry_after_secs, "Submission rate limited");
            return GateVerdict::RateLimited { retry_after_secs };
        }

        let request = match SubmissionRequest::from_slice(body, self.validator.honeypot_field()) {
            Ok(request) => request,
            Err(err) => {
                debug!(identity, form = %kind, "Malformed submission body");
                return GateVerdict::Rejected(err);
            }
        };

        match self.validator.validate(kind, &request) {
            ValidationVerdict::Accepted(submission) => GateVerdict::Accepted(submission),
            ValidationVerdict::Rejected(err) => {
                debug!(identity, form = %kind, error = %err, "Submission rejected");
                GateVerdict::Rejected(err)
            }
            ValidationVerdict::Discarded => {
                info!(identity, form = %kind, "Honeypot triggered, bot submission discarded");
                GateVerdict::Discarded
            }
        }
    }
}
