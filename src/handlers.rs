// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact and enrollment endpoints.
//!
//! Side effects (enrollment insert, notification email) happen only after the
//! gate accepts a submission. Downstream failures are logged here and
//! answered with a generic message.

use crate::config::{Config, CorsConfig};
use crate::enrollments::{EnrollmentRecord, EnrollmentStore};
use crate::error::Result;
use crate::gate::{client_identity, GateVerdict, SubmissionGate};
use crate::limiter::RateLimiter;
use crate::mail::{render_contact, render_enrollment, Mailer};
use crate::metrics::GateMetrics;
use crate::validator::{FormKind, SanitizedSubmission, SubmissionValidator};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";
pub const CONTACT_FAILED_MESSAGE: &str = "Failed to send message. Please try again later.";
pub const ENROLLMENT_FAILED_MESSAGE: &str = "Failed to submit enrollment. Please try again.";

/// Shared application state.
pub struct AppState {
    pub gate: SubmissionGate,
    pub mailer: Box<dyn Mailer>,
    pub enrollments: Box<dyn EnrollmentStore>,
    pub metrics: GateMetrics,
    pub config: Config,
}

impl AppState {
    /// Wire a gate with an in-memory rate limit store around the given
    /// collaborators.
    pub fn new(
        config: Config,
        mailer: Box<dyn Mailer>,
        enrollments: Box<dyn EnrollmentStore>,
    ) -> std::result::Result<Self, prometheus::Error> {
        let gate = SubmissionGate::new(
            RateLimiter::new(config.rate_limit.clone()),
            SubmissionValidator::new(config.validation.clone()),
        );
        Ok(Self {
            gate,
            mailer,
            enrollments,
            metrics: GateMetrics::new()?,
            config,
        })
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Success response body.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/contact", post(contact))
        .route("/send-contact-email", post(contact))
        .route("/enroll", post(enroll))
        .route("/send-enrollment-email", post(enroll))
        .route("/health", get(health))
        .route("/healthz", get(health));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    app.layer(cors_layer(&state.config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS headers for preflight and regular responses.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let allow_headers: Vec<HeaderName> = config
        .allow_headers
        .iter()
        .filter_map(|h| h.trim().parse().ok())
        .collect();

    let allow_origin = if config.allow_origin.trim() == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .allow_origin
            .split(',')
            .filter_map(|o| o.trim().parse().ok())
            .collect();
        if origins.is_empty() {
            warn!(origin = %config.allow_origin, "No valid CORS origin configured");
        }
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(allow_headers)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "submission-gate",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.export() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to export metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Contact form submission.
pub async fn contact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    submit(&state, FormKind::Contact, &headers, &body).await
}

/// Enrollment form submission.
pub async fn enroll(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    submit(&state, FormKind::Enrollment, &headers, &body).await
}

async fn submit(state: &AppState, kind: FormKind, headers: &HeaderMap, body: &[u8]) -> Response {
    let identity = client_identity(headers);
    let verdict = state.gate.evaluate(&identity, kind, body).await;
    state.metrics.record_verdict(kind.as_str(), verdict.outcome());

    match verdict {
        GateVerdict::RateLimited { retry_after_secs } => (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_after_secs.to_string())],
            Json(ErrorResponse {
                error: RATE_LIMITED_MESSAGE.to_string(),
            }),
        )
            .into_response(),
        // Bots get the same answer as a real submission.
        GateVerdict::Discarded => success(),
        GateVerdict::Rejected(err) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response(),
        GateVerdict::Accepted(submission) => match deliver(state, kind, &submission).await {
            Ok(()) => {
                info!(identity = %identity, form = %kind, "Submission delivered");
                success()
            }
            Err(err) => {
                error!(identity = %identity, form = %kind, error = %err, "Submission delivery failed");
                let message = match kind {
                    FormKind::Contact => CONTACT_FAILED_MESSAGE,
                    FormKind::Enrollment => ENROLLMENT_FAILED_MESSAGE,
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: message.to_string(),
                    }),
                )
                    .into_response()
            }
        },
    }
}

/// Run the side effects for an accepted submission.
///
/// The enrollment insert is best effort: a failure is logged and the
/// notification is still sent.
async fn deliver(state: &AppState, kind: FormKind, submission: &SanitizedSubmission) -> Result<()> {
    let now = Utc::now();
    let email = match kind {
        FormKind::Contact => render_contact(submission, &state.config.mail, now),
        FormKind::Enrollment => {
            let record = EnrollmentRecord::from(submission);
            if let Err(err) = state.enrollments.insert(&record).await {
                error!(error = %err, "Enrollment insert failed, sending notification anyway");
                state.metrics.record_downstream_failure("store");
            }
            render_enrollment(submission, &state.config.mail, now)
        }
    };

    state.mailer.send(&email).await.map_err(|err| {
        state.metrics.record_downstream_failure("mail");
        err
    })
}

fn success() -> Response {
    (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
}
