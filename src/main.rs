// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission Gate Service
//!
//! Serves the contact and enrollment form endpoints of the website.
//!
//! ## Endpoints
//!
//! - `POST /contact` (alias `/send-contact-email`)
//! - `POST /enroll` (alias `/send-enrollment-email`)
//! - `GET /health`, `GET /healthz`
//! - `GET /metrics` when metrics are enabled
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (and a `.env` file if
//! present):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_MAX`: Submissions per client per window (default: 5)
//! - `RATE_LIMIT_WINDOW_SECS`: Window length (default: 3600)
//! - `RESEND_API_KEY`: Email API key; notifications are only logged without it
//! - `SUPABASE_URL`, `SUPABASE_SERVICE_ROLE_KEY`: Enrollment database

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use submission_gate::{
    config::Config,
    enrollments::store_from_config,
    handlers::{router, AppState},
    mail::mailer_from_config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        mail_configured = config.mail.api_key.is_some(),
        store_configured = config.store.url.is_some(),
        "Starting submission gate"
    );

    let mailer = mailer_from_config(&config.mail);
    let enrollments = store_from_config(&config.store)?;
    let state = Arc::new(AppState::new(config.clone(), mailer, enrollments)?);

    // Spawn sweep task so records of departed clients do not pile up
    let sweep_state = state.clone();
    let sweep_every = config.rate_limit.sweep_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            sweep_state.gate.limiter().sweep().await;
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
