// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Notification emails for accepted submissions.
//!
//! Every user-supplied value is passed through [`escape_html`] before it is
//! placed in a subject or body.

use crate::config::MailConfig;
use crate::error::{GateError, Result};
use crate::escape::escape_html;
use crate::validator::SanitizedSubmission;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

/// An outbound email in the shape the email API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

/// Build the notification for a contact form submission.
pub fn render_contact(
    submission: &SanitizedSubmission,
    config: &MailConfig,
    submitted_at: DateTime<Utc>,
) -> NotificationEmail {
    let name = escape_html(&submission.name);
    let email = escape_html(&submission.email);
    let phone = escape_html(or_placeholder(&submission.phone, "Not provided"));
    let message = escape_html(&submission.message);

    let html = format!(
        "<h2>New Contact Form Submission</h2>\n\
         <p><strong>Name:</strong> {name}</p>\n\
         <p><strong>Email:</strong> {email}</p>\n\
         <p><strong>Phone:</strong> {phone}</p>\n\
         <p><strong>Message:</strong></p>\n\
         <p>{message}</p>\n\
         <p style=\"margin-top: 16px; color: #666;\">Received {}</p>",
        submitted_at.format("%Y-%m-%d %H:%M UTC"),
    );

    NotificationEmail {
        from: config.contact_from.clone(),
        to: config.notify_to.clone(),
        subject: format!("New Contact Form Submission from {name}"),
        html,
    }
}

/// Build the notification for an enrollment submission.
pub fn render_enrollment(
    submission: &SanitizedSubmission,
    config: &MailConfig,
    submitted_at: DateTime<Utc>,
) -> NotificationEmail {
    let name = escape_html(&submission.name);
    let course = escape_html(&submission.course);

    let rows = [
        ("Name", name.clone()),
        ("Email", escape_html(&submission.email)),
        ("Phone", escape_html(&submission.phone)),
        ("Course", course.clone()),
        (
            "Qualification",
            escape_html(or_placeholder(&submission.qualification, "Not provided")),
        ),
        (
            "Message",
            escape_html(or_placeholder(&submission.message, "No additional message")),
        ),
    ];

    let cell = "padding: 8px; border: 1px solid #ddd;";
    let table: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                "<tr><td style=\"{cell} font-weight: bold;\">{label}</td>\
                 <td style=\"{cell}\">{value}</td></tr>\n"
            )
        })
        .collect();

    let html = format!(
        "<h2>New Student Enrollment</h2>\n\
         <table style=\"border-collapse: collapse; width: 100%;\">\n{table}</table>\n\
         <p style=\"margin-top: 16px; color: #666;\">Submitted from the website on {}</p>",
        submitted_at.format("%Y-%m-%d %H:%M UTC"),
    );

    NotificationEmail {
        from: config.enrollment_from.clone(),
        to: config.notify_to.clone(),
        subject: format!("New Student Enrollment: {name} - {course}"),
        html,
    }
}

/// Sends notification emails.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &NotificationEmail) -> Result<()>;
}

/// Mailer for the Resend HTTP API.
pub struct ResendMailer {
    api_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ResendMailer {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            api_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &NotificationEmail) -> Result<()> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(subject = %email.subject, "Notification email accepted by provider");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(GateError::Mail(format!("provider returned {status}: {body}")))
        }
    }
}

/// Mailer that only logs. Used when no API key is configured.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &NotificationEmail) -> Result<()> {
        info!(
            to = ?email.to,
            subject = %email.subject,
            "Email delivery not configured, notification logged only"
        );
        Ok(())
    }
}

/// Pick the mailer for a configuration.
pub fn mailer_from_config(config: &MailConfig) -> Box<dyn Mailer> {
    match &config.api_key {
        Some(key) => Box::new(ResendMailer::new(config.api_url.clone(), key.clone())),
        None => Box::new(LogMailer),
    }
}
