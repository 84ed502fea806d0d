// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the submission gate service.
//!
//! Defaults match the limits the website forms were built against: five
//! submissions per client per hour, and the field lengths enforced by the
//! contact and enrollment forms.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest accepted rate limit window: one year.
pub const MAX_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration for the submission gate service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Field validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Notification email configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Enrollment record store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum submissions per client per window (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 3600)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// How often expired records are swept from the store (default: 60)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// Field limits applied by the validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,

    #[serde(default = "default_max_email_len")]
    pub max_email_len: usize,

    #[serde(default = "default_max_phone_len")]
    pub max_phone_len: usize,

    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,

    #[serde(default = "default_max_course_len")]
    pub max_course_len: usize,

    #[serde(default = "default_max_qualification_len")]
    pub max_qualification_len: usize,

    /// Shortest phone number accepted on enrollment (default: 10)
    #[serde(default = "default_min_phone_len")]
    pub min_phone_len: usize,

    /// Name of the hidden field bots tend to fill in (default: honeypot)
    #[serde(default = "default_honeypot_field")]
    pub honeypot_field: String,
}

/// CORS headers returned on every response and on preflight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origin; `*` allows any (default: *)
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,

    /// Request headers browsers may send
    #[serde(default = "default_allow_headers")]
    pub allow_headers: Vec<String>,
}

/// Outbound notification email configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Email API endpoint (default: https://api.resend.com/emails)
    #[serde(default = "default_mail_api_url")]
    pub api_url: String,

    /// API key; when unset, notifications are only logged
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_contact_from")]
    pub contact_from: String,

    #[serde(default = "default_enrollment_from")]
    pub enrollment_from: String,

    /// Inbox that receives every notification
    #[serde(default = "default_notify_to")]
    pub notify_to: Vec<String>,
}

/// Hosted database configuration for enrollment records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Project base URL; when unset, records are only logged
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub service_role_key: Option<String>,

    #[serde(default = "default_enrollment_table")]
    pub table: String,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_name_len() -> usize {
    100
}

fn default_max_email_len() -> usize {
    255
}

fn default_max_phone_len() -> usize {
    20
}

fn default_max_message_len() -> usize {
    2000
}

fn default_max_course_len() -> usize {
    100
}

fn default_max_qualification_len() -> usize {
    200
}

fn default_min_phone_len() -> usize {
    10
}

fn default_honeypot_field() -> String {
    "honeypot".to_string()
}

fn default_allow_origin() -> String {
    "*".to_string()
}

fn default_allow_headers() -> Vec<String> {
    [
        "authorization",
        "x-client-info",
        "apikey",
        "content-type",
        "x-supabase-client-platform",
        "x-supabase-client-platform-version",
        "x-supabase-client-runtime",
        "x-supabase-client-runtime-version",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect()
}

fn default_mail_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_contact_from() -> String {
    "EDSEC Contact Form <onboarding@resend.dev>".to_string()
}

fn default_enrollment_from() -> String {
    "EDSEC Enrollment <onboarding@resend.dev>".to_string()
}

fn default_notify_to() -> Vec<String> {
    vec!["edsecinnovations@gmail.com".to_string()]
}

fn default_enrollment_table() -> String {
    "student_enrollments".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            validation: ValidationConfig::default(),
            cors: CorsConfig::default(),
            mail: MailConfig::default(),
            store: StoreConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_name_len: default_max_name_len(),
            max_email_len: default_max_email_len(),
            max_phone_len: default_max_phone_len(),
            max_message_len: default_max_message_len(),
            max_course_len: default_max_course_len(),
            max_qualification_len: default_max_qualification_len(),
            min_phone_len: default_min_phone_len(),
            honeypot_field: default_honeypot_field(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: default_allow_origin(),
            allow_headers: default_allow_headers(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: default_mail_api_url(),
            api_key: None,
            contact_from: default_contact_from(),
            enrollment_from: default_enrollment_from(),
            notify_to: default_notify_to(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            service_role_key: None,
            table: default_enrollment_table(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration, clamped to `1..=MAX_WINDOW_SECS`
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs.clamp(1, MAX_WINDOW_SECS))
    }

    /// Get the sweep interval
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Config {
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            rate_limit: RateLimitConfig {
                max_requests: non_empty("RATE_LIMIT_MAX")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.rate_limit.max_requests),
                window_secs: non_empty("RATE_LIMIT_WINDOW_SECS")
                    .and_then(|v| v.parse::<u64>().ok())
                    .filter(|secs| (1..=MAX_WINDOW_SECS).contains(secs))
                    .unwrap_or(defaults.rate_limit.window_secs),
                ..defaults.rate_limit
            },
            mail: MailConfig {
                api_url: non_empty("RESEND_API_URL").unwrap_or(defaults.mail.api_url),
                api_key: non_empty("RESEND_API_KEY"),
                contact_from: non_empty("MAIL_FROM_CONTACT").unwrap_or(defaults.mail.contact_from),
                enrollment_from: non_empty("MAIL_FROM_ENROLLMENT")
                    .unwrap_or(defaults.mail.enrollment_from),
                notify_to: non_empty("MAIL_NOTIFY_TO")
                    .map(|v| {
                        v.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or(defaults.mail.notify_to),
            },
            store: StoreConfig {
                url: non_empty("SUPABASE_URL"),
                service_role_key: non_empty("SUPABASE_SERVICE_ROLE_KEY"),
                table: non_empty("ENROLLMENT_TABLE").unwrap_or(defaults.store.table),
            },
            metrics: MetricsConfig {
                enabled: non_empty("METRICS_ENABLED")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.metrics.enabled),
                ..defaults.metrics
            },
            ..defaults
        }
    }
}
