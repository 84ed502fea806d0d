// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Abuse patterns for security testing.

use super::generators;
use serde_json::json;
use submission_gate::FormKind;

/// What each simulated request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Well-formed submission for the form
    Valid,
    /// Honeypot filled in
    Bot,
    /// Email fails the shape check
    InvalidEmail,
    /// Body is not a JSON object
    Malformed,
}

/// Abuse pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of submissions to send
    pub total_requests: usize,
    /// Number of unique client identities to simulate
    pub unique_identities: usize,
    /// Form being targeted
    pub form: FormKind,
    /// Payload carried by every request
    pub payload: Payload,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_identities: 1,
            form: FormKind::Contact,
            payload: Payload::Valid,
        }
    }
}

/// Predefined abuse patterns.
impl AttackConfig {
    /// One client hammering the contact form with valid messages.
    pub fn single_identity_flood() -> Self {
        Self {
            total_requests: 200,
            unique_identities: 1,
            ..Default::default()
        }
    }

    /// Many clients, a few submissions each.
    pub fn distributed_submissions() -> Self {
        Self {
            total_requests: 500,
            unique_identities: 100,
            form: FormKind::Enrollment,
            ..Default::default()
        }
    }

    /// Spam bot filling in every field, honeypot included.
    pub fn honeypot_bot() -> Self {
        Self {
            total_requests: 50,
            unique_identities: 25,
            payload: Payload::Bot,
            ..Default::default()
        }
    }

    /// Probing the validator with bad emails from one client.
    pub fn validation_probe() -> Self {
        Self {
            total_requests: 40,
            unique_identities: 1,
            form: FormKind::Enrollment,
            payload: Payload::InvalidEmail,
        }
    }

    /// Garbage bodies from a handful of clients.
    pub fn malformed_flood() -> Self {
        Self {
            total_requests: 60,
            unique_identities: 3,
            payload: Payload::Malformed,
            ..Default::default()
        }
    }

    /// Request body for the `i`th request.
    pub fn body(&self, i: usize) -> Vec<u8> {
        match self.payload {
            Payload::Valid => {
                let value = match self.form {
                    FormKind::Contact => generators::valid_contact(i),
                    FormKind::Enrollment => generators::valid_enrollment(i),
                };
                value.to_string().into_bytes()
            }
            Payload::Bot => generators::bot_payload(i).to_string().into_bytes(),
            Payload::InvalidEmail => {
                let emails = generators::generate_invalid_emails();
                let mut value = generators::valid_enrollment(i);
                value["email"] = json!(emails[i % emails.len()]);
                value.to_string().into_bytes()
            }
            Payload::Malformed => {
                let bodies = generators::generate_malformed_bodies();
                bodies[i % bodies.len()].to_vec()
            }
        }
    }

    /// Most submissions any single quota can let through.
    pub fn max_quota_passes(&self, max_requests: u32) -> usize {
        let per_identity = self.total_requests.div_ceil(self.unique_identities);
        self.unique_identities * per_identity.min(max_requests as usize)
    }
}
