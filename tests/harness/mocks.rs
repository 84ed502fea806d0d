// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Recording collaborators standing in for the email API and database.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use submission_gate::enrollments::{EnrollmentRecord, EnrollmentStore};
use submission_gate::error::{GateError, Result};
use submission_gate::mail::{Mailer, NotificationEmail};

/// Mailer that keeps every email it is asked to send.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<NotificationEmail>>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<NotificationEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &NotificationEmail) -> Result<()> {
        if self.fail {
            return Err(GateError::Mail(
                "422 validation_error: secret provider detail".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Enrollment store that keeps every inserted record.
#[derive(Clone, Default)]
pub struct RecordingStore {
    pub inserted: Arc<Mutex<Vec<EnrollmentRecord>>>,
    pub fail: bool,
}

impl RecordingStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn inserted(&self) -> Vec<EnrollmentRecord> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl EnrollmentStore for RecordingStore {
    async fn insert(&self, record: &EnrollmentRecord) -> Result<()> {
        if self.fail {
            return Err(GateError::Persistence("relation does not exist".to_string()));
        }
        self.inserted.lock().unwrap().push(record.clone());
        Ok(())
    }
}
