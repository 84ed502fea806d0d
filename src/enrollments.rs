// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Persistence of accepted enrollments.

use crate::config::StoreConfig;
use crate::error::{GateError, Result};
use crate::validator::SanitizedSubmission;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

/// Row inserted for each accepted enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub course: String,
    pub qualification: String,
    pub message: String,
}

impl From<&SanitizedSubmission> for EnrollmentRecord {
    fn from(s: &SanitizedSubmission) -> Self {
        Self {
            name: s.name.clone(),
            email: s.email.clone(),
            phone: s.phone.clone(),
            course: s.course.clone(),
            qualification: s.qualification.clone(),
            message: s.message.clone(),
        }
    }
}

/// Destination for enrollment records.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn insert(&self, record: &EnrollmentRecord) -> Result<()>;
}

/// Inserts rows through a Supabase (PostgREST) endpoint using the service
/// role key.
pub struct SupabaseEnrollmentStore {
    endpoint: Url,
    service_role_key: String,
    client: reqwest::Client,
}

impl SupabaseEnrollmentStore {
    pub fn new(base_url: &str, service_role_key: String, table: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let endpoint = base.join(&format!("rest/v1/{}", sanitize_table_name(table)))?;

        Ok(Self {
            endpoint,
            service_role_key,
            client: reqwest::Client::new(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Table names go into a path segment; keep them to identifier characters.
fn sanitize_table_name(table: &str) -> String {
    table
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

#[async_trait]
impl EnrollmentStore for SupabaseEnrollmentStore {
    async fn insert(&self, record: &EnrollmentRecord) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(course = %record.course, "Enrollment record inserted");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(GateError::Persistence(format!("database returned {status}: {body}")))
        }
    }
}

/// Store that only logs. Used when no database is configured.
#[derive(Debug, Default)]
pub struct LogEnrollmentStore;

#[async_trait]
impl EnrollmentStore for LogEnrollmentStore {
    async fn insert(&self, record: &EnrollmentRecord) -> Result<()> {
        info!(course = %record.course, "Enrollment store not configured, record logged only");
        Ok(())
    }
}

/// Pick the enrollment store for a configuration.
pub fn store_from_config(config: &StoreConfig) -> Result<Box<dyn EnrollmentStore>> {
    match (&config.url, &config.service_role_key) {
        (Some(url), Some(key)) => Ok(Box::new(SupabaseEnrollmentStore::new(
            url,
            key.clone(),
            &config.table,
        )?)),
        _ => Ok(Box::new(LogEnrollmentStore)),
    }
}
