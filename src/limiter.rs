// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for form submissions.
//!
//! Each client identity gets one [`RateLimitRecord`]. The first request of a
//! window opens it with a count of one; later requests in the same window
//! increment the count until `max_requests` is reached, after which requests
//! are refused without touching the record. Once `window_reset_at` is reached
//! the next request opens a fresh window.
//!
//! Records live in a [`RateLimitStore`]. The bundled [`MemoryRateLimitStore`]
//! is process-local, so the quota is enforced per process rather than
//! globally; a shared store can be swapped in behind the same trait.

use crate::clock::{Clock, SystemClock};
use crate::config::{RateLimitConfig, MAX_WINDOW_SECS};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until the current window ends
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Per-identity submission counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub count: u32,
    pub window_reset_at: Instant,
}

impl RateLimitRecord {
    /// Open a new window at `now` holding one request.
    ///
    /// A window too long to represent is cut to `MAX_WINDOW_SECS`.
    pub fn open(now: Instant, window: Duration) -> Self {
        let window_reset_at = now
            .checked_add(window)
            .or_else(|| now.checked_add(Duration::from_secs(MAX_WINDOW_SECS)))
            .unwrap_or(now);
        Self {
            count: 1,
            window_reset_at,
        }
    }

    /// Whether the window has ended. The reset instant itself counts as ended.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.window_reset_at
    }

    /// Count one request against this record.
    ///
    /// Returns `false`, leaving the record untouched, when the window is
    /// still open and already holds `max_requests`.
    pub fn register(&mut self, now: Instant, max_requests: u32, window: Duration) -> bool {
        if self.is_expired(now) {
            *self = Self::open(now, window);
            return true;
        }
        if self.count < max_requests {
            self.count += 1;
            return true;
        }
        false
    }

    fn outcome(&self, allowed: bool, now: Instant, max_requests: u32) -> RateLimitResult {
        let until_reset = self.window_reset_at.saturating_duration_since(now);
        if allowed {
            RateLimitResult::Allowed {
                remaining: max_requests.saturating_sub(self.count),
                reset_in: until_reset,
            }
        } else {
            RateLimitResult::Limited {
                retry_after: until_reset,
            }
        }
    }
}

/// Storage for rate limit records.
///
/// `hit` must perform the check and the increment as one atomic step so two
/// concurrent requests cannot both slip under the limit.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count one request from `identity` and report whether it is allowed.
    async fn hit(
        &self,
        identity: &str,
        now: Instant,
        max_requests: u32,
        window: Duration,
    ) -> Result<RateLimitResult>;

    /// Drop records whose window has ended. Returns how many were removed.
    async fn sweep(&self, now: Instant) -> Result<usize>;

    /// Number of identities currently tracked.
    async fn tracked(&self) -> usize;
}

/// Process-local record store.
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    records: Mutex<HashMap<String, RateLimitRecord>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn hit(
        &self,
        identity: &str,
        now: Instant,
        max_requests: u32,
        window: Duration,
    ) -> Result<RateLimitResult> {
        let mut records = self.records.lock().await;

        let result = match records.get_mut(identity) {
            Some(record) => {
                let allowed = record.register(now, max_requests, window);
                record.outcome(allowed, now, max_requests)
            }
            None => {
                let record = RateLimitRecord::open(now, window);
                records.insert(identity.to_string(), record);
                record.outcome(true, now, max_requests)
            }
        };

        Ok(result)
    }

    async fn sweep(&self, now: Instant) -> Result<usize> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        Ok(before - records.len())
    }

    async fn tracked(&self) -> usize {
        self.records.lock().await.len()
    }
}

/// Thread-safe rate limiter over an injected store and clock.
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a rate limiter backed by a fresh in-memory store.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_store(
            config,
            Arc::new(MemoryRateLimitStore::new()),
            Arc::new(SystemClock),
        )
    }

    pub fn with_store(
        config: RateLimitConfig,
        store: Arc<dyn RateLimitStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check and count one request from a client identity.
    ///
    /// A store failure lets the request through.
    pub async fn check(&self, identity: &str) -> RateLimitResult {
        let now = self.clock.now();
        let window = self.config.window_duration();

        match self
            .store
            .hit(identity, now, self.config.max_requests, window)
            .await
        {
            Ok(result) => {
                match &result {
                    RateLimitResult::Allowed { remaining, .. } => {
                        debug!(identity, remaining, "Submission within quota");
                    }
                    RateLimitResult::Limited { retry_after } => {
                        debug!(identity, ?retry_after, "Submission quota exceeded");
                    }
                }
                result
            }
            Err(err) => {
                warn!(identity, error = %err, "Rate limit store failed, allowing request");
                RateLimitResult::Allowed {
                    remaining: 0,
                    reset_in: window,
                }
            }
        }
    }

    /// Remove expired records (should be called periodically).
    pub async fn sweep(&self) -> usize {
        match self.store.sweep(self.clock.now()).await {
            Ok(removed) => {
                if removed > 0 {
                    debug!(removed, "Swept expired rate limit records");
                }
                removed
            }
            Err(err) => {
                warn!(error = %err, "Rate limit sweep failed");
                0
            }
        }
    }

    /// Number of identities currently tracked.
    pub async fn tracked(&self) -> usize {
        self.store.tracked().await
    }
}
