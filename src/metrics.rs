// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for gate verdicts and downstream failures.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Gate metrics on a registry owned by this instance.
pub struct GateMetrics {
    registry: Registry,
    verdicts: IntCounterVec,
    downstream_failures: IntCounterVec,
}

impl GateMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let verdicts = IntCounterVec::new(
            Opts::new(
                "submission_gate_verdicts_total",
                "Form submissions by form and gate outcome",
            ),
            &["form", "outcome"],
        )?;
        let downstream_failures = IntCounterVec::new(
            Opts::new(
                "submission_gate_downstream_failures_total",
                "Failed calls to the email API or enrollment store",
            ),
            &["target"],
        )?;

        registry.register(Box::new(verdicts.clone()))?;
        registry.register(Box::new(downstream_failures.clone()))?;

        Ok(Self {
            registry,
            verdicts,
            downstream_failures,
        })
    }

    pub fn record_verdict(&self, form: &str, outcome: &str) {
        self.verdicts.with_label_values(&[form, outcome]).inc();
    }

    pub fn record_downstream_failure(&self, target: &str) {
        self.downstream_failures.with_label_values(&[target]).inc();
    }

    pub fn verdict_count(&self, form: &str, outcome: &str) -> u64 {
        self.verdicts.with_label_values(&[form, outcome]).get()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("metrics are not UTF-8: {e}")))
    }
}
