//! Fault-injection profile applied to generated mock servers.
//!
//! A [`FaultProfile`] can only be constructed in a valid state: latency is a
//! non-negative whole number of milliseconds and the error rate lies in
//! `[0, 1]`. Deserialization and [`FaultProfile::clamped`] clamp out-of-range
//! input; [`FaultProfile::try_new`] rejects it instead.

use crate::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};

/// Latency, failure and outage parameters for a mock server.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "FaultProfileInput")]
pub struct FaultProfile {
    latency_ms: u64,
    error_rate: f64,
    outage: bool,
    pagination_stress: bool,
}

/// Loosely-typed wire form. Accepts the field names the web client sends,
/// where `randomFailures: false` switches the failure rate off.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FaultProfileInput {
    #[serde(default, alias = "latency")]
    latency_ms: Option<f64>,
    #[serde(default, alias = "failureRate")]
    error_rate: Option<f64>,
    #[serde(default, alias = "serverOutage")]
    outage: Option<bool>,
    #[serde(default)]
    random_failures: Option<bool>,
    #[serde(default)]
    pagination_stress: Option<bool>,
}

impl From<FaultProfileInput> for FaultProfile {
    fn from(input: FaultProfileInput) -> Self {
        let error_rate = match input.random_failures {
            Some(false) => 0.0,
            _ => input.error_rate.unwrap_or(0.0),
        };
        FaultProfile::clamped(input.latency_ms.unwrap_or(0.0), error_rate)
        .with_outage(input.outage.unwrap_or(false))
        .with_pagination_stress(input.pagination_stress.unwrap_or(false))
    }
}

impl FaultProfile {
    /// A profile with no injected faults.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a profile, clamping latency to `>= 0` and the error rate to `[0, 1]`.
    /// Non-finite values clamp to zero.
    pub fn clamped(latency_ms: f64, error_rate: f64) -> Self {
        let latency_ms = if latency_ms.is_finite() && latency_ms > 0.0 {
            latency_ms.round() as u64
        } else {
            0
        };
        let error_rate = if error_rate.is_finite() {
            error_rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            latency_ms,
            error_rate,
            outage: false,
            pagination_stress: false,
        }
    }

    /// Build a profile, rejecting negative latency or an error rate outside `[0, 1]`.
    pub fn try_new(latency_ms: i64, error_rate: f64) -> ScanResult<Self> {
        if latency_ms < 0 {
            return Err(ScanError::InvalidFaultProfile(format!(
                "latencyMs must be >= 0, got {latency_ms}"
            )));
        }
        if !error_rate.is_finite() || !(0.0..=1.0).contains(&error_rate) {
            return Err(ScanError::InvalidFaultProfile(format!(
                "errorRate must be within [0, 1], got {error_rate}"
            )));
        }
        Ok(Self {
            latency_ms: latency_ms as u64,
            error_rate,
            outage: false,
            pagination_stress: false,
        })
    }

    pub fn with_outage(mut self, outage: bool) -> Self {
        self.outage = outage;
        self
    }

    pub fn with_pagination_stress(mut self, pagination_stress: bool) -> Self {
        self.pagination_stress = pagination_stress;
        self
    }

    pub fn latency_ms(&self) -> u64 {
        self.latency_ms
    }

    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    pub fn outage(&self) -> bool {
        self.outage
    }

    pub fn pagination_stress(&self) -> bool {
        self.pagination_stress
    }

    /// Whether the latency middleware stage does anything.
    pub fn has_latency(&self) -> bool {
        self.latency_ms > 0
    }

    /// Whether the outage middleware stage does anything.
    pub fn has_outage_stage(&self) -> bool {
        self.outage || self.error_rate > 0.0
    }

    /// Probability that the outage stage rejects a request with 503.
    pub fn outage_rate(&self) -> f64 {
        if self.outage {
            1.0
        } else {
            self.error_rate
        }
    }
}
