//! Health response bodies.

use jiff::Timestamp;
use optiscan_core::{ServiceHealth, ServiceStatus};
use serde::{Deserialize, Serialize};

/// Overall health of the gateway and its dependencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `OK` when every dependency is operational, `DEGRADED` otherwise.
    pub status: String,
    /// Per-dependency health reports.
    pub services: Vec<ServiceHealthEntry>,
    /// When the probes ran.
    pub checked_at: Timestamp,
}

/// Health of a single dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealthEntry {
    /// Dependency name, e.g. `postgres` or `nats`.
    pub name: String,
    /// Probe outcome.
    pub status: ServiceStatus,
    /// Probe diagnostics, present on degraded or unhealthy services.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Probe round trip in milliseconds, when measured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

impl ServiceHealthEntry {
    /// Builds an entry from a probe result.
    pub fn new(name: impl Into<String>, health: ServiceHealth) -> Self {
        Self {
            name: name.into(),
            status: health.status,
            message: health.message,
            response_time_ms: health.response.map(|d| d.as_millis() as u64),
        }
    }
}

impl HealthResponse {
    /// Builds the overall response from the individual probes.
    pub fn new(services: Vec<ServiceHealthEntry>) -> Self {
        let all_operational = services.iter().all(|s| s.status.is_operational());
        Self {
            status: if all_operational { "OK" } else { "DEGRADED" }.to_owned(),
            services,
            checked_at: Timestamp::now(),
        }
    }

    /// Returns whether every dependency is operational.
    pub fn is_operational(&self) -> bool {
        self.status == "OK"
    }
}
