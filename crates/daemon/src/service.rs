// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Service identity and the Service Descriptor the orchestrator owns
//! exclusively (§4.4, §5 "Shared resources").

use std::time::Instant;

use lf_wire::{HealthStatus, ServiceState, ServiceStatusEntry};
use serde::{Deserialize, Serialize};

/// The three long-running processes the orchestrator supervises, in
/// dependency order (§4.4 "Dependency order").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceId {
    Worker,
    ApiServer,
    Runtime,
}

impl ServiceId {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceId::Worker => "worker",
            ServiceId::ApiServer => "api_server",
            ServiceId::Runtime => "runtime",
        }
    }

    /// Dependency order for startup; reversed for shutdown.
    pub fn startup_order() -> &'static [ServiceId] {
        &[ServiceId::Worker, ServiceId::ApiServer, ServiceId::Runtime]
    }

    /// Default health-poll deadline (§4.4 "Startup sequence").
    pub fn default_deadline_secs(self) -> u64 {
        match self {
            ServiceId::Runtime => 45,
            _ => 30,
        }
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `native` (spawn a local process), `container` (spawn via the container
/// runtime CLI), or `auto` (prefer native unless configured otherwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationMode {
    #[default]
    Native,
    Container,
    Auto,
}

impl OrchestrationMode {
    /// Resolve `auto` to the mode actually used to spawn a process.
    pub fn resolved(self) -> OrchestrationMode {
        match self {
            OrchestrationMode::Auto => OrchestrationMode::Native,
            other => other,
        }
    }
}

/// The process/container handle and lifecycle state the orchestrator tracks
/// for one service. Never mutated from outside the orchestrator.
pub struct ServiceDescriptor {
    pub service_id: ServiceId,
    pub mode: OrchestrationMode,
    pub state: ServiceState,
    pub health: HealthStatus,
    pub pid: Option<u32>,
    pub container_id: Option<String>,
    pub port: Option<u16>,
    pub started_at: Option<Instant>,
    pub child: Option<tokio::process::Child>,
}

impl ServiceDescriptor {
    pub fn new(service_id: ServiceId, mode: OrchestrationMode) -> Self {
        Self {
            service_id,
            mode,
            state: ServiceState::Stopped,
            health: HealthStatus::Unhealthy,
            pid: None,
            container_id: None,
            port: None,
            started_at: None,
            child: None,
        }
    }

    pub fn to_status_entry(&self) -> ServiceStatusEntry {
        ServiceStatusEntry {
            service_id: self.service_id.to_string(),
            state: self.state,
            pid: self.pid,
            port: self.port,
            health: self.health,
            uptime_secs: self.started_at.map(|t| t.elapsed().as_secs()).unwrap_or(0),
        }
    }
}
