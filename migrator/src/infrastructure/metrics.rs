// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Prometheus metrics plus the `/metrics` and `/healthz` HTTP endpoint the
//! operator exposes on [`crate::infrastructure::config::OperatorConfig::metrics_port`].

use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PhaseName;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

pub struct MetricsService {
    registry: Registry,
    phase_completions: IntCounterVec,
    phase_failures: IntCounterVec,
    csi_volumes_migrated: IntCounterVec,
    rollback_sweeps: IntCounterVec,
    reconciles_in_progress: IntGauge,
}

impl MetricsService {
    pub fn new() -> Result<Self, MigrationError> {
        let registry = Registry::new();

        let phase_completions = IntCounterVec::new(Opts::new("vsm_phase_completions_total", "phase executions that reached a terminal status"), &["phase", "status"])
            .map_err(|e| MigrationError::infrastructure(format!("registering vsm_phase_completions_total: {e}")))?;
        let phase_failures = IntCounterVec::new(Opts::new("vsm_phase_failures_total", "phase executions that ended in PhaseStatus::Failed"), &["phase"])
            .map_err(|e| MigrationError::infrastructure(format!("registering vsm_phase_failures_total: {e}")))?;
        let csi_volumes_migrated = IntCounterVec::new(Opts::new("vsm_csi_volumes_total", "CSI volumes settled by MigrateCSIVolumes"), &["outcome"])
            .map_err(|e| MigrationError::infrastructure(format!("registering vsm_csi_volumes_total: {e}")))?;
        let rollback_sweeps = IntCounterVec::new(Opts::new("vsm_rollback_sweeps_total", "rollback sweeps run"), &["reason"])
            .map_err(|e| MigrationError::infrastructure(format!("registering vsm_rollback_sweeps_total: {e}")))?;
        let reconciles_in_progress = IntGauge::new("vsm_reconciles_in_progress", "reconcile invocations currently executing")
            .map_err(|e| MigrationError::infrastructure(format!("registering vsm_reconciles_in_progress: {e}")))?;

        registry.register(Box::new(phase_completions.clone())).map_err(|e| MigrationError::infrastructure(e.to_string()))?;
        registry.register(Box::new(phase_failures.clone())).map_err(|e| MigrationError::infrastructure(e.to_string()))?;
        registry.register(Box::new(csi_volumes_migrated.clone())).map_err(|e| MigrationError::infrastructure(e.to_string()))?;
        registry.register(Box::new(rollback_sweeps.clone())).map_err(|e| MigrationError::infrastructure(e.to_string()))?;
        registry.register(Box::new(reconciles_in_progress.clone())).map_err(|e| MigrationError::infrastructure(e.to_string()))?;

        Ok(Self { registry, phase_completions, phase_failures, csi_volumes_migrated, rollback_sweeps, reconciles_in_progress })
    }

    pub fn record_phase_completion(&self, phase: PhaseName, status: &str) {
        self.phase_completions.with_label_values(&[phase.as_str(), status]).inc();
        if status == "Failed" {
            self.phase_failures.with_label_values(&[phase.as_str()]).inc();
        }
    }

    pub fn record_csi_volume_outcome(&self, outcome: &str) {
        self.csi_volumes_migrated.with_label_values(&[outcome]).inc();
    }

    pub fn record_rollback_sweep(&self, reason: &str) {
        self.rollback_sweeps.with_label_values(&[reason]).inc();
    }

    pub fn reconcile_started(&self) {
        self.reconciles_in_progress.inc();
    }

    pub fn reconcile_finished(&self) {
        self.reconciles_in_progress.dec();
    }

    pub fn render(&self) -> Result<String, MigrationError> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer).map_err(|e| MigrationError::infrastructure(format!("encoding metrics: {e}")))?;
        String::from_utf8(buffer).map_err(|e| MigrationError::infrastructure(format!("metrics output was not valid UTF-8: {e}")))
    }
}

pub struct MetricsEndpoint {
    metrics: Arc<MetricsService>,
    port: u16,
}

impl MetricsEndpoint {
    pub fn new(metrics: Arc<MetricsService>, port: u16) -> Self {
        Self { metrics, port }
    }

    /// Runs until the process exits. Connection errors are logged and don't
    /// stop the listener; a single slow or malformed request only ties up
    /// its own spawned task.
    pub async fn start(&self) -> Result<(), MigrationError> {
        let addr = format!("127.0.0.1:{}", self.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| MigrationError::infrastructure(format!("binding metrics endpoint on {addr}: {e}")))?;
        info!("metrics endpoint listening on http://{addr}/metrics");

        loop {
            match listener.accept().await {
                Ok((mut stream, _)) => {
                    let metrics = self.metrics.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_request(&mut stream, &metrics).await {
                            error!("error handling metrics request: {e}");
                        }
                    });
                }
                Err(e) => error!("error accepting metrics connection: {e}"),
            }
        }
    }
}

async fn handle_request(stream: &mut tokio::net::TcpStream, metrics: &MetricsService) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut buffer = [0u8; 1024];
    let n = stream.read(&mut buffer).await?;
    let request = String::from_utf8_lossy(&buffer[..n]);
    debug!("metrics endpoint request: {}", request.lines().next().unwrap_or(""));

    if request.starts_with("GET /metrics") {
        match metrics.render() {
            Ok(body) => {
                let response = format!("HTTP/1.1 200 OK\r\nContent-Type: text/plain; version=0.0.4; charset=utf-8\r\nContent-Length: {}\r\n\r\n{}", body.len(), body);
                stream.write_all(response.as_bytes()).await?;
            }
            Err(e) => {
                let body = format!("error rendering metrics: {e}");
                let response = format!("HTTP/1.1 500 Internal Server Error\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{}", body.len(), body);
                stream.write_all(response.as_bytes()).await?;
            }
        }
    } else if request.starts_with("GET /healthz") {
        stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 2\r\n\r\nOK").await?;
    } else {
        stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 9\r\n\r\nNot Found").await?;
    }

    stream.flush().await?;
    Ok(())
}
