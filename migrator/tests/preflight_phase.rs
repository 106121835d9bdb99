// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Exercises `PreflightPhase` against fake gateways: the real domain logic
//! (health check, topology resolution, failure composition) runs end to end,
//! only the cluster/vCenter I/O is faked.

mod common;

use chrono::Utc;
use common::{fd, FakeClusterGateway, FakeVsphereGateway, FakeVsphereGatewayFactory};
use migrator::application::phases::PreflightPhase;
use migrator_domain::entities::{ControlPlaneConfig, MigrationSpec, MigrationStatus, WorkerConfig};
use migrator_domain::error::MigrationError;
use migrator_domain::repositories::FrozenClock;
use migrator_domain::value_objects::{ApprovalMode, MigrationState, TargetCredentialsRef};
use migrator_domain::{Phase, PhaseContext};
use std::sync::Arc;

fn spec_with_domains(domains: Vec<migrator_domain::value_objects::FailureDomain>) -> MigrationSpec {
    MigrationSpec {
        state: MigrationState::Running,
        approval_mode: ApprovalMode::Automatic,
        target_credentials_ref: TargetCredentialsRef { secret_name: "target-creds".into(), secret_namespace: "kube-system".into() },
        worker_config: WorkerConfig { replicas: 3, failure_domain_name: domains[0].name.clone() },
        control_plane_config: ControlPlaneConfig { failure_domain_name: domains[0].name.clone() },
        failure_domains: domains,
        rollback_on_failure: true,
    }
}

fn phase_ctx(cluster: FakeClusterGateway, vsphere: FakeVsphereGateway) -> PhaseContext {
    PhaseContext::new(Arc::new(cluster), Arc::new(FakeVsphereGatewayFactory::new(vsphere)), Arc::new(FrozenClock::new(Utc::now())))
}

#[tokio::test]
async fn preflight_succeeds_when_cluster_healthy_and_topology_resolves() {
    let spec = spec_with_domains(vec![fd("fd-a", "target-vc.example.com")]);
    let ctx = phase_ctx(FakeClusterGateway::healthy("cluster", &["source-vc.example.com"]), FakeVsphereGateway { missing_networks: Vec::new() });
    let mut status = MigrationStatus::default();

    let outcome = PreflightPhase.execute(&ctx, &spec, &mut status).await.expect("preflight should succeed");

    assert!(outcome.status.is_done());
    assert!(outcome.logs.iter().any(|l| l.contains("source-vc.example.com")));
    assert!(outcome.logs.iter().any(|l| l.contains("target-vc.example.com")));
    assert!(outcome.logs.iter().any(|l| l.contains("fd-a")));
}

#[tokio::test]
async fn preflight_fails_when_a_cluster_operator_is_unhealthy() {
    let spec = spec_with_domains(vec![fd("fd-a", "target-vc.example.com")]);
    let ctx = phase_ctx(
        FakeClusterGateway::healthy("cluster", &["source-vc.example.com"]).with_degraded_operator("storage"),
        FakeVsphereGateway { missing_networks: Vec::new() },
    );
    let mut status = MigrationStatus::default();

    let err = PreflightPhase.execute(&ctx, &spec, &mut status).await.expect_err("degraded operator should block preflight");

    assert!(err.to_string().contains("storage"));
}

#[tokio::test]
async fn preflight_fails_when_failure_domain_network_is_missing() {
    let spec = spec_with_domains(vec![fd("fd-a", "target-vc.example.com")]);
    let ctx = phase_ctx(
        FakeClusterGateway::healthy("cluster", &["source-vc.example.com"]),
        FakeVsphereGateway { missing_networks: vec!["network-a".into()] },
    );
    let mut status = MigrationStatus::default();

    let err = PreflightPhase.execute(&ctx, &spec, &mut status).await.expect_err("missing network should block preflight");

    assert!(matches!(err, MigrationError::Validation(_)));
    assert!(err.to_string().contains("fd-a"));
}

#[tokio::test]
async fn preflight_validate_rejects_spec_with_no_failure_domains() {
    let mut spec = spec_with_domains(vec![fd("fd-a", "target-vc.example.com")]);
    spec.failure_domains.clear();
    let status = MigrationStatus::default();

    let err = PreflightPhase.validate(&spec, &status).await.expect_err("empty failure domain list should fail validation");
    assert!(matches!(err, MigrationError::Validation(_)));
}
