// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Creates the target-side worker MachineSet and waits for its machines and
//! their backing nodes to report Ready. Substrate-committing: requires
//! manual approval under `approvalMode=Manual`.

use crate::application::support::worker_machine_set_name;
use migrator_domain::entities::{MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::{FailureDomain, PhaseName};
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};
use serde_json::json;
use std::time::Duration;

const REQUEUE_INTERVAL: Duration = Duration::from_secs(30);

fn provider_spec_patch(infrastructure_id: &str, fd: &FailureDomain) -> serde_json::Value {
    json!({
        "workspace": {
            "server": fd.server,
            "datacenter": fd.topology.datacenter,
            "datastore": fd.topology.datastore,
            "folder": fd.topology.folder.clone().unwrap_or_else(|| fd.default_folder_path(infrastructure_id)),
            "resourcePool": fd.topology.resource_pool,
        },
        "template": fd.topology.template,
        "network": {
            "devices": fd.topology.networks.iter().map(|n| json!({"networkName": n})).collect::<Vec<_>>(),
        },
    })
}

pub struct CreateWorkersPhase;

impl CreateWorkersPhase {
    fn name_for(infra_id: &str, spec: &MigrationSpec) -> String {
        worker_machine_set_name(infra_id, &spec.worker_config.failure_domain_name)
    }
}

#[async_trait::async_trait]
impl Phase for CreateWorkersPhase {
    fn name(&self) -> PhaseName {
        PhaseName::CreateWorkers
    }

    fn requires_approval(&self) -> bool {
        true
    }

    async fn validate(&self, spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        if spec.failure_domain(&spec.worker_config.failure_domain_name).is_none() {
            return Err(MigrationError::validation("spec.workerConfig.failureDomainName does not match a declared failure domain"));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let infra = ctx.cluster.get_infrastructure().await?;
        let fd = spec
            .failure_domain(&spec.worker_config.failure_domain_name)
            .ok_or_else(|| MigrationError::validation("worker failure domain vanished after validate"))?;
        let name = Self::name_for(&infra.infrastructure_name, spec);

        let patch = provider_spec_patch(&infra.infrastructure_name, fd);
        let machine_set = ctx.cluster.ensure_machine_set(&name, patch, spec.worker_config.replicas).await?;

        if !ctx.cluster.machine_set_nodes_ready(&machine_set.name).await? {
            return Ok(PhaseOutcome::running(60, format!("waiting for MachineSet/{name} nodes to become Ready"), REQUEUE_INTERVAL));
        }

        Ok(PhaseOutcome::completed(format!("MachineSet/{name} has {} Ready node(s)", spec.worker_config.replicas)))
    }

    async fn rollback(&self, ctx: &PhaseContext, spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<(), MigrationError> {
        let infra = ctx.cluster.get_infrastructure().await?;
        let name = Self::name_for(&infra.infrastructure_name, spec);
        ctx.cluster.delete_machine_set_and_wait_machines_gone(&name).await?;
        Ok(())
    }
}
