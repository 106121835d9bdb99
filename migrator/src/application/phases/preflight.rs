// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Connects to the source vCenter and every unique target vCenter, resolves
//! each declared failure domain's topology, and confirms the cluster is
//! healthy before any mutation is attempted.

use migrator_domain::entities::{MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PhaseName;
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};

pub struct PreflightPhase;

#[async_trait::async_trait]
impl Phase for PreflightPhase {
    fn name(&self) -> PhaseName {
        PhaseName::Preflight
    }

    async fn validate(&self, spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        spec.validate()
    }

    async fn execute(&self, ctx: &PhaseContext, spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let mut logs = Vec::new();

        let operators = ctx.cluster.list_cluster_operator_health().await?;
        let unhealthy: Vec<_> = operators.iter().filter(|o| !o.is_healthy()).map(|o| o.name.clone()).collect();
        if !unhealthy.is_empty() {
            return Err(MigrationError::resource(format!(
                "cluster operators not healthy before migration can start: {}",
                unhealthy.join(", ")
            )));
        }
        logs.push(format!("{} cluster operators healthy", operators.len()));

        let infra = ctx.cluster.get_infrastructure().await?;
        for server in &infra.vcenters {
            let gateway = ctx.vsphere.gateway_for(server).await?;
            gateway.connect(server).await?;
            logs.push(format!("connected to source vCenter {server}"));
        }

        for server in spec.unique_target_servers() {
            let gateway = ctx.vsphere.gateway_for(&server).await?;
            gateway.connect(&server).await?;
            logs.push(format!("connected to target vCenter {server}"));
        }

        for fd in &spec.failure_domains {
            let gateway = ctx.vsphere.gateway_for(&fd.server).await?;
            let topology = gateway.resolve_topology(&fd.server, &fd.topology).await?;
            if !topology.is_fully_resolved() {
                return Err(MigrationError::validation(format!(
                    "failure domain '{}' references unknown network(s): {}",
                    fd.name,
                    topology.missing_networks.join(", ")
                )));
            }
            logs.push(format!("resolved failure domain '{}' on {}", fd.name, fd.server));
        }

        Ok(PhaseOutcome::completed(format!("preflight resolved {} failure domain(s)", spec.failure_domains.len())).with_logs(logs))
    }

    async fn rollback(&self, _ctx: &PhaseContext, _spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }
}
