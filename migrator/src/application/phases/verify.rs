// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Final phase: confirms every cluster operator is healthy, that only the
//! target vCenter(s) remain in Infrastructure, that no machine still
//! references a source server, then re-enables the cluster-version-operator
//! and waits for its deployment to become Ready.

use crate::application::well_known::{CVO_DEPLOYMENT, CVO_NAMESPACE};
use migrator_domain::entities::{MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PhaseName;
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};
use std::collections::HashSet;
use std::time::Duration;

const REQUEUE_INTERVAL: Duration = Duration::from_secs(15);

pub struct VerifyPhase;

#[async_trait::async_trait]
impl Phase for VerifyPhase {
    fn name(&self) -> PhaseName {
        PhaseName::Verify
    }

    async fn validate(&self, _spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let operators = ctx.cluster.list_cluster_operator_health().await?;
        let unhealthy: Vec<_> = operators.iter().filter(|o| !o.is_healthy()).map(|o| o.name.clone()).collect();
        if !unhealthy.is_empty() {
            return Ok(PhaseOutcome::running(40, format!("waiting on cluster operator(s): {}", unhealthy.join(", ")), REQUEUE_INTERVAL));
        }

        let targets: HashSet<String> = spec.unique_target_servers().into_iter().collect();
        let infra = ctx.cluster.get_infrastructure().await?;
        let stray: Vec<_> = infra.vcenters.iter().filter(|s| !targets.contains(*s)).collect();
        if !stray.is_empty() {
            return Err(MigrationError::resource(format!(
                "Infrastructure still lists non-target vCenter(s): {}",
                stray.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
            )));
        }

        let machine_sets = ctx.cluster.list_machine_sets().await?;
        let stray_machine_sets: Vec<_> = machine_sets.iter().filter(|ms| !targets.contains(&ms.provider_server)).map(|ms| ms.name.clone()).collect();
        if !stray_machine_sets.is_empty() {
            return Err(MigrationError::resource(format!("MachineSet(s) still reference a source vCenter: {}", stray_machine_sets.join(", "))));
        }

        if !ctx.cluster.is_deployment_ready(CVO_DEPLOYMENT, CVO_NAMESPACE).await? {
            ctx.cluster.scale_deployment(CVO_DEPLOYMENT, CVO_NAMESPACE, 1).await?;
            return Ok(PhaseOutcome::running(80, "re-enabled cluster-version-operator, waiting for it to become Ready", REQUEUE_INTERVAL));
        }

        Ok(PhaseOutcome::completed("migration verified: cluster healthy, only target vCenter(s) remain, cluster-version-operator Ready"))
    }

    async fn rollback(&self, _ctx: &PhaseContext, _spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }
}
