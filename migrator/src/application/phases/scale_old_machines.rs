// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Scales every MachineSet still pointing at a source vCenter to zero and
//! waits for its machines and nodes to be deleted. Substrate-committing:
//! requires manual approval under `approvalMode=Manual`.

use crate::application::support::find_machine_set_replica_backup;
use migrator_domain::entities::{MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PhaseName;
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};
use std::collections::HashSet;
use std::time::Duration;

const REQUEUE_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_ROLLBACK_REPLICAS: u32 = 3;

pub struct ScaleOldMachinesPhase;

#[async_trait::async_trait]
impl Phase for ScaleOldMachinesPhase {
    fn name(&self) -> PhaseName {
        PhaseName::ScaleOldMachines
    }

    fn requires_approval(&self) -> bool {
        true
    }

    async fn validate(&self, _spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let targets: HashSet<String> = spec.unique_target_servers().into_iter().collect();
        let machine_sets = ctx.cluster.list_machine_sets().await?;

        let source_sets: Vec<_> = machine_sets.into_iter().filter(|ms| !targets.contains(&ms.provider_server)).collect();

        if source_sets.is_empty() {
            return Ok(PhaseOutcome::completed("no source-referencing MachineSets remain"));
        }

        let mut not_ready = Vec::new();
        for ms in &source_sets {
            if ms.replicas != 0 {
                ctx.cluster.scale_machine_set(&ms.name, 0).await?;
            }
            let gone = ctx.cluster.delete_machine_set_and_wait_machines_gone(&ms.name).await?;
            if !gone {
                not_ready.push(ms.name.clone());
            }
        }

        if !not_ready.is_empty() {
            return Ok(PhaseOutcome::running(
                60,
                format!("waiting for source MachineSet(s) to finish draining: {}", not_ready.join(", ")),
                REQUEUE_INTERVAL,
            ));
        }

        Ok(PhaseOutcome::completed(format!("retired {} source MachineSet(s)", source_sets.len())))
    }

    async fn rollback(&self, ctx: &PhaseContext, spec: &MigrationSpec, status: &mut MigrationStatus) -> Result<(), MigrationError> {
        let targets: HashSet<String> = spec.unique_target_servers().into_iter().collect();
        let machine_sets = ctx.cluster.list_machine_sets().await?;

        for ms in machine_sets.into_iter().filter(|ms| !targets.contains(&ms.provider_server)) {
            let replicas = find_machine_set_replica_backup(status, &ms.name).map(|b| b.replicas).unwrap_or(DEFAULT_ROLLBACK_REPLICAS);
            ctx.cluster.scale_machine_set(&ms.name, replicas).await?;
        }
        Ok(())
    }
}
