// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Polls cluster operator conditions until every operator reports
//! Available/!Degraded/!Progressing, confirming the bounced controllers in
//! `RestartPods` came back up cleanly.

use migrator_domain::entities::{MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PhaseName;
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};
use std::time::Duration;

const REQUEUE_INTERVAL: Duration = Duration::from_secs(15);

pub struct MonitorHealthPhase;

#[async_trait::async_trait]
impl Phase for MonitorHealthPhase {
    fn name(&self) -> PhaseName {
        PhaseName::MonitorHealth
    }

    async fn validate(&self, _spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, _spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let operators = ctx.cluster.list_cluster_operator_health().await?;
        let unhealthy: Vec<_> = operators.iter().filter(|o| !o.is_healthy()).map(|o| o.name.clone()).collect();

        if unhealthy.is_empty() {
            return Ok(PhaseOutcome::completed(format!("all {} cluster operators healthy", operators.len())));
        }

        Ok(PhaseOutcome::running(50, format!("waiting on cluster operator(s): {}", unhealthy.join(", ")), REQUEUE_INTERVAL))
    }

    async fn rollback(&self, _ctx: &PhaseContext, _spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }
}
