// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Deletes the singleton ControlPlaneMachineSet. Its owning controller
//! re-materializes it in `Inactive` state; `RecreateCPMS` picks up from
//! there. Not reversible — once deleted, rollback has nothing to restore.

use migrator_domain::entities::{MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PhaseName;
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};

pub struct DeleteCpmsPhase;

#[async_trait::async_trait]
impl Phase for DeleteCpmsPhase {
    fn name(&self) -> PhaseName {
        PhaseName::DeleteCpms
    }

    async fn validate(&self, _spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, _spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        if ctx.cluster.get_cpms().await?.is_none() {
            return Ok(PhaseOutcome::completed("ControlPlaneMachineSet already absent"));
        }
        ctx.cluster.delete_cpms().await?;
        Ok(PhaseOutcome::completed("deleted ControlPlaneMachineSet/cluster"))
    }

    async fn rollback(&self, _ctx: &PhaseContext, _spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }
}
