// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Reconfigures the now-`Inactive` ControlPlaneMachineSet to reference the
//! target failure domain and monitors its rollout to completion.
//!
//! The controller is asynchronous: its status fields can briefly keep
//! reporting the *previous* rollout as healthy right after the spec bump,
//! so completion requires both `observedGeneration >= generation` and a
//! five-minute minimum monitoring window measured from phase start, not
//! just a single healthy-looking read. Substrate-committing: requires
//! manual approval under `approvalMode=Manual`.

use migrator_domain::entities::{MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::{CpmsState, PhaseName};
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};
use std::time::Duration;

const INACTIVE_POLL_INTERVAL: Duration = Duration::from_secs(5);
const ROLLOUT_POLL_INTERVAL: Duration = Duration::from_secs(15);
const MINIMUM_MONITORING_WINDOW: chrono::Duration = chrono::Duration::minutes(5);

pub struct RecreateCpmsPhase;

#[async_trait::async_trait]
impl Phase for RecreateCpmsPhase {
    fn name(&self) -> PhaseName {
        PhaseName::RecreateCpms
    }

    fn requires_approval(&self) -> bool {
        true
    }

    async fn validate(&self, spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        if spec.failure_domain(&spec.control_plane_config.failure_domain_name).is_none() {
            return Err(MigrationError::validation("spec.controlPlaneConfig.failureDomainName does not match a declared failure domain"));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, spec: &MigrationSpec, status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let Some(cpms) = ctx.cluster.get_cpms().await? else {
            return Ok(PhaseOutcome::running(0, "waiting for ControlPlaneMachineSet to be re-materialized", INACTIVE_POLL_INTERVAL));
        };

        if cpms.state == CpmsState::Inactive {
            ctx.cluster.patch_cpms_failure_domain_and_activate(&spec.control_plane_config.failure_domain_name).await?;
            return Ok(PhaseOutcome::running(20, "patched target failure domain and activated ControlPlaneMachineSet", ROLLOUT_POLL_INTERVAL));
        }

        if cpms.observed_generation < cpms.generation {
            return Ok(PhaseOutcome::running(40, "waiting for ControlPlaneMachineSet controller to observe the spec update", ROLLOUT_POLL_INTERVAL));
        }

        let phase_start = status.current_phase_state.as_ref().map(|c| c.start_time).unwrap_or_else(|| ctx.clock.now());
        let elapsed = ctx.clock.now() - phase_start;

        if !cpms.rollout_is_complete() {
            return Ok(PhaseOutcome::running(60, "control-plane rollout in progress", ROLLOUT_POLL_INTERVAL));
        }
        if elapsed < MINIMUM_MONITORING_WINDOW {
            return Ok(PhaseOutcome::running(
                90,
                "rollout looks healthy but the minimum monitoring window has not elapsed",
                ROLLOUT_POLL_INTERVAL,
            ));
        }

        Ok(PhaseOutcome::completed(format!("control-plane rollout complete: {} ready replicas", cpms.ready_replicas)))
    }

    async fn rollback(&self, _ctx: &PhaseContext, _spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }
}
