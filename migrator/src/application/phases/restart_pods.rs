// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Bounces the vSphere cloud controller manager, the machine API
//! controller, and the CSI driver so each picks up the updated credentials
//! and platform configuration. `MonitorHealth` confirms they come back up.

use crate::application::well_known::*;
use migrator_domain::entities::{MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PhaseName;
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};

pub struct RestartPodsPhase;

#[async_trait::async_trait]
impl Phase for RestartPodsPhase {
    fn name(&self) -> PhaseName {
        PhaseName::RestartPods
    }

    async fn validate(&self, _spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, _spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let ccm = ctx.cluster.delete_pods_by_label(CCM_NAMESPACE, CCM_LABEL).await?;
        let mapi = ctx.cluster.delete_pods_by_label(MACHINE_API_NAMESPACE, MACHINE_API_CONTROLLER_LABEL).await?;
        let csi = ctx.cluster.delete_pods_by_label(CSI_DRIVER_NAMESPACE, CSI_DRIVER_LABEL).await?;

        Ok(PhaseOutcome::completed(format!(
            "bounced {ccm} cloud-controller-manager, {mapi} machine-api-controller, {csi} CSI driver pod(s)"
        )))
    }

    async fn rollback(&self, _ctx: &PhaseContext, _spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }
}
