// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Drives every vSphere CSI-backed PersistentVolume through the per-volume
//! migration DAG defined in [`crate::application::phases::csi`]. Unlike the
//! other sixteen phases, a single `execute` call advances many independent
//! state machines at once and reports completion only once every volume has
//! reached a terminal state.

use migrator_domain::entities::{MigrationSpec, MigrationStatus, PvMigrationState};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PhaseName;
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};
use std::time::Duration;
use tracing::error;

use super::csi;

const STEP_REQUEUE: Duration = Duration::from_secs(10);

pub struct MigrateCsiVolumesPhase;

#[async_trait::async_trait]
impl Phase for MigrateCsiVolumesPhase {
    fn name(&self) -> PhaseName {
        PhaseName::MigrateCsiVolumes
    }

    async fn validate(&self, _spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, spec: &MigrationSpec, status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let infra = ctx.cluster.get_infrastructure().await?;
        let csi_state = &mut status.csi_migration_state;

        if csi_state.volumes.is_empty() && csi_state.total == 0 {
            let pvs = ctx.cluster.list_vsphere_csi_pvs().await?;
            for pv in pvs.iter().filter(|p| p.is_vsphere_csi()) {
                let (pvc_name, pvc_namespace) = match (&pv.bound_pvc_name, &pv.bound_pvc_namespace) {
                    (Some(n), Some(ns)) => (n.clone(), ns.clone()),
                    _ => continue,
                };
                csi_state.volumes.push(PvMigrationState::new(pv.name.clone(), pvc_name, pvc_namespace, pv.volume_handle.clone(), pv.reclaim_policy.clone()));
            }
            csi_state.total = csi_state.volumes.len() as u32;
        }

        if csi_state.total == 0 {
            return Ok(PhaseOutcome::completed("no vSphere CSI volumes found, nothing to migrate"));
        }

        let mut logs = Vec::new();
        for pv in csi_state.volumes.iter_mut().filter(|p| !p.status.is_terminal()) {
            match csi::advance_one_step(ctx, spec, pv, &infra.infrastructure_name, &infra.vcenters).await {
                Ok(()) => logs.push(format!("{}: advanced to {:?}", pv.pv_name, pv.status)),
                Err(err) if err.is_transient() => logs.push(format!("{}: transient, will retry ({err})", pv.pv_name)),
                Err(err) if err.is_safety_gated() => {
                    pv.fail(format!("safety-gated: {err}"));
                    logs.push(format!("{}: failed ({err})", pv.pv_name));
                }
                Err(err) => {
                    pv.fail(err.to_string());
                    logs.push(format!("{}: failed ({err})", pv.pv_name));
                }
            }
        }

        csi_state.migrated = csi_state.volumes.iter().filter(|p| p.status == migrator_domain::value_objects::PvMigrationStatus::Complete).count() as u32;
        csi_state.failed = csi_state.volumes.iter().filter(|p| p.status == migrator_domain::value_objects::PvMigrationStatus::Failed).count() as u32;

        if csi_state.is_settled() {
            if csi_state.failed > 0 {
                log_failure_banner(csi_state);
                return Ok(PhaseOutcome::completed(format!(
                    "migrated {} of {} vSphere CSI volume(s), {} failed",
                    csi_state.migrated, csi_state.total, csi_state.failed
                ))
                .with_logs(logs));
            }
            return Ok(PhaseOutcome::completed(format!("migrated all {} vSphere CSI volume(s)", csi_state.total)).with_logs(logs));
        }

        let progress = ((csi_state.migrated + csi_state.failed) as f64 / csi_state.total as f64 * 100.0) as u8;
        Ok(PhaseOutcome::running(progress, format!("{}/{} volumes settled", csi_state.migrated + csi_state.failed, csi_state.total), STEP_REQUEUE).with_logs(logs))
    }

    async fn rollback(&self, _ctx: &PhaseContext, _spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<(), MigrationError> {
        // a failed volume is terminal and needs manual remediation —
        // the rollback sweep does not attempt to reverse per-volume state.
        Ok(())
    }
}

/// Surfaces every permanently-failed volume as a single structured log block
/// rather than leaving operators to dig through per-volume `logs` entries —
/// these require manual remediation and are easy to miss otherwise.
fn log_failure_banner(csi_state: &migrator_domain::entities::CsiMigrationState) {
    let failed: Vec<&PvMigrationState> = csi_state.volumes.iter().filter(|p| p.status == migrator_domain::value_objects::PvMigrationStatus::Failed).collect();
    error!(
        failed_count = failed.len(),
        total = csi_state.total,
        "CSI volume migration completed with failures requiring manual remediation"
    );
    for pv in failed {
        error!(pv_name = %pv.pv_name, pvc_name = %pv.pvc_name, pvc_namespace = %pv.pvc_namespace, reason = %pv.message, "vSphere CSI volume failed to migrate");
    }
}
