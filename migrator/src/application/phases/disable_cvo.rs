// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Scales the cluster-version-operator to zero so it doesn't fight the
//! pipeline's own reconfiguration of the platform spec, recording the prior
//! replica count so rollback (and Verify) can restore it.

use crate::application::support::{decode_backup_payload, encode_backup_payload, make_backup};
use crate::application::well_known::{CVO_DEPLOYMENT, CVO_NAMESPACE, DEPLOYMENT_KIND};
use migrator_domain::entities::{BackupKey, MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PhaseName;
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CvoReplicaBackup {
    replicas: u32,
}

pub struct DisableCvoPhase;

impl DisableCvoPhase {
    fn backup_key() -> BackupKey {
        BackupKey::new(DEPLOYMENT_KIND, CVO_DEPLOYMENT, CVO_NAMESPACE)
    }
}

/// The replica count to restore the cluster-version-operator to: whatever
/// `DisableCvoPhase::execute` backed up, or 1 if it never ran (or the backup
/// didn't decode). Shared with the rollback sweep's unconditional final
/// rescale so CVO ends up at its pre-migration count even when this phase's
/// own `rollback` step failed partway through.
pub fn cvo_prior_replicas(status: &MigrationStatus) -> u32 {
    status
        .get_backup(&DisableCvoPhase::backup_key())
        .and_then(|b| decode_backup_payload::<CvoReplicaBackup>(&b.payload_base64).ok())
        .map(|b| b.replicas.max(1))
        .unwrap_or(1)
}

#[async_trait::async_trait]
impl Phase for DisableCvoPhase {
    fn name(&self) -> PhaseName {
        PhaseName::DisableCvo
    }

    async fn validate(&self, _spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, _spec: &MigrationSpec, status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let replicas = ctx.cluster.get_deployment_replicas(CVO_DEPLOYMENT, CVO_NAMESPACE).await?;

        if status.get_backup(&Self::backup_key()).is_none() {
            let backup = CvoReplicaBackup { replicas };
            status.backup_resource(make_backup(DEPLOYMENT_KIND, CVO_DEPLOYMENT, CVO_NAMESPACE, encode_backup_payload(&backup)?, ctx.clock.now()));
        }

        if replicas == 0 {
            return Ok(PhaseOutcome::completed("cluster-version-operator already scaled to zero"));
        }

        ctx.cluster.scale_deployment(CVO_DEPLOYMENT, CVO_NAMESPACE, 0).await?;
        Ok(PhaseOutcome::completed(format!("scaled cluster-version-operator from {replicas} to 0 replicas")))
    }

    async fn rollback(&self, ctx: &PhaseContext, _spec: &MigrationSpec, status: &mut MigrationStatus) -> Result<(), MigrationError> {
        ctx.cluster.scale_deployment(CVO_DEPLOYMENT, CVO_NAMESPACE, cvo_prior_replicas(status)).await
    }
}
