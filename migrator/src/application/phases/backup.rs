// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Snapshots every cluster resource a later phase will mutate, plus the
//! pre-migration MachineSet replica counts `ScaleOldMachines::rollback`
//! needs to restore exact values rather than guessing a default.

use crate::application::support::{encode_backup_payload, machine_set_replica_backup_key, make_backup};
use crate::application::well_known::*;
use migrator_domain::entities::{MachineSetReplicaBackup, MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PhaseName;
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};

pub struct BackupPhase;

#[async_trait::async_trait]
impl Phase for BackupPhase {
    fn name(&self) -> PhaseName {
        PhaseName::Backup
    }

    async fn validate(&self, _spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, _spec: &MigrationSpec, status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let now = ctx.clock.now();
        let mut logs = Vec::new();

        let infra = ctx.cluster.get_infrastructure().await?;
        status.backup_resource(make_backup(INFRASTRUCTURE_KIND, INFRASTRUCTURE_NAME, "", encode_backup_payload(&infra)?, now));
        logs.push("backed up Infrastructure/cluster".to_string());

        let secret = ctx.cluster.get_secret_keys(VSPHERE_CREDS_SECRET, VSPHERE_CREDS_NAMESPACE).await?;
        status.backup_resource(make_backup(SECRET_KIND, VSPHERE_CREDS_SECRET, VSPHERE_CREDS_NAMESPACE, encode_backup_payload(&secret)?, now));
        logs.push(format!("backed up Secret/{VSPHERE_CREDS_SECRET}"));

        let cloud_config = ctx.cluster.get_config_map(CLOUD_PROVIDER_CONFIGMAP, CLOUD_PROVIDER_NAMESPACE, CLOUD_PROVIDER_CONFIG_KEY).await?;
        status.backup_resource(make_backup(CONFIGMAP_KIND, CLOUD_PROVIDER_CONFIGMAP, CLOUD_PROVIDER_NAMESPACE, encode_backup_payload(&cloud_config)?, now));
        logs.push(format!("backed up ConfigMap/{CLOUD_PROVIDER_CONFIGMAP}"));

        if let Some(cpms) = ctx.cluster.get_cpms().await? {
            status.backup_resource(make_backup(CPMS_KIND, CPMS_NAME, MACHINE_API_NAMESPACE, encode_backup_payload(&cpms)?, now));
            logs.push("backed up ControlPlaneMachineSet/cluster".to_string());
        }

        let machine_sets = ctx.cluster.list_machine_sets().await?;
        for ms in &machine_sets {
            if status.get_backup(&machine_set_replica_backup_key(&ms.name)).is_some() {
                continue;
            }
            let backup = MachineSetReplicaBackup { machine_set_name: ms.name.clone(), replicas: ms.replicas };
            status.backup_resource(make_backup(MACHINE_SET_REPLICAS_KIND, &ms.name, "", encode_backup_payload(&backup)?, now));
        }
        logs.push(format!("recorded replica counts for {} MachineSet(s)", machine_sets.len()));

        Ok(PhaseOutcome::completed("backed up pre-migration cluster state").with_logs(logs))
    }

    async fn rollback(&self, _ctx: &PhaseContext, _spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }
}
