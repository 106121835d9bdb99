// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Provisions `/<datacenter>/vm/<infrastructureID>` in every distinct
//! (server, datacenter) pair the declared failure domains touch, verifying
//! the folder is readable back before moving on.

use migrator_domain::entities::{MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PhaseName;
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};
use std::collections::HashSet;

pub struct CreateFolderPhase;

#[async_trait::async_trait]
impl Phase for CreateFolderPhase {
    fn name(&self) -> PhaseName {
        PhaseName::CreateFolder
    }

    async fn validate(&self, _spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let infra = ctx.cluster.get_infrastructure().await?;
        let mut seen = HashSet::new();
        let mut logs = Vec::new();

        for fd in &spec.failure_domains {
            let key = (fd.server.clone(), fd.topology.datacenter.clone());
            if !seen.insert(key) {
                continue;
            }

            let gateway = ctx.vsphere.gateway_for(&fd.server).await?;
            let topology = gateway.resolve_topology(&fd.server, &fd.topology).await?;
            let path = fd
                .topology
                .folder
                .clone()
                .unwrap_or_else(|| fd.default_folder_path(&infra.infrastructure_name));

            gateway.ensure_folder(&fd.server, &topology.datacenter_moref, &path).await?;
            if !gateway.folder_exists(&fd.server, &topology.datacenter_moref, &path).await? {
                return Err(MigrationError::resource(format!("folder '{path}' not readable back on {}", fd.server)));
            }
            logs.push(format!("ensured folder {path} on {}", fd.server));
        }

        Ok(PhaseOutcome::completed(format!("ensured {} VM folder(s)", logs.len())).with_logs(logs))
    }

    async fn rollback(&self, _ctx: &PhaseContext, _spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }
}
