// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Appends the target vCenter(s) and declared failure domains to the
//! `Infrastructure` singleton. The upstream CRD forbids this mutation under
//! its normal validation rules, so the prior rules are stripped for the
//! duration of the patch and restored immediately after — kept as a
//! deliberate, if uncomfortable, capability rather than silently dropped.

use crate::application::support::decode_backup_payload;
use crate::application::well_known::INFRASTRUCTURE_KIND;
use migrator_domain::entities::{BackupKey, MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::{InfrastructurePlatformSpec, PhaseName};
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};

pub struct UpdateInfrastructurePhase;

impl UpdateInfrastructurePhase {
    fn backup_key() -> BackupKey {
        BackupKey::new(INFRASTRUCTURE_KIND, crate::application::well_known::INFRASTRUCTURE_NAME, "")
    }

    fn desired(current: &InfrastructurePlatformSpec, spec: &MigrationSpec) -> InfrastructurePlatformSpec {
        let mut vcenters = current.vcenters.clone();
        for server in spec.unique_target_servers() {
            if !vcenters.contains(&server) {
                vcenters.push(server);
            }
        }
        let mut failure_domain_names = current.failure_domain_names.clone();
        for fd in &spec.failure_domains {
            if !failure_domain_names.contains(&fd.name) {
                failure_domain_names.push(fd.name.clone());
            }
        }
        InfrastructurePlatformSpec { infrastructure_name: current.infrastructure_name.clone(), vcenters, failure_domain_names }
    }
}

#[async_trait::async_trait]
impl Phase for UpdateInfrastructurePhase {
    fn name(&self) -> PhaseName {
        PhaseName::UpdateInfrastructure
    }

    async fn validate(&self, _spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let current = ctx.cluster.get_infrastructure().await?;
        let desired = Self::desired(&current, spec);

        if desired.vcenters == current.vcenters && desired.failure_domain_names == current.failure_domain_names {
            return Ok(PhaseOutcome::completed("Infrastructure already reflects the desired vCenter and failure domain list"));
        }

        let prior_crd_validations = ctx.cluster.strip_infrastructure_crd_validations().await?;
        let result = ctx.cluster.update_infrastructure(&desired).await;
        ctx.cluster.restore_infrastructure_crd_validations(prior_crd_validations).await?;
        result?;

        Ok(PhaseOutcome::completed(format!(
            "Infrastructure now lists {} vCenter(s) and {} failure domain(s)",
            desired.vcenters.len(),
            desired.failure_domain_names.len()
        )))
    }

    async fn rollback(&self, ctx: &PhaseContext, _spec: &MigrationSpec, status: &mut MigrationStatus) -> Result<(), MigrationError> {
        let Some(backup) = status.get_backup(&Self::backup_key()) else {
            return Err(MigrationError::rollback("no Infrastructure backup found to restore"));
        };
        let prior: InfrastructurePlatformSpec = decode_backup_payload(&backup.payload_base64)?;

        let prior_crd_validations = ctx.cluster.strip_infrastructure_crd_validations().await?;
        let result = ctx.cluster.update_infrastructure(&prior).await;
        ctx.cluster.restore_infrastructure_crd_validations(prior_crd_validations).await?;
        result
    }
}
