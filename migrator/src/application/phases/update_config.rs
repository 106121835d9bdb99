// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Merges the target vCenter into `cloud-provider-config` and bounces the
//! machine-config-operator so it resyncs the new section into rendered
//! machine configs.

use crate::application::well_known::*;
use migrator_domain::entities::{MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PhaseName;
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};

fn vcenter_section(server: &str) -> String {
    format!("[VirtualCenter \"{server}\"]\n")
}

pub struct UpdateConfigPhase;

#[async_trait::async_trait]
impl Phase for UpdateConfigPhase {
    fn name(&self) -> PhaseName {
        PhaseName::UpdateConfig
    }

    async fn validate(&self, _spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let mut config = ctx.cluster.get_config_map(CLOUD_PROVIDER_CONFIGMAP, CLOUD_PROVIDER_NAMESPACE, CLOUD_PROVIDER_CONFIG_KEY).await?;

        let mut appended = Vec::new();
        for server in spec.unique_target_servers() {
            let section = vcenter_section(&server);
            if config.contains(section.trim_end()) {
                continue;
            }
            config.push_str(&section);
            appended.push(server);
        }

        if appended.is_empty() {
            return Ok(PhaseOutcome::completed("cloud-provider-config already contains every target vCenter section"));
        }

        ctx.cluster
            .update_config_map(CLOUD_PROVIDER_CONFIGMAP, CLOUD_PROVIDER_NAMESPACE, CLOUD_PROVIDER_CONFIG_KEY, config)
            .await?;
        let bounced = ctx.cluster.delete_pods_by_label(MCO_NAMESPACE, MCO_LABEL).await?;

        Ok(PhaseOutcome::completed(format!(
            "added {} vCenter section(s) to cloud-provider-config, bounced {bounced} machine-config-operator pod(s)",
            appended.len()
        )))
    }

    async fn rollback(&self, _ctx: &PhaseContext, _spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }
}
