// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Removes source vCenter entries from Infrastructure, cloud-provider-config,
//! and the `vsphere-creds` secret, then bounces the vSphere pods once more so
//! they drop any cached source-side session.

use crate::application::well_known::*;
use migrator_domain::entities::{MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::{PhaseName, TargetCredentialsRef};
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};
use std::collections::HashSet;

pub struct CleanupPhase;

#[async_trait::async_trait]
impl Phase for CleanupPhase {
    fn name(&self) -> PhaseName {
        PhaseName::Cleanup
    }

    async fn validate(&self, _spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let targets: HashSet<String> = spec.unique_target_servers().into_iter().collect();

        let current = ctx.cluster.get_infrastructure().await?;
        let source_servers: Vec<String> = current.vcenters.iter().filter(|s| !targets.contains(*s)).cloned().collect();

        if !source_servers.is_empty() {
            let mut desired = current.clone();
            desired.vcenters.retain(|s| targets.contains(s));
            let prior_crd_validations = ctx.cluster.strip_infrastructure_crd_validations().await?;
            let result = ctx.cluster.update_infrastructure(&desired).await;
            ctx.cluster.restore_infrastructure_crd_validations(prior_crd_validations).await?;
            result?;

            let mut config = ctx.cluster.get_config_map(CLOUD_PROVIDER_CONFIGMAP, CLOUD_PROVIDER_NAMESPACE, CLOUD_PROVIDER_CONFIG_KEY).await?;
            for server in &source_servers {
                let needle = format!("[VirtualCenter \"{server}\"]");
                if let Some(start) = config.find(&needle) {
                    let end = config[start..].find("\n\n").map(|i| start + i + 2).unwrap_or(config.len());
                    config.replace_range(start..end, "");
                }
            }
            ctx.cluster
                .update_config_map(CLOUD_PROVIDER_CONFIGMAP, CLOUD_PROVIDER_NAMESPACE, CLOUD_PROVIDER_CONFIG_KEY, config)
                .await?;

            let keys: Vec<String> = source_servers
                .iter()
                .flat_map(|s| [TargetCredentialsRef::username_key(s), TargetCredentialsRef::password_key(s)])
                .collect();
            ctx.cluster.remove_secret_keys(VSPHERE_CREDS_SECRET, VSPHERE_CREDS_NAMESPACE, &keys).await?;
        }

        let ccm = ctx.cluster.delete_pods_by_label(CCM_NAMESPACE, CCM_LABEL).await?;
        let csi = ctx.cluster.delete_pods_by_label(CSI_DRIVER_NAMESPACE, CSI_DRIVER_LABEL).await?;

        Ok(PhaseOutcome::completed(format!(
            "removed {} source vCenter(s), bounced {ccm} cloud-controller-manager and {csi} CSI driver pod(s)",
            source_servers.len()
        )))
    }

    async fn rollback(&self, _ctx: &PhaseContext, _spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }
}
