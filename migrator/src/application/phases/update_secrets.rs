// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Merges `{server}.username` / `{server}.password` entries for every unique
//! target vCenter into the in-cluster `vsphere-creds` secret, sourced from
//! the operator-declared target credentials secret.

use crate::application::well_known::{VSPHERE_CREDS_NAMESPACE, VSPHERE_CREDS_SECRET};
use migrator_domain::entities::{MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::{PhaseName, TargetCredentialsRef};
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};
use std::collections::BTreeMap;

pub struct UpdateSecretsPhase;

#[async_trait::async_trait]
impl Phase for UpdateSecretsPhase {
    fn name(&self) -> PhaseName {
        PhaseName::UpdateSecrets
    }

    async fn validate(&self, spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        if spec.target_credentials_ref.secret_name.trim().is_empty() {
            return Err(MigrationError::validation("spec.targetCredentialsRef.secretName must not be empty"));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let source_keys = ctx
            .cluster
            .get_secret_keys(&spec.target_credentials_ref.secret_name, &spec.target_credentials_ref.secret_namespace)
            .await?;

        let mut merged = BTreeMap::new();
        for server in spec.unique_target_servers() {
            let username_key = TargetCredentialsRef::username_key(&server);
            let password_key = TargetCredentialsRef::password_key(&server);
            let username = source_keys
                .get(&username_key)
                .ok_or_else(|| MigrationError::resource(format!("missing '{username_key}' in target credentials secret")))?;
            let password = source_keys
                .get(&password_key)
                .ok_or_else(|| MigrationError::resource(format!("missing '{password_key}' in target credentials secret")))?;
            merged.insert(username_key, username.clone());
            merged.insert(password_key, password.clone());
        }

        let count = merged.len() / 2;
        ctx.cluster.merge_secret_keys(VSPHERE_CREDS_SECRET, VSPHERE_CREDS_NAMESPACE, merged).await?;
        Ok(PhaseOutcome::completed(format!("merged credentials for {count} target vCenter(s) into {VSPHERE_CREDS_SECRET}")))
    }

    async fn rollback(&self, ctx: &PhaseContext, spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<(), MigrationError> {
        let mut keys = Vec::new();
        for server in spec.unique_target_servers() {
            keys.push(TargetCredentialsRef::username_key(&server));
            keys.push(TargetCredentialsRef::password_key(&server));
        }
        ctx.cluster.remove_secret_keys(VSPHERE_CREDS_SECRET, VSPHERE_CREDS_NAMESPACE, &keys).await
    }
}
