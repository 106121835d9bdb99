// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `kube`-backed [`MigrationRepository`]: reads and writes the
//! `VSphereMigration` object's `status` subresource in its own namespace.

use crate::infrastructure::crd::VSphereMigration;
use async_trait::async_trait;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client};
use migrator_domain::entities::MigrationStatus;
use migrator_domain::error::MigrationError;
use migrator_domain::repositories::MigrationRepository;

const FIELD_MANAGER: &str = "vsphere-migrator";

pub struct KubeMigrationRepository {
    api: Api<VSphereMigration>,
}

impl KubeMigrationRepository {
    pub fn new(client: Client, namespace: &str) -> Self {
        Self { api: Api::namespaced(client, namespace) }
    }
}

#[async_trait]
impl MigrationRepository for KubeMigrationRepository {
    async fn get_status(&self, name: &str) -> Result<Option<MigrationStatus>, MigrationError> {
        match self.api.get_opt(name).await.map_err(|e| MigrationError::resource(format!("get VSphereMigration/{name}: {e}")))? {
            Some(obj) => Ok(obj.status),
            None => Ok(None),
        }
    }

    async fn update_status(&self, name: &str, status: &MigrationStatus) -> Result<(), MigrationError> {
        let patch = serde_json::json!({
            "apiVersion": "migration.openshift.io/v1",
            "kind": "VSphereMigration",
            "status": status,
        });
        self.api
            .patch_status(name, &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Apply(patch))
            .await
            .map_err(|e| MigrationError::StatusConflict(format!("update status of VSphereMigration/{name}: {e}")))?;
        Ok(())
    }
}
