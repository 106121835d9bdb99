// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The `VSphereMigration` custom resource. The domain crate owns
//! `MigrationSpec`/`MigrationStatus` free of any Kubernetes dependency; this
//! module is the one place that wraps them in `kube::CustomResource` so the
//! `apiextensions.k8s.io/v1` machinery (and its generated `VSphereMigration`
//! Kind, `VSphereMigrationList`, etc.) only exists at the infrastructure
//! boundary.

use kube::CustomResource;
use migrator_domain::entities::{MigrationSpec, MigrationStatus};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "migration.openshift.io",
    version = "v1",
    kind = "VSphereMigration",
    plural = "vspheremigrations",
    singular = "vspheremigration",
    status = "MigrationStatus",
    namespaced,
    shortname = "vsm"
)]
pub struct VSphereMigrationSpec {
    #[serde(flatten)]
    pub inner: MigrationSpec,
}

impl std::ops::Deref for VSphereMigrationSpec {
    type Target = MigrationSpec;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
