// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `status.backups`: before-images of mutated cluster resources,
//! keyed by (kind, name, namespace) and embedded directly in the migration's
//! status so the cluster remains the sole source of truth.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct BackupKey {
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

impl BackupKey {
    pub fn new(kind: impl Into<String>, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self { kind: kind.into(), name: name.into(), namespace: namespace.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResourceBackup {
    pub kind: String,
    pub name: String,
    pub namespace: String,
    /// Base64-encoded YAML snapshot of the resource as it was before the
    /// phase that backs it up mutated it.
    pub payload_base64: String,
    pub timestamp: DateTime<Utc>,
}

impl ResourceBackup {
    pub fn key(&self) -> BackupKey {
        BackupKey::new(&self.kind, &self.name, &self.namespace)
    }
}

/// Pre-migration MachineSet replica counts, captured by the Backup phase so
/// `ScaleOldMachines::rollback` can restore the exact value instead of
/// guessing a default.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MachineSetReplicaBackup {
    pub machine_set_name: String,
    pub replicas: u32,
}
