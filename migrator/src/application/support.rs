// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Small helpers shared across phase implementations: backup payload
//! encoding and a couple of object-name builders that would otherwise be
//! copy-pasted into every phase file.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use migrator_domain::entities::{BackupKey, MachineSetReplicaBackup, ResourceBackup};
use migrator_domain::error::MigrationError;
use serde::{de::DeserializeOwned, Serialize};

/// Serializes `value` to JSON and base64-encodes it for storage in
/// `status.backups`. The upstream system snapshots YAML; the domain layer
/// only ever sees reduced DTOs (never a full Kubernetes object), so JSON is
/// the faithful equivalent here — noted as a deliberate deviation.
pub fn encode_backup_payload<T: Serialize>(value: &T) -> Result<String, MigrationError> {
    let json = serde_json::to_vec(value)?;
    Ok(STANDARD.encode(json))
}

pub fn decode_backup_payload<T: DeserializeOwned>(payload_base64: &str) -> Result<T, MigrationError> {
    let bytes = STANDARD
        .decode(payload_base64)
        .map_err(|e| MigrationError::resource(format!("corrupt backup payload: {e}")))?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn make_backup(kind: &str, name: &str, namespace: &str, payload_base64: String, now: chrono::DateTime<chrono::Utc>) -> ResourceBackup {
    ResourceBackup { kind: kind.to_string(), name: name.to_string(), namespace: namespace.to_string(), payload_base64, timestamp: now }
}

pub fn machine_set_replica_backup_key(name: &str) -> BackupKey {
    BackupKey::new(crate::application::well_known::MACHINE_SET_REPLICAS_KIND, name, "")
}

pub fn find_machine_set_replica_backup(status: &migrator_domain::entities::MigrationStatus, name: &str) -> Option<MachineSetReplicaBackup> {
    status.get_backup(&machine_set_replica_backup_key(name)).and_then(|b| decode_backup_payload(&b.payload_base64).ok())
}

/// Deterministic worker MachineSet name: `<infraID>-worker-<failureDomainName>`.
pub fn worker_machine_set_name(infrastructure_id: &str, failure_domain_name: &str) -> String {
    format!("{infrastructure_id}-worker-{failure_domain_name}")
}
