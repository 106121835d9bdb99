// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `VSphereMigration.status`: the reconciler's sole write target.

use crate::entities::phase_state::{CurrentPhaseState, PhaseHistoryEntry};
use crate::entities::resource_backup::{BackupKey, ResourceBackup};
use crate::entities::pv_migration_state::PvMigrationState;
use crate::value_objects::phase_status::MigrationPhaseField;
use crate::value_objects::{PhaseName, PhaseStatus};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CsiMigrationState {
    pub total: u32,
    pub migrated: u32,
    pub failed: u32,
    pub volumes: Vec<PvMigrationState>,
}

impl CsiMigrationState {
    /// "the phase reports completion only when total = migrated + failed".
    pub fn is_settled(&self) -> bool {
        self.total == self.migrated + self.failed
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MigrationStatus {
    #[serde(default)]
    pub phase: MigrationPhaseField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_phase_state: Option<CurrentPhaseState>,
    #[serde(default)]
    pub phase_history: Vec<PhaseHistoryEntry>,
    #[serde(default)]
    pub backups: Vec<ResourceBackup>,
    #[serde(default)]
    pub csi_migration_state: CsiMigrationState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,
}

impl MigrationStatus {
    /// Backup store: `BackupResource` — idempotent by key, the cluster
    /// status is the sole store.
    pub fn backup_resource(&mut self, backup: ResourceBackup) {
        let key = backup.key();
        if self.backups.iter().any(|b| b.key() == key) {
            return;
        }
        self.backups.push(backup);
    }

    /// Backup store: `GetBackup`.
    pub fn get_backup(&self, key: &BackupKey) -> Option<&ResourceBackup> {
        self.backups.iter().find(|b| &b.key() == key)
    }

    /// The single incomplete history entry, if any (at most
    /// one may exist, and it must match `currentPhaseState.name`).
    pub fn open_history_entry(&self) -> Option<&PhaseHistoryEntry> {
        self.phase_history.iter().find(|e| e.is_incomplete())
    }

    pub fn open_history_entry_mut(&mut self) -> Option<&mut PhaseHistoryEntry> {
        self.phase_history.iter_mut().find(|e| e.is_incomplete())
    }

    /// Consistency check used by tests and defensively by the state
    /// machine before mutating history.
    pub fn invariants_hold(&self) -> bool {
        let open: Vec<_> = self.phase_history.iter().filter(|e| e.is_incomplete()).collect();
        if open.len() > 1 {
            return false;
        }
        if let (Some(entry), Some(current)) = (open.first(), &self.current_phase_state) {
            if entry.phase != current.name {
                return false;
            }
        }
        true
    }

    /// Phase history appears in canonical order, skipping
    /// `Skipped` entries (they may appear out of the "every phase ran" set
    /// but never out of relative order).
    pub fn history_is_in_canonical_order(&self) -> bool {
        let mut last_index: Option<usize> = None;
        for entry in &self.phase_history {
            if !entry.status.is_done() && !matches!(entry.status, PhaseStatus::Failed) {
                continue;
            }
            let idx = entry.phase.index();
            if let Some(last) = last_index {
                if idx < last {
                    return false;
                }
            }
            last_index = Some(idx);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backup(kind: &str, name: &str) -> ResourceBackup {
        ResourceBackup {
            kind: kind.into(),
            name: name.into(),
            namespace: "openshift-config".into(),
            payload_base64: "eA==".into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn backup_resource_is_idempotent_by_key() {
        let mut status = MigrationStatus::default();
        status.backup_resource(backup("Infrastructure", "cluster"));
        status.backup_resource(backup("Infrastructure", "cluster"));
        assert_eq!(status.backups.len(), 1);
    }

    #[test]
    fn get_backup_finds_by_key() {
        let mut status = MigrationStatus::default();
        status.backup_resource(backup("Secret", "vsphere-creds"));
        let key = BackupKey::new("Secret", "vsphere-creds", "openshift-config");
        assert!(status.get_backup(&key).is_some());
    }

    #[test]
    fn csi_state_settled_iff_total_equals_migrated_plus_failed() {
        let mut csi = CsiMigrationState { total: 2, migrated: 1, failed: 0, volumes: vec![] };
        assert!(!csi.is_settled());
        csi.failed = 1;
        assert!(csi.is_settled());
    }

    #[test]
    fn invariants_hold_rejects_two_open_entries() {
        let mut status = MigrationStatus::default();
        status.phase_history.push(PhaseHistoryEntry {
            phase: PhaseName::Preflight,
            status: PhaseStatus::Running,
            start_time: Utc::now(),
            completion_time: None,
            message: String::new(),
            logs: vec![],
        });
        status.phase_history.push(PhaseHistoryEntry {
            phase: PhaseName::Backup,
            status: PhaseStatus::Running,
            start_time: Utc::now(),
            completion_time: None,
            message: String::new(),
            logs: vec![],
        });
        assert!(!status.invariants_hold());
    }
}
