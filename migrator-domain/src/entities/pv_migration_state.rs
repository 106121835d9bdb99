// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Per-volume CSI migration state.

use crate::value_objects::{PvMigrationStatus, WorkloadType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A workload (Deployment/StatefulSet/ReplicaSet) that was scaled to zero so
/// its PVC could be detached, and needs restoring on success.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScaledWorkload {
    pub kind: WorkloadType,
    pub name: String,
    pub namespace: String,
    pub original_replicas: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PvMigrationState {
    pub pv_name: String,
    pub pvc_name: String,
    pub pvc_namespace: String,
    pub source_volume_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_fcd_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_fcd_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dummy_vm_name: Option<String>,
    pub original_reclaim_policy: String,
    #[serde(default)]
    pub scaled_down_resources: Vec<ScaledWorkload>,
    pub workload_type: WorkloadType,
    /// Base64-encoded serialized PVC spec (accessModes, resources,
    /// storageClass, labels, annotations), captured for non-StatefulSet
    /// workloads so `Complete` can recreate the PVC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pvc_spec_base64: Option<String>,
    pub status: PvMigrationStatus,
    pub message: String,
}

impl PvMigrationState {
    pub fn new(pv_name: impl Into<String>, pvc_name: impl Into<String>, pvc_namespace: impl Into<String>, source_volume_path: impl Into<String>, original_reclaim_policy: impl Into<String>) -> Self {
        Self {
            pv_name: pv_name.into(),
            pvc_name: pvc_name.into(),
            pvc_namespace: pvc_namespace.into(),
            source_volume_path: source_volume_path.into(),
            source_fcd_id: None,
            target_fcd_id: None,
            dummy_vm_name: None,
            original_reclaim_policy: original_reclaim_policy.into(),
            scaled_down_resources: Vec::new(),
            workload_type: WorkloadType::Other,
            pvc_spec_base64: None,
            status: PvMigrationStatus::Pending,
            message: String::new(),
        }
    }

    /// Advances `status`, enforcing the DAG (never downgraded
    /// except through rollback, which this system does not apply to
    /// individual PVs — a failed volume is terminal and needs manual
    /// remediation).
    pub fn transition(&mut self, next: PvMigrationStatus, message: impl Into<String>) -> Result<(), String> {
        if !self.status.can_transition_to(next) {
            return Err(format!("illegal PV migration transition {:?} -> {:?} for {}", self.status, next, self.pv_name));
        }
        self.status = next;
        self.message = message.into();
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        // Failure is reachable from any non-terminal state; ignore the
        // predicate here since "any step failure" is the whole point of this
        // helper.
        if !self.status.is_terminal() {
            self.status = PvMigrationStatus::Failed;
        }
        self.message = message.into();
    }

    pub fn dummy_vm_name(infrastructure_id: &str, pv_name: &str) -> String {
        let short: String = pv_name.chars().filter(|c| c.is_ascii_alphanumeric()).take(8).collect();
        format!("csi-migration-{infrastructure_id}-{short}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transition_succeeds() {
        let mut s = PvMigrationState::new("pv-a", "pvc-a", "ns", "[ds] vol", "Delete");
        assert!(s.transition(PvMigrationStatus::RetainSet, "retain policy set").is_ok());
        assert_eq!(s.status, PvMigrationStatus::RetainSet);
    }

    #[test]
    fn illegal_transition_rejected() {
        let mut s = PvMigrationState::new("pv-a", "pvc-a", "ns", "[ds] vol", "Delete");
        assert!(s.transition(PvMigrationStatus::Relocating, "skip ahead").is_err());
    }

    #[test]
    fn fail_is_reachable_from_any_non_terminal_state() {
        let mut s = PvMigrationState::new("pv-a", "pvc-a", "ns", "[ds] vol", "Delete");
        s.transition(PvMigrationStatus::RetainSet, "ok").unwrap();
        s.transition(PvMigrationStatus::Quiesced, "ok").unwrap();
        s.fail("vMotion failed");
        assert_eq!(s.status, PvMigrationStatus::Failed);
    }

    #[test]
    fn dummy_vm_name_is_deterministic() {
        let a = PvMigrationState::dummy_vm_name("abcde-12345", "pvc-0a1b2c3d");
        let b = PvMigrationState::dummy_vm_name("abcde-12345", "pvc-0a1b2c3d");
        assert_eq!(a, b);
        assert!(a.starts_with("csi-migration-abcde-12345-"));
    }
}
