// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cluster Gateway Port
//!
//! The domain-side interface to every in-cluster object the phase catalogue
//! touches that isn't the migration object itself: Infrastructure,
//! secrets, config maps, deployments, MachineSets, the ControlPlaneMachineSet,
//! PVs/PVCs, VolumeAttachments, and workload pods.
//!
//! Implementations live in `migrator::infrastructure::cluster` over
//! `kube`/`k8s-openapi`. Every method is expressed in domain DTOs
//! ([`crate::value_objects::cluster`]) so phases never import a Kubernetes
//! client type.

use crate::error::MigrationError;
use crate::value_objects::{ClusterOperatorHealth, CpmsSnapshot, InfrastructurePlatformSpec, MachineSetSummary, PvSummary, WorkloadRef};
use async_trait::async_trait;
use std::collections::BTreeMap;

#[async_trait]
pub trait ClusterGateway: Send + Sync {
    // ---- Infrastructure (singleton "cluster") ----------------------------
    async fn get_infrastructure(&self) -> Result<InfrastructurePlatformSpec, MigrationError>;
    async fn update_infrastructure(&self, spec: &InfrastructurePlatformSpec) -> Result<(), MigrationError>;
    /// The transient CRD mutation UpdateInfrastructure needs to bypass
    /// `x-kubernetes-validations` while patching. Returns the prior CRD
    /// validation rules so they can be restored afterward.
    async fn strip_infrastructure_crd_validations(&self) -> Result<serde_json::Value, MigrationError>;
    async fn restore_infrastructure_crd_validations(&self, previous: serde_json::Value) -> Result<(), MigrationError>;

    // ---- Secrets -----------------------------------------------------------
    async fn get_secret_keys(&self, name: &str, namespace: &str) -> Result<BTreeMap<String, String>, MigrationError>;
    async fn merge_secret_keys(&self, name: &str, namespace: &str, entries: BTreeMap<String, String>) -> Result<(), MigrationError>;
    async fn remove_secret_keys(&self, name: &str, namespace: &str, keys: &[String]) -> Result<(), MigrationError>;

    // ---- ConfigMap (cloud-provider-config) ----------------------------------
    async fn get_config_map(&self, name: &str, namespace: &str, key: &str) -> Result<String, MigrationError>;
    async fn update_config_map(&self, name: &str, namespace: &str, key: &str, contents: String) -> Result<(), MigrationError>;

    // ---- Deployments (CVO, MCO) ---------------------------------------------
    async fn get_deployment_replicas(&self, name: &str, namespace: &str) -> Result<u32, MigrationError>;
    async fn scale_deployment(&self, name: &str, namespace: &str, replicas: u32) -> Result<(), MigrationError>;
    async fn is_deployment_ready(&self, name: &str, namespace: &str) -> Result<bool, MigrationError>;

    // ---- Pods (bounce vSphere CCM / machine API controller / CSI driver) ----
    async fn delete_pods_by_label(&self, namespace: &str, label_selector: &str) -> Result<u32, MigrationError>;
    async fn count_pods_by_label(&self, namespace: &str, label_selector: &str) -> Result<u32, MigrationError>;

    // ---- Cluster operators ---------------------------------------------------
    async fn list_cluster_operator_health(&self) -> Result<Vec<ClusterOperatorHealth>, MigrationError>;

    // ---- MachineSets ---------------------------------------------------------
    async fn get_machine_set(&self, name: &str) -> Result<Option<MachineSetSummary>, MigrationError>;
    async fn list_machine_sets(&self) -> Result<Vec<MachineSetSummary>, MigrationError>;
    /// Creates the worker MachineSet named `name` with the target provider
    /// spec patched in. No-ops (returning the existing summary) if a
    /// MachineSet with this name already exists.
    async fn ensure_machine_set(&self, name: &str, provider_spec_patch: serde_json::Value, replicas: u32) -> Result<MachineSetSummary, MigrationError>;
    async fn scale_machine_set(&self, name: &str, replicas: u32) -> Result<(), MigrationError>;
    async fn delete_machine_set_and_wait_machines_gone(&self, name: &str) -> Result<bool, MigrationError>;
    /// True once every Machine backed by this MachineSet has a Ready node.
    async fn machine_set_nodes_ready(&self, name: &str) -> Result<bool, MigrationError>;

    // ---- ControlPlaneMachineSet ------------------------------------------------
    async fn get_cpms(&self) -> Result<Option<CpmsSnapshot>, MigrationError>;
    async fn delete_cpms(&self) -> Result<(), MigrationError>;
    async fn patch_cpms_failure_domain_and_activate(&self, failure_domain_name: &str) -> Result<(), MigrationError>;

    // ---- PersistentVolumes / PersistentVolumeClaims ----------------------------
    async fn list_vsphere_csi_pvs(&self) -> Result<Vec<PvSummary>, MigrationError>;
    async fn set_pv_reclaim_policy(&self, pv_name: &str, policy: &str) -> Result<(), MigrationError>;
    async fn patch_pv_volume_handle(&self, pv_name: &str, new_handle: &str) -> Result<(), MigrationError>;
    async fn clear_pv_claim_ref(&self, pv_name: &str) -> Result<(), MigrationError>;
    async fn delete_pvc_and_wait(&self, name: &str, namespace: &str) -> Result<(), MigrationError>;
    async fn create_pvc_from_spec_and_wait_bound(&self, name: &str, namespace: &str, spec_base64: &str, bind_to_pv: &str) -> Result<(), MigrationError>;
    /// Base64-encoded snapshot of a PVC's accessModes/resources/storageClass/
    /// labels/annotations, captured by CSI migration's `Quiesced` step so
    /// `Complete` can recreate the claim for non-StatefulSet workloads.
    async fn get_pvc_spec_base64(&self, name: &str, namespace: &str) -> Result<String, MigrationError>;

    // ---- VolumeAttachments (the K8s-level detachment signal) ------------
    async fn volume_attachment_exists_for_pv(&self, pv_name: &str) -> Result<bool, MigrationError>;

    // ---- Workloads mounting a PVC ----------------------------------------------
    async fn workloads_mounting_pvc(&self, pvc_name: &str, namespace: &str) -> Result<Vec<WorkloadRef>, MigrationError>;
    async fn scale_workload(&self, workload: &WorkloadRef, replicas: u32) -> Result<(), MigrationError>;
    async fn pods_for_pvc_terminated(&self, pvc_name: &str, namespace: &str) -> Result<bool, MigrationError>;
}
