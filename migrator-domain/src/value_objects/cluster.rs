// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain-side DTOs exchanged across the [`crate::repositories::ClusterGateway`]
//! port. Kept independent of `k8s-openapi` so the domain crate has no
//! dependency on the Kubernetes client stack; the infrastructure layer maps
//! these to/from real API types.

use serde::{Deserialize, Serialize};

/// `Infrastructure.spec.platformSpec.vsphere`, reduced to the fields the
/// pipeline reads or mutates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfrastructurePlatformSpec {
    pub infrastructure_name: String,
    pub vcenters: Vec<String>,
    pub failure_domain_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterOperatorConditionType {
    Available,
    Degraded,
    Progressing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterOperatorHealth {
    pub name: String,
    pub available: bool,
    pub degraded: bool,
    pub progressing: bool,
}

impl ClusterOperatorHealth {
    pub fn is_healthy(&self) -> bool {
        self.available && !self.degraded && !self.progressing
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineSetSummary {
    pub name: String,
    pub replicas: u32,
    pub ready_replicas: u32,
    /// `true` if the provider spec's `workspace.server` matches a source
    /// vCenter, used by ScaleOldMachines to find MachineSets to retire.
    pub provider_server: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpmsState {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpmsSnapshot {
    pub state: CpmsState,
    pub generation: i64,
    pub observed_generation: i64,
    pub replicas: u32,
    pub updated_replicas: u32,
    pub ready_replicas: u32,
}

impl CpmsSnapshot {
    /// Rollout is complete only when all three replica counts
    /// equal the same non-zero value, *and* the controller has observed the
    /// spec bump.
    pub fn rollout_is_complete(&self) -> bool {
        self.observed_generation >= self.generation
            && self.replicas > 0
            && self.replicas == self.updated_replicas
            && self.replicas == self.ready_replicas
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PvSummary {
    pub name: String,
    pub volume_handle: String,
    pub driver: String,
    pub reclaim_policy: String,
    pub bound_pvc_name: Option<String>,
    pub bound_pvc_namespace: Option<String>,
}

impl PvSummary {
    pub const VSPHERE_CSI_DRIVER: &'static str = "csi.vsphere.vmware.com";

    pub fn is_vsphere_csi(&self) -> bool {
        self.driver == Self::VSPHERE_CSI_DRIVER
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    ReplicaSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadRef {
    pub kind: WorkloadKind,
    pub name: String,
    pub namespace: String,
    pub replicas: u32,
}
