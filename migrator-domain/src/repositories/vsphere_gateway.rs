// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # vSphere Gateway Port
//!
//! The domain-side interface to vCenter (Component A, vSphere half). The
//! infrastructure layer implements this over the vCenter REST/Automation
//! API; phases depend only on this trait, never on a concrete HTTP client.
//!
//! Every vCenter is addressed by its FQDN (`server`); implementations own
//! session/connection pooling per server and log out when the gateway is
//! dropped — phases never manage sessions directly.

use crate::error::MigrationError;
use crate::value_objects::{CrossVCenterTarget, DummyVmHandle, FailureDomainTopology, ResolvedTopology, TagCategory, VmSummary};
use async_trait::async_trait;

#[async_trait]
pub trait VsphereGateway: Send + Sync {
    /// Establishes (or reuses) a session against `server` using the
    /// credentials resolved from `spec.targetCredentialsRef`.
    async fn connect(&self, server: &str) -> Result<(), MigrationError>;

    /// Preflight: resolves a failure domain's declared names into morefs,
    /// reporting any declared network that cannot be found rather than
    /// failing outright, so the caller can build one precise error message.
    async fn resolve_topology(&self, server: &str, topology: &FailureDomainTopology) -> Result<ResolvedTopology, MigrationError>;

    /// CreateTags: idempotent by name — returns the existing tag id if a tag
    /// with this name already exists in the category.
    async fn ensure_tag(&self, server: &str, category: TagCategory, name: &str) -> Result<String, MigrationError>;

    async fn attach_tag(&self, server: &str, tag_id: &str, object_moref: &str) -> Result<(), MigrationError>;

    /// CreateFolder: idempotent — returns the folder moref whether it was
    /// just created or already existed. Callers are responsible for reading
    /// the result back to confirm.
    async fn ensure_folder(&self, server: &str, datacenter_moref: &str, path: &str) -> Result<String, MigrationError>;

    async fn folder_exists(&self, server: &str, datacenter_moref: &str, path: &str) -> Result<bool, MigrationError>;

    /// A usable VM folder moref on `server` for transient objects (the CSI
    /// dummy VM) that don't belong under a migration-managed folder.
    async fn default_vm_folder(&self, server: &str) -> Result<String, MigrationError>;

    /// Resolves the connection-level details (SSL thumbprint, instance UUID)
    /// a cross-vCenter relocate needs, combined with a already-resolved
    /// topology's morefs.
    async fn cross_vcenter_target(&self, server: &str, topology: &ResolvedTopology) -> Result<CrossVCenterTarget, MigrationError>;

    /// CSI Relocating: creates a 1 vCPU / 128 MB dummy VM in `folder` on
    /// `server` and attaches `fcd_id` to its SCSI controller.
    async fn create_dummy_vm_with_fcd(
        &self,
        server: &str,
        folder_moref: &str,
        name: &str,
        fcd_id: &str,
    ) -> Result<DummyVmHandle, MigrationError>;

    /// Cross-vCenter vMotion of the dummy VM. `target` must be fully
    /// populated: empty SSL thumbprint or instance UUID aborts before
    /// any call is made.
    async fn relocate_cross_vcenter(&self, vm: &DummyVmHandle, target: &CrossVCenterTarget) -> Result<DummyVmHandle, MigrationError>;

    async fn detach_fcd(&self, vm: &DummyVmHandle, fcd_id: &str) -> Result<(), MigrationError>;

    async fn delete_vm(&self, vm: &DummyVmHandle) -> Result<(), MigrationError>;

    /// Defense-in-depth layer 3: the device list of a specific VM.
    async fn vm_device_fcd_ids(&self, server: &str, vm_moref: &str) -> Result<Vec<String>, MigrationError>;

    /// Defense-in-depth layer 2: scans every VM in a folder.
    async fn list_vms_in_folder(&self, server: &str, folder_moref: &str) -> Result<Vec<VmSummary>, MigrationError>;

    /// Finds a VM by its deterministic dummy-VM name, for the orphan sweep
    ///.
    async fn find_vm_by_name(&self, server: &str, folder_moref: &str, name: &str) -> Result<Option<DummyVmHandle>, MigrationError>;

    /// CNS Registered step: idempotent by a prior query.
    async fn cns_query_volume(&self, server: &str, fcd_id: &str) -> Result<Option<String>, MigrationError>;

    async fn cns_register_volume(
        &self,
        server: &str,
        datastore_moref: &str,
        fcd_id: &str,
        infrastructure_id: &str,
        pv_name: &str,
    ) -> Result<String, MigrationError>;
}

/// Builds (and caches) [`VsphereGateway`] sessions per target server. Kept
/// separate from the gateway trait itself so a single gateway instance can
/// be threaded through [`crate::services::phase::PhaseContext`] without the
/// phase catalogue re-resolving credentials on every call.
#[async_trait]
pub trait VsphereGatewayFactory: Send + Sync {
    async fn gateway_for(&self, server: &str) -> Result<std::sync::Arc<dyn VsphereGateway>, MigrationError>;
}
