// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The cross-vCenter relocate itself: a dummy VM is created on the source
//! side, the First-Class Disk is attached to it, and the VM is vMotioned to
//! the target vCenter carrying the disk along. Three defense-in-depth checks
//! run before any of this happens, since a false positive here orphans a
//! disk that workloads still depend on.

use migrator_domain::entities::{MigrationSpec, PvMigrationState};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::{parse_fcd_id, PvMigrationStatus};
use migrator_domain::PhaseContext;
use std::time::Duration;

use super::dummy_vm;

const FOLDER_SCAN_TIMEOUT: Duration = Duration::from_secs(2 * 60);
const POLL_INTERVAL: Duration = Duration::from_secs(5);

fn source_server(spec: &MigrationSpec, infra_vcenters: &[String]) -> Result<String, MigrationError> {
    let targets = spec.unique_target_servers();
    infra_vcenters
        .iter()
        .find(|v| !targets.contains(v))
        .cloned()
        .ok_or_else(|| MigrationError::resource("no source vCenter distinct from the declared target servers"))
}

/// Defense-in-depth: the VolumeAttachment is re-checked, then every VM
/// in the target worker folder is scanned for the FCD, then each candidate's
/// device list is read directly. Any positive hit aborts the relocate.
async fn verify_not_attached(ctx: &PhaseContext, pv: &PvMigrationState, fcd_id: &str, target_server: &str, target_folder_moref: &str) -> Result<(), MigrationError> {
    if ctx.cluster.volume_attachment_exists_for_pv(&pv.pv_name).await? {
        return Err(MigrationError::safety_gated(format!("VolumeAttachment for {} reappeared before relocation", pv.pv_name)));
    }

    let gateway = ctx.vsphere.gateway_for(target_server).await?;
    let mut waited = Duration::ZERO;
    loop {
        let vms = gateway.list_vms_in_folder(target_server, target_folder_moref).await?;
        let mut still_attached = false;
        for vm in &vms {
            if vm.attached_fcd_ids.iter().any(|id| id == fcd_id) {
                still_attached = true;
                break;
            }
            let devices = gateway.vm_device_fcd_ids(target_server, &vm.moref).await?;
            if devices.iter().any(|id| id == fcd_id) {
                still_attached = true;
                break;
            }
        }
        if !still_attached {
            return Ok(());
        }
        if waited >= FOLDER_SCAN_TIMEOUT {
            return Err(MigrationError::safety_gated(format!("FCD {fcd_id} still appears attached to a VM in the target worker folder")));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
        waited += POLL_INTERVAL;
    }
}

pub async fn run(ctx: &PhaseContext, spec: &MigrationSpec, pv: &mut PvMigrationState, infrastructure_id: &str, infra_vcenters: &[String]) -> Result<(), MigrationError> {
    let fcd_id = parse_fcd_id(&pv.source_volume_path)?;
    pv.source_fcd_id = Some(fcd_id.clone());

    let worker_fd_name = &spec.worker_config.failure_domain_name;
    let worker_fd = spec
        .failure_domain(worker_fd_name)
        .ok_or_else(|| MigrationError::resource(format!("worker failure domain '{worker_fd_name}' not declared")))?;
    let target_server = worker_fd.server.clone();

    let target_gateway = ctx.vsphere.gateway_for(&target_server).await?;
    let target_topology = target_gateway.resolve_topology(&target_server, &worker_fd.topology).await?;
    let target_folder_path = worker_fd.topology.folder.clone().unwrap_or_else(|| worker_fd.default_folder_path(infrastructure_id));
    let target_folder_moref = target_gateway.ensure_folder(&target_server, &target_topology.datacenter_moref, &target_folder_path).await?;

    verify_not_attached(ctx, pv, &fcd_id, &target_server, &target_folder_moref).await?;

    if pv.status == PvMigrationStatus::PvcDeleted {
        pv.transition(PvMigrationStatus::Relocating, "defense-in-depth checks passed, starting cross-vCenter relocate").map_err(MigrationError::resource)?;
    }

    let source_server_fqdn = source_server(spec, infra_vcenters)?;
    let source_gateway = ctx.vsphere.gateway_for(&source_server_fqdn).await?;
    let source_folder_moref = source_gateway.default_vm_folder(&source_server_fqdn).await?;
    dummy_vm::sweep_orphan(source_gateway.as_ref(), &source_server_fqdn, &source_folder_moref, infrastructure_id, &pv.pv_name).await?;

    let dummy_name = PvMigrationState::dummy_vm_name(infrastructure_id, &pv.pv_name);
    pv.dummy_vm_name = Some(dummy_name.clone());
    let dummy_vm = source_gateway.create_dummy_vm_with_fcd(&source_server_fqdn, &source_folder_moref, &dummy_name, &fcd_id).await?;

    let mut cross_target = target_gateway.cross_vcenter_target(&target_server, &target_topology).await?;
    cross_target.folder_moref = target_folder_moref;
    cross_target.validate()?;

    let relocated_vm = source_gateway.relocate_cross_vcenter(&dummy_vm, &cross_target).await?;

    target_gateway.detach_fcd(&relocated_vm, &fcd_id).await?;
    target_gateway.delete_vm(&relocated_vm).await?;

    pv.target_fcd_id = Some(fcd_id);
    pv.transition(PvMigrationStatus::Relocated, format!("relocated to {target_server} via dummy VM {dummy_name}")).map_err(MigrationError::resource)
}
