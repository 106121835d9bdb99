// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Registers the relocated First-Class Disk with CNS on the target vCenter
//! so the CSI driver recognizes it. Idempotent by a prior query, since a
//! crash after registration but before the PV is repointed must not attempt
//! to register the same FCD twice.

use migrator_domain::entities::{MigrationSpec, PvMigrationState};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PvMigrationStatus;
use migrator_domain::PhaseContext;

pub async fn run(ctx: &PhaseContext, spec: &MigrationSpec, pv: &mut PvMigrationState, infrastructure_id: &str) -> Result<(), MigrationError> {
    let fcd_id = pv
        .target_fcd_id
        .clone()
        .ok_or_else(|| MigrationError::resource(format!("{} has no target FCD id recorded from the relocate step", pv.pv_name)))?;

    let worker_fd_name = &spec.worker_config.failure_domain_name;
    let worker_fd = spec
        .failure_domain(worker_fd_name)
        .ok_or_else(|| MigrationError::resource(format!("worker failure domain '{worker_fd_name}' not declared")))?;
    let target_server = &worker_fd.server;

    let gateway = ctx.vsphere.gateway_for(target_server).await?;

    if gateway.cns_query_volume(target_server, &fcd_id).await?.is_none() {
        let topology = gateway.resolve_topology(target_server, &worker_fd.topology).await?;
        gateway.cns_register_volume(target_server, &topology.datastore_moref, &fcd_id, infrastructure_id, &pv.pv_name).await?;
    }

    pv.transition(PvMigrationStatus::Registered, format!("FCD {fcd_id} registered with CNS on {target_server}")).map_err(MigrationError::resource)
}
