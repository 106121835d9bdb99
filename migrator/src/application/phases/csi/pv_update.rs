// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Repoints the PersistentVolume at the relocated disk and clears its stale
//! claim reference so a fresh (or, for StatefulSets, the same) PVC can bind
//! to it.

use migrator_domain::entities::PvMigrationState;
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PvMigrationStatus;
use migrator_domain::PhaseContext;

pub async fn run(ctx: &PhaseContext, pv: &mut PvMigrationState) -> Result<(), MigrationError> {
    let fcd_id = pv
        .target_fcd_id
        .clone()
        .ok_or_else(|| MigrationError::resource(format!("{} has no target FCD id recorded", pv.pv_name)))?;

    let new_handle = format!("file://{fcd_id}");
    ctx.cluster.patch_pv_volume_handle(&pv.pv_name, &new_handle).await?;
    ctx.cluster.clear_pv_claim_ref(&pv.pv_name).await?;

    pv.transition(PvMigrationStatus::PvUpdated, format!("volume handle repointed to {new_handle}")).map_err(MigrationError::resource)
}
