// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! First DAG step: set the PV's reclaim policy to Retain so deleting its
//! PVC later doesn't take the underlying disk with it.

use migrator_domain::entities::PvMigrationState;
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PvMigrationStatus;
use migrator_domain::PhaseContext;

pub async fn run(ctx: &PhaseContext, pv: &mut PvMigrationState) -> Result<(), MigrationError> {
    ctx.cluster.set_pv_reclaim_policy(&pv.pv_name, "Retain").await?;
    pv.transition(PvMigrationStatus::RetainSet, "reclaim policy set to Retain").map_err(MigrationError::resource)
}
