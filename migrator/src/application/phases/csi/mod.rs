// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The per-volume CSI migration DAG. Each module is one step; [`advance_one_step`]
//! dispatches a single [`PvMigrationState`] to the step matching its current
//! status, advancing it exactly one edge per call so a reconcile never blocks
//! on more than one volume's worth of vSphere work at a time.

mod complete;
mod dummy_vm;
mod pv_update;
mod pvc_delete;
mod quiesce;
mod register;
mod relocate;
mod retain_set;

use migrator_domain::entities::{MigrationSpec, PvMigrationState};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PvMigrationStatus;
use migrator_domain::PhaseContext;

pub async fn advance_one_step(ctx: &PhaseContext, spec: &MigrationSpec, pv: &mut PvMigrationState, infrastructure_id: &str, infra_vcenters: &[String]) -> Result<(), MigrationError> {
    match pv.status {
        PvMigrationStatus::Pending => retain_set::run(ctx, pv).await,
        PvMigrationStatus::RetainSet => quiesce::run(ctx, pv).await,
        PvMigrationStatus::Quiesced => pvc_delete::run(ctx, pv).await,
        // `Relocating` is re-entered rather than no-op'd: a crash mid-relocate
        // leaves a volume here, and the step itself is safe to retry (the
        // orphan sweep clears any half-finished dummy VM first).
        PvMigrationStatus::PvcDeleted | PvMigrationStatus::Relocating => relocate::run(ctx, spec, pv, infrastructure_id, infra_vcenters).await,
        PvMigrationStatus::Relocated => register::run(ctx, spec, pv, infrastructure_id).await,
        PvMigrationStatus::Registered => pv_update::run(ctx, pv).await,
        PvMigrationStatus::PvUpdated => complete::run(ctx, pv).await,
        PvMigrationStatus::Complete | PvMigrationStatus::Failed => Ok(()),
    }
}
