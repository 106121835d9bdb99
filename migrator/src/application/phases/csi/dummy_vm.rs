// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The dummy VM used to ferry a First-Class Disk across vCenters is created,
//! used, and deleted within a single `Relocating` step. A crash between
//! creation and deletion leaves an orphan on the source vCenter; its name is
//! deterministic, so a resume can find and remove it before starting a fresh
//! relocation attempt.
//!
//! Rust has no async `Drop`, so this is a pre-step sweep rather than an
//! RAII guard — callers invoke [`sweep_orphan`] before creating a new dummy
//! VM, not on scope exit.

use migrator_domain::entities::PvMigrationState;
use migrator_domain::error::MigrationError;
use migrator_domain::repositories::VsphereGateway;

pub async fn sweep_orphan(gateway: &dyn VsphereGateway, server: &str, folder_moref: &str, infrastructure_id: &str, pv_name: &str) -> Result<(), MigrationError> {
    let name = PvMigrationState::dummy_vm_name(infrastructure_id, pv_name);
    if let Some(orphan) = gateway.find_vm_by_name(server, folder_moref, &name).await? {
        gateway.delete_vm(&orphan).await?;
    }
    Ok(())
}
