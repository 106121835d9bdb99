// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Deletes the PVC — safe now that the PV's reclaim policy is Retain — and
//! waits for the CSI driver to tear down the VolumeAttachment before the
//! disk can be relocated.

use migrator_domain::entities::PvMigrationState;
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::PvMigrationStatus;
use migrator_domain::PhaseContext;
use std::time::Duration;

const DETACH_TIMEOUT: Duration = Duration::from_secs(3 * 60);
const POLL_INTERVAL: Duration = Duration::from_secs(5);

pub async fn run(ctx: &PhaseContext, pv: &mut PvMigrationState) -> Result<(), MigrationError> {
    ctx.cluster.delete_pvc_and_wait(&pv.pvc_name, &pv.pvc_namespace).await?;

    let mut waited = Duration::ZERO;
    while ctx.cluster.volume_attachment_exists_for_pv(&pv.pv_name).await? {
        if waited >= DETACH_TIMEOUT {
            return Err(MigrationError::transient(format!("VolumeAttachment for {} did not clear within {:?}", pv.pv_name, DETACH_TIMEOUT)));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
        waited += POLL_INTERVAL;
    }

    pv.transition(PvMigrationStatus::PvcDeleted, "PVC deleted and VolumeAttachment cleared").map_err(MigrationError::resource)
}
