// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Final step: restore what `Quiesced` tore down. StatefulSets regenerate
//! their own PVC from `volumeClaimTemplates` once scaled back up, so only
//! Deployment/ReplicaSet-backed claims need explicit recreation.

use migrator_domain::entities::PvMigrationState;
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::{PvMigrationStatus, WorkloadKind, WorkloadRef, WorkloadType};
use migrator_domain::PhaseContext;

pub async fn run(ctx: &PhaseContext, pv: &mut PvMigrationState) -> Result<(), MigrationError> {
    if pv.workload_type != WorkloadType::StatefulSet {
        let spec_base64 = pv
            .pvc_spec_base64
            .clone()
            .ok_or_else(|| MigrationError::resource(format!("{} has no captured PVC spec to recreate from", pv.pvc_name)))?;
        ctx.cluster.create_pvc_from_spec_and_wait_bound(&pv.pvc_name, &pv.pvc_namespace, &spec_base64, &pv.pv_name).await?;
    }

    for scaled in &pv.scaled_down_resources {
        let kind = match scaled.kind {
            WorkloadType::StatefulSet => WorkloadKind::StatefulSet,
            WorkloadType::Deployment => WorkloadKind::Deployment,
            WorkloadType::ReplicaSet | WorkloadType::Other => WorkloadKind::ReplicaSet,
        };
        let workload = WorkloadRef { kind, name: scaled.name.clone(), namespace: scaled.namespace.clone(), replicas: scaled.original_replicas };
        ctx.cluster.scale_workload(&workload, scaled.original_replicas).await?;
    }

    pv.transition(PvMigrationStatus::Complete, "volume migrated and dependent workloads restored").map_err(MigrationError::resource)
}
