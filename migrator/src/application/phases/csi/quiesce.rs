// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Scales every workload mounting the PVC to zero, recording enough to
//! restore them later, and waits for their pods to actually terminate
//! before the PVC can be safely deleted.

use migrator_domain::entities::{PvMigrationState, ScaledWorkload};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::{PvMigrationStatus, WorkloadKind, WorkloadType};
use migrator_domain::PhaseContext;
use std::time::Duration;

const POD_TERMINATION_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const POLL_INTERVAL: Duration = Duration::from_secs(5);

fn workload_type_of(kinds: &[WorkloadKind]) -> WorkloadType {
    if kinds.contains(&WorkloadKind::StatefulSet) {
        WorkloadType::StatefulSet
    } else if kinds.contains(&WorkloadKind::Deployment) {
        WorkloadType::Deployment
    } else if kinds.contains(&WorkloadKind::ReplicaSet) {
        WorkloadType::ReplicaSet
    } else {
        WorkloadType::Other
    }
}

pub async fn run(ctx: &PhaseContext, pv: &mut PvMigrationState) -> Result<(), MigrationError> {
    let workloads = ctx.cluster.workloads_mounting_pvc(&pv.pvc_name, &pv.pvc_namespace).await?;

    pv.workload_type = workload_type_of(&workloads.iter().map(|w| w.kind).collect::<Vec<_>>());

    for workload in &workloads {
        pv.scaled_down_resources.push(ScaledWorkload {
            kind: match workload.kind {
                WorkloadKind::Deployment => WorkloadType::Deployment,
                WorkloadKind::StatefulSet => WorkloadType::StatefulSet,
                WorkloadKind::ReplicaSet => WorkloadType::ReplicaSet,
            },
            name: workload.name.clone(),
            namespace: workload.namespace.clone(),
            original_replicas: workload.replicas,
        });
        ctx.cluster.scale_workload(workload, 0).await?;
    }

    if pv.workload_type != WorkloadType::StatefulSet {
        let spec_base64 = ctx.cluster.get_pvc_spec_base64(&pv.pvc_name, &pv.pvc_namespace).await?;
        pv.pvc_spec_base64 = Some(spec_base64);
    }

    let deadline = POD_TERMINATION_TIMEOUT;
    let mut waited = Duration::ZERO;
    loop {
        if ctx.cluster.pods_for_pvc_terminated(&pv.pvc_name, &pv.pvc_namespace).await? {
            break;
        }
        if waited >= deadline {
            return Err(MigrationError::transient(format!("pods mounting PVC {} did not terminate within {:?}", pv.pvc_name, deadline)));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
        waited += POLL_INTERVAL;
    }

    pv.transition(PvMigrationStatus::Quiesced, format!("scaled down {} workload(s)", workloads.len())).map_err(MigrationError::resource)
}
