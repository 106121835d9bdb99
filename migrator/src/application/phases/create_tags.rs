// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Creates the region/zone tags in each target vCenter and attaches them to
//! the resolved datacenter and compute cluster. Tag creation is idempotent
//! by name, so re-entering this phase never creates duplicates.

use migrator_domain::entities::{MigrationSpec, MigrationStatus};
use migrator_domain::error::MigrationError;
use migrator_domain::value_objects::{PhaseName, TagCategory};
use migrator_domain::{Phase, PhaseContext, PhaseOutcome};

pub struct CreateTagsPhase;

#[async_trait::async_trait]
impl Phase for CreateTagsPhase {
    fn name(&self) -> PhaseName {
        PhaseName::CreateTags
    }

    async fn validate(&self, _spec: &MigrationSpec, _status: &MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn execute(&self, ctx: &PhaseContext, spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError> {
        let mut logs = Vec::new();
        for fd in &spec.failure_domains {
            let gateway = ctx.vsphere.gateway_for(&fd.server).await?;
            let topology = gateway.resolve_topology(&fd.server, &fd.topology).await?;

            let region_tag = gateway.ensure_tag(&fd.server, TagCategory::Region, &fd.region).await?;
            gateway.attach_tag(&fd.server, &region_tag, &topology.datacenter_moref).await?;

            let zone_tag = gateway.ensure_tag(&fd.server, TagCategory::Zone, &fd.zone).await?;
            gateway.attach_tag(&fd.server, &zone_tag, &topology.compute_cluster_moref).await?;

            logs.push(format!("tagged {} with region={} zone={}", fd.server, fd.region, fd.zone));
        }
        Ok(PhaseOutcome::completed(format!("tagged {} failure domain(s)", spec.failure_domains.len())).with_logs(logs))
    }

    async fn rollback(&self, _ctx: &PhaseContext, _spec: &MigrationSpec, _status: &mut MigrationStatus) -> Result<(), MigrationError> {
        Ok(())
    }
}
