// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Phase Contract (Component D)
//!
//! Every member of the 17-phase catalogue implements [`Phase`]. The
//! reconciler never matches on [`crate::value_objects::PhaseName`] to decide
//! what to run — it looks the phase up in the catalogue table and calls
//! `validate`/`execute`/`rollback` uniformly.

use crate::entities::{MigrationSpec, MigrationStatus};
use crate::error::MigrationError;
use crate::repositories::{Clock, ClusterGateway, VsphereGatewayFactory};
use crate::value_objects::PhaseName;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Everything a phase needs, bundled so the catalogue can construct each
/// phase with the same four handles rather than threading individual
/// dependencies through every call site.
#[derive(Clone)]
pub struct PhaseContext {
    pub cluster: Arc<dyn ClusterGateway>,
    pub vsphere: Arc<dyn VsphereGatewayFactory>,
    pub clock: Arc<dyn Clock>,
}

impl PhaseContext {
    pub fn new(cluster: Arc<dyn ClusterGateway>, vsphere: Arc<dyn VsphereGatewayFactory>, clock: Arc<dyn Clock>) -> Self {
        Self { cluster, vsphere, clock }
    }
}

/// What a phase invocation reports back to the reconciler. Distinct from
/// `PhaseHistoryEntry`/`CurrentPhaseState` (the persisted shapes) because a
/// single call may need to request a requeue without yet knowing the final
/// history message the aggregate will record.
#[derive(Debug, Clone)]
pub struct PhaseOutcome {
    pub status: crate::value_objects::PhaseStatus,
    pub progress: u8,
    pub message: String,
    pub logs: Vec<String>,
    /// Set when the phase is still in flight and wants to be polled again
    /// rather than have the reconciler wait on it synchronously
    /// long-running resumable work: CPMS rollout, CSI per-volume steps).
    pub requeue_after: Option<Duration>,
}

impl PhaseOutcome {
    pub fn completed(message: impl Into<String>) -> Self {
        Self { status: crate::value_objects::PhaseStatus::Completed, progress: 100, message: message.into(), logs: Vec::new(), requeue_after: None }
    }

    pub fn running(progress: u8, message: impl Into<String>, requeue_after: Duration) -> Self {
        Self {
            status: crate::value_objects::PhaseStatus::Running,
            progress,
            message: message.into(),
            logs: Vec::new(),
            requeue_after: Some(requeue_after),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { status: crate::value_objects::PhaseStatus::Failed, progress: 0, message: message.into(), logs: Vec::new(), requeue_after: None }
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self { status: crate::value_objects::PhaseStatus::Skipped, progress: 100, message: message.into(), logs: Vec::new(), requeue_after: None }
    }

    pub fn with_logs(mut self, logs: Vec<String>) -> Self {
        self.logs = logs;
        self
    }
}

#[async_trait]
pub trait Phase: Send + Sync {
    fn name(&self) -> PhaseName;

    /// Rejects an invalid declared spec before any side effect is attempted
    ///.
    async fn validate(&self, spec: &MigrationSpec, status: &MigrationStatus) -> Result<(), MigrationError>;

    /// Performs (or resumes) this phase's work. Implementations must be safe
    /// to call repeatedly against partially-completed state — resume is not
    /// a separate code path.
    async fn execute(&self, ctx: &PhaseContext, spec: &MigrationSpec, status: &mut MigrationStatus) -> Result<PhaseOutcome, MigrationError>;

    /// Undoes this phase's effects during a rollback sweep, using whatever
    /// this phase itself stashed in `status.backups`. Errors are
    /// logged by the rollback sweep and do not abort it.
    async fn rollback(&self, ctx: &PhaseContext, spec: &MigrationSpec, status: &mut MigrationStatus) -> Result<(), MigrationError>;

    /// Whether a fresh `CurrentPhaseState` for this phase should start with
    /// `requiresApproval=true` (CreateWorkers, RecreateCPMS, and
    /// ScaleOldMachines gate on manual approval since they are the
    /// substrate-committing phases; every other phase proceeds unattended
    /// even under `approvalMode=Manual`).
    fn requires_approval(&self) -> bool {
        false
    }
}
