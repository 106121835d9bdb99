// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `currentPhaseState.status` / `phaseHistory[].status`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum PhaseStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl PhaseStatus {
    /// A phase entry with this status is "done" for pipeline-order purposes:
    /// phases appear in order with no skips except Skipped-status entries.
    pub fn is_done(self) -> bool {
        matches!(self, PhaseStatus::Completed | PhaseStatus::Skipped)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PhaseStatus::Completed | PhaseStatus::Failed | PhaseStatus::Skipped)
    }
}

/// `status.phase`: the pipeline position, plus the two terminal-leaning
/// states orthogonal to the forward pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum MigrationPhaseField {
    NotStarted,
    InPhase(crate::value_objects::phase_name::PhaseName),
    Completed,
    Failed,
    RollingBack,
    RollbackCompleted,
}

impl Default for MigrationPhaseField {
    fn default() -> Self {
        MigrationPhaseField::NotStarted
    }
}
