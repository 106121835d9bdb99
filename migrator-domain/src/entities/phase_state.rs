// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `status.currentPhaseState` and `status.phaseHistory` entries.

use crate::value_objects::{PhaseName, PhaseStatus};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The phase presently (or most recently) in flight. Cleared on completion
/// once a phase finishes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CurrentPhaseState {
    pub name: PhaseName,
    pub status: PhaseStatus,
    pub progress: u8,
    pub message: String,
    pub requires_approval: bool,
    pub approved: bool,
    pub start_time: DateTime<Utc>,
}

impl CurrentPhaseState {
    pub fn new(name: PhaseName, start_time: DateTime<Utc>) -> Self {
        Self {
            name,
            status: PhaseStatus::Pending,
            progress: 0,
            message: String::new(),
            requires_approval: false,
            approved: false,
            start_time,
        }
    }

    /// A phase is "resuming" if the persisted state names this phase and was
    /// last left `Running`.
    pub fn is_resuming(&self, name: PhaseName) -> bool {
        self.name == name && matches!(self.status, PhaseStatus::Running)
    }
}

/// One append-only entry in `status.phaseHistory`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PhaseHistoryEntry {
    pub phase: PhaseName,
    pub status: PhaseStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,
    pub message: String,
    #[serde(default)]
    pub logs: Vec<String>,
}

impl PhaseHistoryEntry {
    /// An entry is "incomplete" when it
    /// has no completion time yet.
    pub fn is_incomplete(&self) -> bool {
        self.completion_time.is_none()
    }
}
