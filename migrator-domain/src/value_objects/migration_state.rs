// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `spec.state` and `spec.approvalMode`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The user's declared intent for a `VSphereMigration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "PascalCase")]
pub enum MigrationState {
    #[default]
    Pending,
    Running,
    Paused,
    Rollback,
}

/// Whether a phase requiring approval waits for a human, or proceeds
/// unattended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "PascalCase")]
pub enum ApprovalMode {
    #[default]
    Automatic,
    Manual,
}
