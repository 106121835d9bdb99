// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The canonical 17-phase pipeline order — the full forward/rollback
//! superset, independent of which phases a given migration actually needs.
//!
//! `PhaseName::ORDER` is the single table consulted both by the reconciler's
//! forward dispatch and by the rollback sweep.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum PhaseName {
    Preflight,
    Backup,
    DisableCvo,
    UpdateSecrets,
    CreateTags,
    CreateFolder,
    DeleteCpms,
    UpdateInfrastructure,
    UpdateConfig,
    RestartPods,
    MonitorHealth,
    CreateWorkers,
    RecreateCpms,
    MigrateCsiVolumes,
    ScaleOldMachines,
    Cleanup,
    Verify,
}

impl PhaseName {
    /// Canonical forward order. Index in this array is the phase's pipeline
    /// position; rollback walks it in reverse.
    pub const ORDER: [PhaseName; 17] = [
        PhaseName::Preflight,
        PhaseName::Backup,
        PhaseName::DisableCvo,
        PhaseName::UpdateSecrets,
        PhaseName::CreateTags,
        PhaseName::CreateFolder,
        PhaseName::DeleteCpms,
        PhaseName::UpdateInfrastructure,
        PhaseName::UpdateConfig,
        PhaseName::RestartPods,
        PhaseName::MonitorHealth,
        PhaseName::CreateWorkers,
        PhaseName::RecreateCpms,
        PhaseName::MigrateCsiVolumes,
        PhaseName::ScaleOldMachines,
        PhaseName::Cleanup,
        PhaseName::Verify,
    ];

    pub fn first() -> PhaseName {
        Self::ORDER[0]
    }

    pub fn index(self) -> usize {
        Self::ORDER.iter().position(|p| *p == self).expect("PhaseName::ORDER is exhaustive")
    }

    pub fn next(self) -> Option<PhaseName> {
        Self::ORDER.get(self.index() + 1).copied()
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PhaseName::Preflight => "Preflight",
            PhaseName::Backup => "Backup",
            PhaseName::DisableCvo => "DisableCVO",
            PhaseName::UpdateSecrets => "UpdateSecrets",
            PhaseName::CreateTags => "CreateTags",
            PhaseName::CreateFolder => "CreateFolder",
            PhaseName::DeleteCpms => "DeleteCPMS",
            PhaseName::UpdateInfrastructure => "UpdateInfrastructure",
            PhaseName::UpdateConfig => "UpdateConfig",
            PhaseName::RestartPods => "RestartPods",
            PhaseName::MonitorHealth => "MonitorHealth",
            PhaseName::CreateWorkers => "CreateWorkers",
            PhaseName::RecreateCpms => "RecreateCPMS",
            PhaseName::MigrateCsiVolumes => "MigrateCSIVolumes",
            PhaseName::ScaleOldMachines => "ScaleOldMachines",
            PhaseName::Cleanup => "Cleanup",
            PhaseName::Verify => "Verify",
        }
    }
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_exhaustive_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for p in PhaseName::ORDER {
            assert!(seen.insert(p), "duplicate phase in ORDER: {p}");
        }
        assert_eq!(seen.len(), 17);
    }

    #[test]
    fn first_is_preflight_last_is_verify() {
        assert_eq!(PhaseName::first(), PhaseName::Preflight);
        assert!(PhaseName::Verify.is_last());
        assert!(!PhaseName::Preflight.is_last());
    }

    #[test]
    fn next_walks_forward_in_order() {
        assert_eq!(PhaseName::Preflight.next(), Some(PhaseName::Backup));
        assert_eq!(PhaseName::DeleteCpms.next(), Some(PhaseName::UpdateInfrastructure));
        assert_eq!(PhaseName::Verify.next(), None);
    }
}
