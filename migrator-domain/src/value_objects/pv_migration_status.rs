// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The per-volume CSI migration DAG:
//!
//! ```text
//! Pending → RetainSet → Quiesced → PVCDeleted → Relocating → Relocated → Registered → PVUpdated → Complete
//!                                       ↓ (any step)
//!                                     Failed (terminal, manual remediation)
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum PvMigrationStatus {
    Pending,
    RetainSet,
    Quiesced,
    PvcDeleted,
    Relocating,
    Relocated,
    Registered,
    PvUpdated,
    Complete,
    Failed,
}

impl PvMigrationStatus {
    fn forward_order(self) -> Option<usize> {
        const ORDER: [PvMigrationStatus; 9] = [
            PvMigrationStatus::Pending,
            PvMigrationStatus::RetainSet,
            PvMigrationStatus::Quiesced,
            PvMigrationStatus::PvcDeleted,
            PvMigrationStatus::Relocating,
            PvMigrationStatus::Relocated,
            PvMigrationStatus::Registered,
            PvMigrationStatus::PvUpdated,
            PvMigrationStatus::Complete,
        ];
        ORDER.iter().position(|s| *s == self)
    }

    /// True if `self -> next` is an edge of the DAG above. `Failed` is
    /// reachable from any non-terminal state; `Complete` and `Failed` are
    /// terminal and have no outgoing edges (status is never downgraded per
    /// the normal forward progression, except through rollback which operates outside this
    /// predicate).
    pub fn can_transition_to(self, next: PvMigrationStatus) -> bool {
        if matches!(self, PvMigrationStatus::Complete | PvMigrationStatus::Failed) {
            return false;
        }
        if next == PvMigrationStatus::Failed {
            return true;
        }
        match (self.forward_order(), next.forward_order()) {
            (Some(a), Some(b)) => b == a + 1,
            _ => false,
        }
    }

    /// Failure policy: any failure at or after `Quiesced` leaves
    /// workloads scaled down rather than attempting to restore them.
    pub fn workloads_were_scaled_down(self) -> bool {
        !matches!(self, PvMigrationStatus::Pending | PvMigrationStatus::RetainSet)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PvMigrationStatus::Complete | PvMigrationStatus::Failed)
    }
}

/// Classification used by `Quiesced` to decide restore behavior
/// Complete step): StatefulSets regenerate their own PVC from
/// `volumeClaimTemplates` and are never recreated by this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum WorkloadType {
    StatefulSet,
    Deployment,
    ReplicaSet,
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_a_walk_of_valid_edges() {
        use PvMigrationStatus::*;
        let path = [Pending, RetainSet, Quiesced, PvcDeleted, Relocating, Relocated, Registered, PvUpdated, Complete];
        for window in path.windows(2) {
            assert!(window[0].can_transition_to(window[1]), "{:?} -> {:?}", window[0], window[1]);
        }
    }

    #[test]
    fn any_non_terminal_state_can_fail() {
        use PvMigrationStatus::*;
        for s in [Pending, RetainSet, Quiesced, PvcDeleted, Relocating, Relocated, Registered, PvUpdated] {
            assert!(s.can_transition_to(Failed));
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        use PvMigrationStatus::*;
        assert!(!Complete.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Complete));
    }

    #[test]
    fn cannot_skip_steps() {
        use PvMigrationStatus::*;
        assert!(!Pending.can_transition_to(Quiesced));
        assert!(!RetainSet.can_transition_to(Relocating));
    }

    #[test]
    fn scaled_down_tracking_matches_failure_policy() {
        use PvMigrationStatus::*;
        assert!(!Pending.workloads_were_scaled_down());
        assert!(!RetainSet.workloads_were_scaled_down());
        assert!(Quiesced.workloads_were_scaled_down());
        assert!(Relocating.workloads_were_scaled_down());
        assert!(Failed.workloads_were_scaled_down());
    }
}
