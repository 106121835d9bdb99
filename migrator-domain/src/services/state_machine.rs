// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # State Machine (Component E)
//!
//! Owns the ordered phase list, the approval gate, and the forward/rollback
//! transition rules. Pure logic over [`MigrationAggregate`] — no I/O, no
//! clock reads beyond what's passed in, so it can be driven deterministically
//! in unit tests.

use crate::aggregates::MigrationAggregate;
use crate::entities::PhaseHistoryEntry;
use crate::value_objects::{ApprovalMode, MigrationState, PhaseName, PhaseStatus};
use chrono::{DateTime, Utc};

/// What the reconciler should do next after consulting the state machine for
/// the currently tracked phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionDecision {
    /// Proceed to call the phase's `execute`.
    Execute,
    /// `approvalMode=Manual`, the phase requires approval, and it hasn't
    /// been granted yet. The reconciler must not call `execute` and should
    /// requeue in 30s.
    WaitingForApproval,
    /// `spec.state=Paused`: no-op until the next watch event.
    Paused,
}

/// `getNextPhase`: the phase after `completed`, or `None`
/// once the canonical order is exhausted.
pub fn get_next_phase(completed: PhaseName) -> Option<PhaseName> {
    completed.next()
}

/// `shouldExecutePhase`: consults `spec.state`,
/// `spec.approvalMode`, and `currentPhaseState.approved`.
pub fn should_execute_phase(aggregate: &MigrationAggregate, spec_state: MigrationState, approval_mode: ApprovalMode) -> ExecutionDecision {
    if matches!(spec_state, MigrationState::Paused) {
        return ExecutionDecision::Paused;
    }
    if let Some(current) = &aggregate.status().current_phase_state {
        if matches!(approval_mode, ApprovalMode::Manual) && current.requires_approval && !current.approved {
            return ExecutionDecision::WaitingForApproval;
        }
    }
    ExecutionDecision::Execute
}

/// Records the "waiting for approval" state on `currentPhaseState` without
/// advancing history.
pub fn record_waiting_for_approval(aggregate: &mut MigrationAggregate, phase: PhaseName, now: DateTime<Utc>) {
    aggregate.begin_phase(phase, now);
    aggregate.record_phase_completion(phase, PhaseStatus::Pending, "waiting for approval", Vec::new(), now);
}

/// `recordPhaseCompletion`: thin wrapper kept here so call sites
/// consult the state machine module rather than reaching into the aggregate
/// directly, only on what the state machine and catalogue report.
pub fn record_phase_completion(aggregate: &mut MigrationAggregate, phase: PhaseName, status: PhaseStatus, message: impl Into<String>, logs: Vec<String>, now: DateTime<Utc>) {
    aggregate.record_phase_completion(phase, status, message, logs, now);
}

/// `initiateRollback`: only ever called when
/// `spec.rollbackOnFailure=true` and a phase has failed terminally — the
/// reconciler decides *when*, this decides *what phases to walk*.
///
/// Returns the phases to invoke `Rollback` on, walking `phaseHistory` in
/// reverse and keeping only entries that actually reached `Completed` — the
/// failed anchor phase itself never completed, and `Skipped` entries never
/// ran, so neither should be unwound.
pub fn rollback_sweep_order(phase_history: &[PhaseHistoryEntry]) -> Vec<PhaseName> {
    phase_history.iter().rev().filter(|entry| entry.status == PhaseStatus::Completed).map(|entry| entry.phase).collect()
}

pub fn initiate_rollback(aggregate: &mut MigrationAggregate, now: DateTime<Utc>) {
    aggregate.begin_rollback(now);
}

/// `shouldRequeue`: true whenever the phase reported `Running` (a
/// cooperative requeue) or `Pending` (waiting for approval) — i.e. whenever
/// it did *not* reach a terminal status this reconcile.
pub fn should_requeue(status: PhaseStatus) -> bool {
    !status.is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::MigrationStatus;

    #[test]
    fn paused_state_always_wins() {
        let agg = MigrationAggregate::new(MigrationStatus::default());
        assert_eq!(should_execute_phase(&agg, MigrationState::Paused, ApprovalMode::Automatic), ExecutionDecision::Paused);
    }

    #[test]
    fn automatic_mode_never_waits_for_approval() {
        let mut agg = MigrationAggregate::new(MigrationStatus::default());
        let t0 = Utc::now();
        agg.begin_phase(PhaseName::CreateWorkers, t0);
        assert_eq!(should_execute_phase(&agg, MigrationState::Running, ApprovalMode::Automatic), ExecutionDecision::Execute);
    }

    #[test]
    fn manual_mode_waits_until_approved() {
        let mut agg = MigrationAggregate::new(MigrationStatus::default());
        let t0 = Utc::now();
        agg.begin_phase(PhaseName::CreateWorkers, t0);
        if let Some(current) = agg.status().current_phase_state.clone() {
            let mut status = agg.status().clone();
            status.current_phase_state = Some(crate::entities::CurrentPhaseState { requires_approval: true, ..current });
            let agg2 = MigrationAggregate::new(status);
            assert_eq!(should_execute_phase(&agg2, MigrationState::Running, ApprovalMode::Manual), ExecutionDecision::WaitingForApproval);
        }
    }

    fn history_entry(phase: PhaseName, status: PhaseStatus) -> PhaseHistoryEntry {
        PhaseHistoryEntry { phase, status, start_time: Utc::now(), completion_time: Some(Utc::now()), message: String::new(), logs: Vec::new() }
    }

    #[test]
    fn rollback_sweep_walks_completed_entries_in_reverse() {
        let history = vec![
            history_entry(PhaseName::Preflight, PhaseStatus::Completed),
            history_entry(PhaseName::Backup, PhaseStatus::Completed),
            history_entry(PhaseName::DisableCvo, PhaseStatus::Completed),
            history_entry(PhaseName::UpdateSecrets, PhaseStatus::Failed),
        ];
        let order = rollback_sweep_order(&history);
        assert_eq!(order, vec![PhaseName::DisableCvo, PhaseName::Backup, PhaseName::Preflight]);
    }

    #[test]
    fn rollback_sweep_skips_skipped_and_failed_entries() {
        let history = vec![
            history_entry(PhaseName::Preflight, PhaseStatus::Completed),
            history_entry(PhaseName::Backup, PhaseStatus::Skipped),
            history_entry(PhaseName::DisableCvo, PhaseStatus::Completed),
            history_entry(PhaseName::UpdateSecrets, PhaseStatus::Failed),
        ];
        let order = rollback_sweep_order(&history);
        assert_eq!(order, vec![PhaseName::DisableCvo, PhaseName::Preflight]);
    }

    #[test]
    fn should_requeue_iff_non_terminal() {
        assert!(should_requeue(PhaseStatus::Running));
        assert!(should_requeue(PhaseStatus::Pending));
        assert!(!should_requeue(PhaseStatus::Completed));
        assert!(!should_requeue(PhaseStatus::Failed));
    }
}
