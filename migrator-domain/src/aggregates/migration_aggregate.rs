// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The migration aggregate: the single place that mutates
//! `VSphereMigration.status` and keeps its invariants intact while doing
//! so.
//!
//! ## Concurrency
//!
//! Single-writer within a reconcile: the reconciler loads one aggregate
//! per invocation, mutates it in memory, and persists `status` back via the
//! status subresource under optimistic concurrency. The aggregate itself
//! does no I/O.

use crate::entities::{CurrentPhaseState, MigrationStatus, PhaseHistoryEntry, ResourceBackup};
use crate::error::MigrationError;
use crate::events::{MigrationEvent, PhaseCompletedEvent, PhaseFailedEvent, PhaseStartedEvent, RollbackCompletedEvent, RollbackInitiatedEvent};
use crate::value_objects::phase_status::MigrationPhaseField;
use crate::value_objects::{PhaseName, PhaseStatus};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct MigrationAggregate {
    status: MigrationStatus,
    uncommitted_events: Vec<MigrationEvent>,
}

impl MigrationAggregate {
    pub fn new(status: MigrationStatus) -> Self {
        Self { status, uncommitted_events: Vec::new() }
    }

    pub fn status(&self) -> &MigrationStatus {
        &self.status
    }

    /// Consumes the aggregate, returning the mutated status for persistence.
    pub fn into_status(self) -> MigrationStatus {
        self.status
    }

    pub fn uncommitted_events(&self) -> &[MigrationEvent] {
        &self.uncommitted_events
    }

    pub fn mark_events_committed(&mut self) {
        self.uncommitted_events.clear();
    }

    fn add_event(&mut self, event: MigrationEvent) {
        self.uncommitted_events.push(event);
    }

    /// Initializes `status.phase`/`status.startTime` on first reconcile.
    pub fn initialize(&mut self, now: DateTime<Utc>) {
        if matches!(self.status.phase, MigrationPhaseField::NotStarted) {
            self.status.phase = MigrationPhaseField::InPhase(PhaseName::first());
            self.status.start_time = Some(now);
        }
    }

    /// Begins (or resumes) tracking a phase invocation. If `current_phase_state`
    /// already names this phase, it is preserved (resume); otherwise a fresh
    /// `CurrentPhaseState` and a new open history entry are created.
    pub fn begin_phase(&mut self, phase: PhaseName, now: DateTime<Utc>) {
        let already_tracking = self
            .status
            .current_phase_state
            .as_ref()
            .map(|s| s.name == phase)
            .unwrap_or(false);

        if !already_tracking {
            self.status.current_phase_state = Some(CurrentPhaseState::new(phase, now));
            self.status.phase_history.push(PhaseHistoryEntry {
                phase,
                status: PhaseStatus::Running,
                start_time: now,
                completion_time: None,
                message: String::new(),
                logs: Vec::new(),
            });
            self.add_event(MigrationEvent::PhaseStarted(PhaseStartedEvent { phase, occurred_at: now }));
        }
    }

    /// `recordPhaseCompletion`: merges the open history entry in place,
    /// appending one only if none is open, then clears `currentPhaseState`.
    pub fn record_phase_completion(
        &mut self,
        phase: PhaseName,
        status: PhaseStatus,
        message: impl Into<String>,
        logs: Vec<String>,
        now: DateTime<Utc>,
    ) {
        let message = message.into();
        let completion_time = status.is_terminal().then_some(now);

        if let Some(entry) = self.status.open_history_entry_mut() {
            if entry.phase == phase {
                entry.status = status;
                entry.message = message.clone();
                entry.logs = logs.clone();
                entry.completion_time = completion_time;
            } else {
                self.status.phase_history.push(PhaseHistoryEntry {
                    phase,
                    status,
                    start_time: now,
                    completion_time,
                    message: message.clone(),
                    logs: logs.clone(),
                });
            }
        } else {
            self.status.phase_history.push(PhaseHistoryEntry {
                phase,
                status,
                start_time: now,
                completion_time,
                message: message.clone(),
                logs: logs.clone(),
            });
        }

        if status.is_terminal() {
            self.status.current_phase_state = None;
            match status {
                PhaseStatus::Completed | PhaseStatus::Skipped => {
                    self.add_event(MigrationEvent::PhaseCompleted(PhaseCompletedEvent {
                        phase,
                        message,
                        occurred_at: now,
                    }));
                }
                PhaseStatus::Failed => {
                    self.add_event(MigrationEvent::PhaseFailed(PhaseFailedEvent {
                        phase,
                        error_message: message,
                        occurred_at: now,
                    }));
                }
                PhaseStatus::Pending | PhaseStatus::Running => unreachable!("is_terminal() guards this arm"),
            }
        } else if let Some(current) = self.status.current_phase_state.as_mut() {
            current.status = status;
            current.message = message;
        }
    }

    /// Advances `status.phase` to the next phase in the canonical order, or
    /// to `Completed` if the pipeline has finished.
    pub fn advance_to_next_phase(&mut self, completed: PhaseName) {
        self.status.phase = match completed.next() {
            Some(next) => MigrationPhaseField::InPhase(next),
            None => MigrationPhaseField::Completed,
        };
    }

    pub fn mark_failed(&mut self) {
        self.status.phase = MigrationPhaseField::Failed;
    }

    /// Sets `currentPhaseState.requiresApproval` on a just-begun phase. The
    /// catalogue (not the aggregate) knows which phases gate on approval, so
    /// the reconciler calls this right after `begin_phase` rather than the
    /// aggregate consulting the catalogue itself.
    pub fn set_requires_approval(&mut self, value: bool) {
        if let Some(current) = self.status.current_phase_state.as_mut() {
            current.requires_approval = value;
        }
    }

    /// Begins a rollback entry: `status.phase` becomes `RollingBack`.
    pub fn begin_rollback(&mut self, now: DateTime<Utc>) {
        let from_phase = match &self.status.phase {
            MigrationPhaseField::InPhase(p) => Some(*p),
            _ => None,
        };
        self.status.phase = MigrationPhaseField::RollingBack;
        self.status.current_phase_state = None;
        self.add_event(MigrationEvent::RollbackInitiated(RollbackInitiatedEvent { from_phase, occurred_at: now }));
    }

    pub fn complete_rollback(&mut self, phases_rolled_back: Vec<PhaseName>, now: DateTime<Utc>) {
        self.status.phase = MigrationPhaseField::RollbackCompleted;
        self.status.completion_time = Some(now);
        self.add_event(MigrationEvent::RollbackCompleted(RollbackCompletedEvent { phases_rolled_back, occurred_at: now }));
    }

    pub fn complete_migration(&mut self, now: DateTime<Utc>) {
        self.status.phase = MigrationPhaseField::Completed;
        self.status.completion_time = Some(now);
    }

    pub fn backup_resource(&mut self, backup: ResourceBackup) {
        self.status.backup_resource(backup);
    }

    pub fn validate(&self) -> Result<(), MigrationError> {
        if !self.status.invariants_hold() {
            return Err(MigrationError::resource("migration status invariants violated"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_sets_first_phase_once() {
        let mut agg = MigrationAggregate::new(MigrationStatus::default());
        let t0 = Utc::now();
        agg.initialize(t0);
        assert_eq!(agg.status().phase, MigrationPhaseField::InPhase(PhaseName::Preflight));
        agg.initialize(t0 + chrono::Duration::seconds(5));
        assert_eq!(agg.status().start_time, Some(t0));
    }

    #[test]
    fn begin_phase_is_idempotent_on_resume() {
        let mut agg = MigrationAggregate::new(MigrationStatus::default());
        let t0 = Utc::now();
        agg.begin_phase(PhaseName::Preflight, t0);
        agg.begin_phase(PhaseName::Preflight, t0 + chrono::Duration::seconds(1));
        assert_eq!(agg.status().phase_history.len(), 1);
    }

    #[test]
    fn record_completion_merges_open_entry_and_clears_current() {
        let mut agg = MigrationAggregate::new(MigrationStatus::default());
        let t0 = Utc::now();
        agg.begin_phase(PhaseName::Preflight, t0);
        agg.record_phase_completion(PhaseName::Preflight, PhaseStatus::Completed, "ok", vec![], t0);
        assert!(agg.status().current_phase_state.is_none());
        assert_eq!(agg.status().phase_history.len(), 1);
        assert_eq!(agg.status().phase_history[0].status, PhaseStatus::Completed);
        assert!(agg.validate().is_ok());
    }

    #[test]
    fn advance_to_next_phase_reaches_completed_after_verify() {
        let mut agg = MigrationAggregate::new(MigrationStatus::default());
        agg.advance_to_next_phase(PhaseName::Verify);
        assert_eq!(agg.status().phase, MigrationPhaseField::Completed);
    }

    #[test]
    fn rollback_lifecycle() {
        let mut agg = MigrationAggregate::new(MigrationStatus::default());
        let t0 = Utc::now();
        agg.status.phase = MigrationPhaseField::InPhase(PhaseName::CreateWorkers);
        agg.begin_rollback(t0);
        assert_eq!(agg.status().phase, MigrationPhaseField::RollingBack);
        agg.complete_rollback(vec![PhaseName::UpdateInfrastructure], t0);
        assert_eq!(agg.status().phase, MigrationPhaseField::RollbackCompleted);
        assert!(agg.status().completion_time.is_some());
    }
}
