// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Checks that the three substrate-committing phases gate on manual
//! approval while every other catalogue entry does not, and that the state
//! machine's `should_execute_phase` honors that gate the same way the
//! reconciler does.

use migrator::application::phase_catalogue::PhaseCatalogue;
use migrator_domain::aggregates::MigrationAggregate;
use migrator_domain::entities::MigrationStatus;
use migrator_domain::services::{record_waiting_for_approval, should_execute_phase, ExecutionDecision};
use migrator_domain::value_objects::{ApprovalMode, MigrationState, PhaseName};
use migrator_domain::Phase;

#[test]
fn only_the_three_substrate_committing_phases_require_approval() {
    let catalogue = PhaseCatalogue::new();
    let gated: Vec<PhaseName> = PhaseName::ORDER.iter().copied().filter(|&p| catalogue.get(p).requires_approval()).collect();

    assert_eq!(gated, vec![PhaseName::CreateWorkers, PhaseName::RecreateCpms, PhaseName::ScaleOldMachines]);
}

#[test]
fn manual_mode_waits_until_a_gated_phase_is_approved() {
    let now = chrono::Utc::now();
    let mut aggregate = MigrationAggregate::new(MigrationStatus::default());
    aggregate.initialize(now);
    aggregate.begin_phase(PhaseName::CreateWorkers, now);
    aggregate.set_requires_approval(true);

    assert_eq!(should_execute_phase(&aggregate, MigrationState::Running, ApprovalMode::Manual), ExecutionDecision::WaitingForApproval);

    record_waiting_for_approval(&mut aggregate, PhaseName::CreateWorkers, now);
    assert_eq!(
        aggregate.status().current_phase_state.as_ref().map(|c| c.name),
        Some(PhaseName::CreateWorkers),
        "recording the wait must not lose track of which phase is pending"
    );
}

#[test]
fn automatic_mode_never_waits_even_for_a_gated_phase() {
    let now = chrono::Utc::now();
    let mut aggregate = MigrationAggregate::new(MigrationStatus::default());
    aggregate.initialize(now);
    aggregate.begin_phase(PhaseName::RecreateCpms, now);
    aggregate.set_requires_approval(true);

    assert_eq!(should_execute_phase(&aggregate, MigrationState::Running, ApprovalMode::Automatic), ExecutionDecision::Execute);
}

#[test]
fn paused_state_overrides_approval_status() {
    let now = chrono::Utc::now();
    let mut aggregate = MigrationAggregate::new(MigrationStatus::default());
    aggregate.initialize(now);
    aggregate.begin_phase(PhaseName::ScaleOldMachines, now);

    assert_eq!(should_execute_phase(&aggregate, MigrationState::Paused, ApprovalMode::Manual), ExecutionDecision::Paused);
}
