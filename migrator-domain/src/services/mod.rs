// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

pub mod phase;
pub mod state_machine;

pub use phase::{Phase, PhaseContext, PhaseOutcome};
pub use state_machine::{
    get_next_phase, initiate_rollback, record_phase_completion, record_waiting_for_approval, rollback_sweep_order, should_execute_phase, should_requeue, ExecutionDecision,
};
