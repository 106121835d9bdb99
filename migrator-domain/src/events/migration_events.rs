// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain events raised by [`crate::aggregates::MigrationAggregate`] for
//! every significant state change. These are not event-sourced (the cluster
//! object, not an event store, is the source of truth) — they exist
//! so the reconciler can emit consistent structured log lines and metrics
//! for each transition without duplicating the "what changed" logic at the
//! call site.

use crate::value_objects::PhaseName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseStartedEvent {
    pub phase: PhaseName,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseCompletedEvent {
    pub phase: PhaseName,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseFailedEvent {
    pub phase: PhaseName,
    pub error_message: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackInitiatedEvent {
    pub from_phase: Option<PhaseName>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackCompletedEvent {
    pub phases_rolled_back: Vec<PhaseName>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MigrationEvent {
    PhaseStarted(PhaseStartedEvent),
    PhaseCompleted(PhaseCompletedEvent),
    PhaseFailed(PhaseFailedEvent),
    RollbackInitiated(RollbackInitiatedEvent),
    RollbackCompleted(RollbackCompletedEvent),
}
