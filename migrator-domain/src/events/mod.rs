// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

pub mod migration_events;

pub use migration_events::{
    MigrationEvent, PhaseCompletedEvent, PhaseFailedEvent, PhaseStartedEvent, RollbackCompletedEvent,
    RollbackInitiatedEvent,
};
