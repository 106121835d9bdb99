// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

pub mod migration_spec;
pub mod migration_status;
pub mod phase_state;
pub mod pv_migration_state;
pub mod resource_backup;

pub use migration_spec::{ControlPlaneConfig, MigrationSpec, WorkerConfig};
pub use migration_status::{CsiMigrationState, MigrationStatus};
pub use phase_state::{CurrentPhaseState, PhaseHistoryEntry};
pub use pv_migration_state::{PvMigrationState, ScaledWorkload};
pub use resource_backup::{BackupKey, MachineSetReplicaBackup, ResourceBackup};
