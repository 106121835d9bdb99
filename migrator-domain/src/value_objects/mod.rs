// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

pub mod cluster;
pub mod failure_domain;
pub mod migration_state;
pub mod phase_name;
pub mod phase_status;
pub mod pv_migration_status;
pub mod vsphere;

pub use cluster::{
    ClusterOperatorConditionType, ClusterOperatorHealth, CpmsSnapshot, CpmsState, InfrastructurePlatformSpec,
    MachineSetSummary, PvSummary, WorkloadKind, WorkloadRef,
};
pub use failure_domain::{FailureDomain, FailureDomainTopology, TargetCredentialsRef};
pub use migration_state::{ApprovalMode, MigrationState};
pub use phase_name::PhaseName;
pub use phase_status::{MigrationPhaseField, PhaseStatus};
pub use pv_migration_status::{PvMigrationStatus, WorkloadType};
pub use vsphere::{parse_fcd_id, CrossVCenterTarget, DummyVmHandle, ResolvedTopology, TagCategory, VmSummary};
