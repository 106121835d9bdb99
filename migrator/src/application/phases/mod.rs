// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The seventeen-phase catalogue. Each module implements
//! [`migrator_domain::Phase`] for one pipeline step; [`super::phase_catalogue`]
//! wires them into the dispatch table the reconciler consults.

mod backup;
mod cleanup;
mod create_folder;
mod create_tags;
mod create_workers;
mod csi;
mod delete_cpms;
mod disable_cvo;
mod migrate_csi_volumes;
mod monitor_health;
mod preflight;
mod recreate_cpms;
mod restart_pods;
mod scale_old_machines;
mod update_config;
mod update_infrastructure;
mod update_secrets;
mod verify;

pub use backup::BackupPhase;
pub use cleanup::CleanupPhase;
pub use create_folder::CreateFolderPhase;
pub use create_tags::CreateTagsPhase;
pub use create_workers::CreateWorkersPhase;
pub use delete_cpms::DeleteCpmsPhase;
pub use disable_cvo::{cvo_prior_replicas, DisableCvoPhase};
pub use migrate_csi_volumes::MigrateCsiVolumesPhase;
pub use monitor_health::MonitorHealthPhase;
pub use preflight::PreflightPhase;
pub use recreate_cpms::RecreateCpmsPhase;
pub use restart_pods::RestartPodsPhase;
pub use scale_old_machines::ScaleOldMachinesPhase;
pub use update_config::UpdateConfigPhase;
pub use update_infrastructure::UpdateInfrastructurePhase;
pub use update_secrets::UpdateSecretsPhase;
pub use verify::VerifyPhase;
