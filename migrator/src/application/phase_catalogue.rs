// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The dispatch table the reconciler and rollback sweep both consult: a
//! single `PhaseName -> Arc<dyn Phase>` lookup, so neither of them ever
//! matches on the phase name to decide what code to run.

use super::phases::{
    BackupPhase, CleanupPhase, CreateFolderPhase, CreateTagsPhase, CreateWorkersPhase, DeleteCpmsPhase, DisableCvoPhase, MigrateCsiVolumesPhase, MonitorHealthPhase, PreflightPhase,
    RecreateCpmsPhase, RestartPodsPhase, ScaleOldMachinesPhase, UpdateConfigPhase, UpdateInfrastructurePhase, UpdateSecretsPhase, VerifyPhase,
};
use migrator_domain::value_objects::PhaseName;
use migrator_domain::Phase;
use std::collections::HashMap;
use std::sync::Arc;

pub struct PhaseCatalogue {
    phases: HashMap<PhaseName, Arc<dyn Phase>>,
}

impl PhaseCatalogue {
    pub fn new() -> Self {
        let entries: Vec<(PhaseName, Arc<dyn Phase>)> = vec![
            (PhaseName::Preflight, Arc::new(PreflightPhase)),
            (PhaseName::Backup, Arc::new(BackupPhase)),
            (PhaseName::DisableCvo, Arc::new(DisableCvoPhase)),
            (PhaseName::UpdateSecrets, Arc::new(UpdateSecretsPhase)),
            (PhaseName::CreateTags, Arc::new(CreateTagsPhase)),
            (PhaseName::CreateFolder, Arc::new(CreateFolderPhase)),
            (PhaseName::DeleteCpms, Arc::new(DeleteCpmsPhase)),
            (PhaseName::UpdateInfrastructure, Arc::new(UpdateInfrastructurePhase)),
            (PhaseName::UpdateConfig, Arc::new(UpdateConfigPhase)),
            (PhaseName::RestartPods, Arc::new(RestartPodsPhase)),
            (PhaseName::MonitorHealth, Arc::new(MonitorHealthPhase)),
            (PhaseName::CreateWorkers, Arc::new(CreateWorkersPhase)),
            (PhaseName::RecreateCpms, Arc::new(RecreateCpmsPhase)),
            (PhaseName::MigrateCsiVolumes, Arc::new(MigrateCsiVolumesPhase)),
            (PhaseName::ScaleOldMachines, Arc::new(ScaleOldMachinesPhase)),
            (PhaseName::Cleanup, Arc::new(CleanupPhase)),
            (PhaseName::Verify, Arc::new(VerifyPhase)),
        ];
        Self { phases: entries.into_iter().collect() }
    }

    pub fn get(&self, name: PhaseName) -> Arc<dyn Phase> {
        self.phases.get(&name).cloned().unwrap_or_else(|| panic!("phase catalogue missing entry for {name}, PhaseName::ORDER is out of sync"))
    }
}

impl Default for PhaseCatalogue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_canonical_phase_is_present() {
        let catalogue = PhaseCatalogue::new();
        for name in PhaseName::ORDER {
            assert_eq!(catalogue.get(name).name(), name);
        }
    }
}
