// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `VSphereMigration.spec`.

use crate::error::MigrationError;
use crate::value_objects::{ApprovalMode, FailureDomain, MigrationState, TargetCredentialsRef};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerConfig {
    pub replicas: u32,
    pub failure_domain_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ControlPlaneConfig {
    pub failure_domain_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MigrationSpec {
    pub state: MigrationState,
    #[serde(default)]
    pub approval_mode: ApprovalMode,
    pub target_credentials_ref: TargetCredentialsRef,
    pub failure_domains: Vec<FailureDomain>,
    pub worker_config: WorkerConfig,
    pub control_plane_config: ControlPlaneConfig,
    #[serde(default)]
    pub rollback_on_failure: bool,
}

impl MigrationSpec {
    /// Surface-only validation (Non-goals: the declared topology is trusted
    /// and not re-derived). Checks structural well-formedness: non-empty
    /// failure domain list, unique names, sane replica count, and that the
    /// worker/control-plane configs reference a declared failure domain.
    pub fn validate(&self) -> Result<(), MigrationError> {
        if self.failure_domains.is_empty() {
            return Err(MigrationError::validation("spec.failureDomains must not be empty"));
        }

        let mut names = HashSet::new();
        for fd in &self.failure_domains {
            fd.validate()?;
            if !names.insert(fd.name.as_str()) {
                return Err(MigrationError::validation(format!(
                    "duplicate failure domain name: {}",
                    fd.name
                )));
            }
        }

        if self.worker_config.replicas < 1 {
            return Err(MigrationError::validation("spec.workerConfig.replicas must be >= 1"));
        }

        if !names.contains(self.worker_config.failure_domain_name.as_str()) {
            return Err(MigrationError::validation(format!(
                "spec.workerConfig.failureDomainName '{}' is not a declared failure domain",
                self.worker_config.failure_domain_name
            )));
        }

        if !names.contains(self.control_plane_config.failure_domain_name.as_str()) {
            return Err(MigrationError::validation(format!(
                "spec.controlPlaneConfig.failureDomainName '{}' is not a declared failure domain",
                self.control_plane_config.failure_domain_name
            )));
        }

        Ok(())
    }

    /// All distinct target server FQDNs referenced across failure domains —
    /// used by UpdateSecrets, CreateTags, CreateFolder to de-duplicate work
    /// across failure domains sharing the same target vCenter.
    pub fn unique_target_servers(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for fd in &self.failure_domains {
            if seen.insert(fd.server.clone()) {
                out.push(fd.server.clone());
            }
        }
        out
    }

    pub fn failure_domain(&self, name: &str) -> Option<&FailureDomain> {
        self.failure_domains.iter().find(|fd| fd.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::FailureDomainTopology;

    fn fd(name: &str, server: &str) -> FailureDomain {
        FailureDomain {
            name: name.into(),
            region: "r".into(),
            zone: "z".into(),
            server: server.into(),
            topology: FailureDomainTopology {
                datacenter: "DC".into(),
                compute_cluster: "C".into(),
                datastore: "DS".into(),
                networks: vec!["N".into()],
                resource_pool: "Resources".into(),
                folder: None,
                template: "/DC/vm/t".into(),
            },
        }
    }

    fn spec() -> MigrationSpec {
        MigrationSpec {
            state: MigrationState::Pending,
            approval_mode: ApprovalMode::Automatic,
            target_credentials_ref: TargetCredentialsRef {
                secret_name: "target-creds".into(),
                secret_namespace: "kube-system".into(),
            },
            failure_domains: vec![fd("fd-b", "vc-b.example")],
            worker_config: WorkerConfig { replicas: 3, failure_domain_name: "fd-b".into() },
            control_plane_config: ControlPlaneConfig { failure_domain_name: "fd-b".into() },
            rollback_on_failure: true,
        }
    }

    #[test]
    fn valid_spec_passes() {
        assert!(spec().validate().is_ok());
    }

    #[test]
    fn zero_replicas_rejected() {
        let mut s = spec();
        s.worker_config.replicas = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn dangling_failure_domain_reference_rejected() {
        let mut s = spec();
        s.worker_config.failure_domain_name = "does-not-exist".into();
        assert!(s.validate().is_err());
    }

    #[test]
    fn duplicate_failure_domain_names_rejected() {
        let mut s = spec();
        s.failure_domains.push(fd("fd-b", "vc-c.example"));
        assert!(s.validate().is_err());
    }

    #[test]
    fn unique_target_servers_dedupes() {
        let mut s = spec();
        s.failure_domains.push(fd("fd-b2", "vc-b.example"));
        assert_eq!(s.unique_target_servers(), vec!["vc-b.example".to_string()]);
    }
}
