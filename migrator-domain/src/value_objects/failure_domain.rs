// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Failure domain topology and target credential lookup.

use crate::error::MigrationError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A named topology slot: region/zone tags plus the vCenter-side coordinates
/// (datacenter, cluster, datastore, networks, resource pool, folder,
/// template) that a worker or control-plane machine is placed into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FailureDomain {
    pub name: String,
    pub region: String,
    pub zone: String,
    pub server: String,
    pub topology: FailureDomainTopology,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FailureDomainTopology {
    pub datacenter: String,
    pub compute_cluster: String,
    pub datastore: String,
    pub networks: Vec<String>,
    pub resource_pool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    pub template: String,
}

impl FailureDomain {
    /// Surface validation only — per the Non-goals, the declared topology is
    /// trusted and not re-derived against vSphere. This checks structural
    /// well-formedness, not that the named objects exist.
    pub fn validate(&self) -> Result<(), MigrationError> {
        if self.name.trim().is_empty() {
            return Err(MigrationError::validation("failure domain name must not be empty"));
        }
        if self.server.trim().is_empty() {
            return Err(MigrationError::validation(format!(
                "failure domain '{}' has no target server FQDN",
                self.name
            )));
        }
        if self.topology.networks.is_empty() {
            return Err(MigrationError::validation(format!(
                "failure domain '{}' declares no networks",
                self.name
            )));
        }
        for field in [
            ("datacenter", &self.topology.datacenter),
            ("computeCluster", &self.topology.compute_cluster),
            ("datastore", &self.topology.datastore),
            ("resourcePool", &self.topology.resource_pool),
            ("template", &self.topology.template),
        ] {
            if field.1.trim().is_empty() {
                return Err(MigrationError::validation(format!(
                    "failure domain '{}' is missing {}",
                    self.name, field.0
                )));
            }
        }
        Ok(())
    }

    /// Folder path the CreateFolder phase provisions when `folder` is unset:
    /// `/<datacenter>/vm/<infrastructureID>`.
    pub fn default_folder_path(&self, infrastructure_id: &str) -> String {
        format!("/{}/vm/{}", self.topology.datacenter, infrastructure_id)
    }
}

/// `spec.targetCredentialsRef`: maps a target vCenter FQDN to the
/// `{FQDN}.username` / `{FQDN}.password` key names inside a named secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TargetCredentialsRef {
    pub secret_name: String,
    pub secret_namespace: String,
}

impl TargetCredentialsRef {
    pub fn username_key(server: &str) -> String {
        format!("{server}.username")
    }

    pub fn password_key(server: &str) -> String {
        format!("{server}.password")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FailureDomain {
        FailureDomain {
            name: "fd-b".into(),
            region: "region-b".into(),
            zone: "zone-b".into(),
            server: "vc-b.example".into(),
            topology: FailureDomainTopology {
                datacenter: "DC-B".into(),
                compute_cluster: "C-B".into(),
                datastore: "DS-B".into(),
                networks: vec!["N-B".into()],
                resource_pool: "Resources".into(),
                folder: None,
                template: "/DC-B/vm/rhcos-template".into(),
            },
        }
    }

    #[test]
    fn valid_domain_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn empty_networks_rejected() {
        let mut fd = sample();
        fd.topology.networks.clear();
        assert!(fd.validate().is_err());
    }

    #[test]
    fn default_folder_path_uses_datacenter_and_infra_id() {
        assert_eq!(sample().default_folder_path("abcde-12345"), "/DC-B/vm/abcde-12345");
    }

    #[test]
    fn credential_keys_are_fqdn_prefixed() {
        assert_eq!(TargetCredentialsRef::username_key("vc-b.example"), "vc-b.example.username");
        assert_eq!(TargetCredentialsRef::password_key("vc-b.example"), "vc-b.example.password");
    }
}
