// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Value objects exchanged across the [`crate::repositories::VsphereGateway`]
//! port. Kept in the domain so phase implementations never depend on the
//! concrete vCenter wire format (REST JSON bodies, SOAP, etc.) — only on
//! these shapes.

use crate::error::MigrationError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagCategory {
    Region,
    Zone,
}

impl TagCategory {
    pub fn category_name(self) -> &'static str {
        match self {
            TagCategory::Region => "openshift-region",
            TagCategory::Zone => "openshift-zone",
        }
    }
}

/// What Preflight resolves a failure domain's declared topology names into:
/// vCenter managed-object references (morefs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedTopology {
    pub datacenter_moref: String,
    pub compute_cluster_moref: String,
    pub datastore_moref: String,
    pub network_morefs: Vec<String>,
    pub resource_pool_moref: String,
    pub template_moref: String,
    /// Networks declared in the failure domain but not found in vCenter.
    /// Non-empty means Preflight must fail.
    pub missing_networks: Vec<String>,
}

impl ResolvedTopology {
    pub fn is_fully_resolved(&self) -> bool {
        self.missing_networks.is_empty()
    }
}

/// A live (or about-to-be-created) dummy VM used to ferry a First-Class Disk
/// across vCenters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DummyVmHandle {
    pub name: String,
    pub moref: String,
    pub server: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmSummary {
    pub name: String,
    pub moref: String,
    /// FCD identifiers currently attached to this VM's hardware devices.
    pub attached_fcd_ids: Vec<String>,
}

/// Mandatory parameters for a cross-vCenter relocate: empty values
/// must abort the operation before any vSphere call is attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossVCenterTarget {
    pub server: String,
    pub ssl_thumbprint: String,
    pub instance_uuid: String,
    pub datastore_moref: String,
    pub resource_pool_moref: String,
    pub folder_moref: String,
}

impl CrossVCenterTarget {
    pub fn validate(&self) -> Result<(), MigrationError> {
        for (field, value) in [
            ("server", &self.server),
            ("sslThumbprint", &self.ssl_thumbprint),
            ("instanceUuid", &self.instance_uuid),
            ("datastoreMoref", &self.datastore_moref),
            ("resourcePoolMoref", &self.resource_pool_moref),
            ("folderMoref", &self.folder_moref),
        ] {
            if value.trim().is_empty() {
                return Err(MigrationError::safety_gated(format!(
                    "cross-vCenter relocation aborted: {field} is empty"
                )));
            }
        }
        Ok(())
    }
}

/// Parses a CSI volume handle (`file://<fcdID>` or a bare `<fcdID>`) into the
/// FCD identifier.
pub fn parse_fcd_id(volume_handle: &str) -> Result<String, MigrationError> {
    let id = volume_handle.strip_prefix("file://").unwrap_or(volume_handle).trim();
    if id.is_empty() {
        return Err(MigrationError::resource(format!("empty FCD id in volume handle '{volume_handle}'")));
    }
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_scheme_handle() {
        assert_eq!(parse_fcd_id("file://12345678-1234-1234-1234-123456789abc").unwrap(), "12345678-1234-1234-1234-123456789abc");
    }

    #[test]
    fn parses_bare_handle() {
        assert_eq!(parse_fcd_id("bare-fcd-id").unwrap(), "bare-fcd-id");
    }

    #[test]
    fn rejects_empty_handle() {
        assert!(parse_fcd_id("file://").is_err());
    }

    #[test]
    fn cross_vcenter_target_rejects_empty_thumbprint() {
        let t = CrossVCenterTarget {
            server: "vc-b.example".into(),
            ssl_thumbprint: "".into(),
            instance_uuid: "uuid".into(),
            datastore_moref: "ds-1".into(),
            resource_pool_moref: "rp-1".into(),
            folder_moref: "folder-1".into(),
        };
        assert!(t.validate().is_err());
    }
}
