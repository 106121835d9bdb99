// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Layered runtime configuration: defaults, an optional config file, then
//! `VSM_`-prefixed environment variables, in that order of precedence — the
//! order `config::Config` applies each layer in.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct OperatorConfig {
    /// Namespace the `VSphereMigration` CRD and its target credentials
    /// secret live in.
    pub namespace: String,
    /// Name of the `Lease` used for leader election across replicas.
    pub leader_election_lease_name: String,
    /// `RUST_LOG`-style directive, e.g. `info` or `migrator=debug,kube=warn`.
    pub log_level: String,
    /// `pretty` or `json`.
    pub log_format: String,
    /// Port the Prometheus `/metrics` and `/healthz` endpoint listens on.
    pub metrics_port: u16,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            namespace: "openshift-vsphere-migrator".to_string(),
            leader_election_lease_name: "vsphere-migrator-leader".to_string(),
            log_level: "info".to_string(),
            log_format: "json".to_string(),
            metrics_port: 8080,
        }
    }
}

impl OperatorConfig {
    /// Loads defaults, then `config/operator.toml` if present, then
    /// `VSM_*` environment variables (`VSM_METRICS_PORT=9000`, etc.).
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let built = Config::builder()
            .set_default("namespace", defaults.namespace)?
            .set_default("leader_election_lease_name", defaults.leader_election_lease_name)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", defaults.log_format)?
            .set_default("metrics_port", defaults.metrics_port as i64)?
            .add_source(File::with_name("config/operator").required(false))
            .add_source(Environment::with_prefix("VSM").try_parsing(true))
            .build()?;
        built.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_self_consistent() {
        let config = OperatorConfig::default();
        assert_eq!(config.metrics_port, 8080);
        assert_eq!(config.log_format, "json");
    }
}
