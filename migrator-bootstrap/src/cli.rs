// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface
//!
//! Bootstrap-layer CLI handling for the operator binary. Kept deliberately
//! small: almost everything the operator needs is declared on the
//! `VSphereMigration` spec, not passed on the command line (external
//! interface).

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid value for --{arg}: {reason}")]
    InvalidValue { arg: String, reason: String },
}

#[derive(Debug, Parser)]
#[command(name = "vsphere-migrator", version, about = "OpenShift vSphere substrate migration operator")]
pub struct Cli {
    /// Path to a kubeconfig file. Falls back to in-cluster config, then
    /// `$KUBECONFIG`, then `~/.kube/config`.
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Layered configuration file (YAML). CLI flags override it; it
    /// overrides environment variables; environment variables override the
    /// built-in defaults.
    #[arg(long, env = "MIGRATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable leader election so only one replica reconciles at a time.
    #[arg(long, env = "MIGRATOR_LEADER_ELECT", default_value_t = true)]
    pub leader_elect: bool,

    /// Namespace holding the leader-election Lease object.
    #[arg(long, env = "MIGRATOR_LEASE_NAMESPACE", default_value = "openshift-vsphere-migrator")]
    pub lease_namespace: String,

    /// Name of the Lease object used for leader election.
    #[arg(long, env = "MIGRATOR_LEASE_NAME", default_value = "vsphere-migrator-leader")]
    pub lease_name: String,

    /// `info`, `json`, or `pretty` — see infrastructure::logging.
    #[arg(long, env = "MIGRATOR_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Bind address for the `/metrics` and `/healthz` HTTP endpoint.
    #[arg(long, env = "MIGRATOR_METRICS_ADDR", default_value = "0.0.0.0:8080")]
    pub metrics_addr: String,

    /// Minimum delay between reconciles of the same object absent an error
    /// or an explicit requeue request.
    #[arg(long, env = "MIGRATOR_RECONCILE_INTERVAL_SECS", default_value_t = 300)]
    pub reconcile_interval_secs: u64,

    /// Grace period for in-flight reconciles to finish after a shutdown
    /// signal or loss of leadership.
    #[arg(long, env = "MIGRATOR_SHUTDOWN_GRACE_SECS", default_value_t = 30)]
    pub shutdown_grace_secs: u64,
}

/// CLI arguments after range validation.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub kubeconfig: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub leader_elect: bool,
    pub lease_namespace: String,
    pub lease_name: String,
    pub log_format: String,
    pub metrics_addr: String,
    pub reconcile_interval: Duration,
    pub shutdown_grace: Duration,
}

pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    validate(Cli::parse())
}

fn validate(cli: Cli) -> Result<ValidatedCli, ParseError> {
    if !matches!(cli.log_format.as_str(), "info" | "json" | "pretty") {
        return Err(ParseError::InvalidValue {
            arg: "log-format".to_string(),
            reason: "must be one of: info, json, pretty".to_string(),
        });
    }

    if cli.reconcile_interval_secs == 0 {
        return Err(ParseError::InvalidValue {
            arg: "reconcile-interval-secs".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }

    if cli.lease_name.trim().is_empty() || cli.lease_namespace.trim().is_empty() {
        return Err(ParseError::InvalidValue {
            arg: "lease-name/lease-namespace".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    Ok(ValidatedCli {
        kubeconfig: cli.kubeconfig,
        config: cli.config,
        leader_elect: cli.leader_elect,
        lease_namespace: cli.lease_namespace,
        lease_name: cli.lease_name,
        log_format: cli.log_format,
        metrics_addr: cli.metrics_addr,
        reconcile_interval: Duration::from_secs(cli.reconcile_interval_secs),
        shutdown_grace: Duration::from_secs(cli.shutdown_grace_secs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            kubeconfig: None,
            config: None,
            leader_elect: true,
            lease_namespace: "openshift-vsphere-migrator".into(),
            lease_name: "vsphere-migrator-leader".into(),
            log_format: "pretty".into(),
            metrics_addr: "0.0.0.0:8080".into(),
            reconcile_interval_secs: 300,
            shutdown_grace_secs: 30,
        }
    }

    #[test]
    fn rejects_unknown_log_format() {
        let mut cli = base_cli();
        cli.log_format = "xml".into();
        assert!(validate(cli).is_err());
    }

    #[test]
    fn rejects_zero_reconcile_interval() {
        let mut cli = base_cli();
        cli.reconcile_interval_secs = 0;
        assert!(validate(cli).is_err());
    }

    #[test]
    fn accepts_defaults() {
        assert!(validate(base_cli()).is_ok());
    }
}
