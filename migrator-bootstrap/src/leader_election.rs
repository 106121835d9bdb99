// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Leader Election
//!
//! Wraps [`kube_leader_election::LeaseLock`] so that when the operator runs
//! with more than one replica, only the leader runs the reconciler loop.
//! Loss of leadership cancels the same [`crate::shutdown::ShutdownCoordinator`]
//! token the signal handler uses, so the reconcile loop has one shutdown
//! path regardless of why it stopped being allowed to run.

use crate::shutdown::ShutdownCoordinator;
use kube::Client;
use kube_leader_election::{LeaseLock, LeaseLockParams};
use std::time::Duration;

pub struct LeaderElectionConfig {
    pub lease_name: String,
    pub lease_namespace: String,
    pub holder_identity: String,
    pub lease_duration: Duration,
    pub renew_deadline: Duration,
}

impl LeaderElectionConfig {
    pub fn new(lease_name: String, lease_namespace: String, holder_identity: String) -> Self {
        Self {
            lease_name,
            lease_namespace,
            holder_identity,
            lease_duration: Duration::from_secs(15),
            renew_deadline: Duration::from_secs(10),
        }
    }
}

/// Runs the leader-election renewal loop until cancelled. While holding the
/// lease it polls at `renew_deadline` intervals; if a renewal fails (lease
/// stolen, API unreachable past the lease duration) it initiates shutdown so
/// the reconciler stops acting on an object it may no longer be the sole
/// writer for.
pub async fn run(client: Client, cfg: LeaderElectionConfig, shutdown: ShutdownCoordinator) {
    let lock = LeaseLock::new(
        client,
        &cfg.lease_namespace,
        LeaseLockParams {
            holder_id: cfg.holder_identity.clone(),
            lease_name: cfg.lease_name.clone(),
            lease_ttl: cfg.lease_duration,
        },
    );

    let token = shutdown.token();
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::info!("leader election loop stopping on shutdown signal");
                return;
            }
            result = lock.try_acquire_or_renew() => {
                match result {
                    Ok(lease) if lease.acquired_lease => {
                        tracing::debug!(holder = %cfg.holder_identity, "holding leader lease");
                    }
                    Ok(_) => {
                        tracing::debug!("not the leader; waiting");
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "leader election renewal failed; initiating shutdown");
                        shutdown.initiate_shutdown();
                        return;
                    }
                }
            }
        }
        tokio::time::sleep(cfg.renew_deadline).await;
    }
}
