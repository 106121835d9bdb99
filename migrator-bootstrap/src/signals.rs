// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Signal Handling
//!
//! Listens for `SIGTERM`/`SIGINT`/`SIGHUP` and triggers the
//! [`crate::shutdown::ShutdownCoordinator`] so the reconciler loop and the
//! leader-election renewal task both observe the same cancellation.

use crate::shutdown::ShutdownCoordinator;

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut int = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut hup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");

    tokio::select! {
        _ = term.recv() => "SIGTERM",
        _ = int.recv() => "SIGINT",
        _ = hup.recv() => "SIGHUP",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    tokio::signal::ctrl_c().await.expect("failed to install Ctrl-C handler");
    "CTRL-C"
}

/// Spawns a task that waits for a termination signal and initiates shutdown
/// on the given coordinator. Returns the `JoinHandle` so callers can await it
/// during their own shutdown sequence if desired.
pub fn install(coordinator: ShutdownCoordinator) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let signal_name = wait_for_signal().await;
        tracing::info!(signal = signal_name, "received termination signal");
        coordinator.initiate_shutdown();
    })
}
