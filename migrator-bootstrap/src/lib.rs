// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Module
//!
//! The bootstrap module sits **outside** the domain/application/
//! infrastructure layers and provides:
//!
//! - **Entry point** — composition root wiring `migrator`'s gateways,
//!   reconciler, and metrics server together
//! - **CLI** — secure, validated argument parsing
//! - **Leader election** — so only one replica reconciles at a time
//! - **Signal handling** — graceful shutdown on SIGTERM/SIGINT/SIGHUP
//! - **Exit codes** — Unix exit code mapping for systemd/CI
//!
//! ## Key Design Principles
//!
//! 1. Bootstrap can depend on every other layer; no other layer depends on
//!    bootstrap.
//! 2. Shutdown is coordinated through one [`shutdown::ShutdownCoordinator`]:
//!    both the signal handler and the leader-election loop cancel the same
//!    token, so the reconciler has a single cancellation path regardless of
//!    why it stopped running.

pub mod cli;
pub mod exit_code;
pub mod leader_election;
pub mod logger;
pub mod shutdown;
pub mod signals;

pub use cli::{parse_and_validate, ParseError, ValidatedCli};
pub use exit_code::{map_error_to_exit_code, result_to_exit_code, ExitCode};

pub fn bootstrap_cli() -> Result<ValidatedCli, cli::ParseError> {
    cli::parse_and_validate()
}
