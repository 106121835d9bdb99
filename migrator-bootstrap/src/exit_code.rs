// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Codes
//!
//! Unix `sysexits.h`-style exit codes for the operator binary, so systemd
//! units and CI smoke tests can distinguish "bad CLI input" from "lost
//! leadership" from "cluster unreachable" without parsing log text.

use migrator_domain::MigrationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Clean shutdown (SIGTERM/SIGINT handled, or leadership lost gracefully).
    Ok = 0,
    /// Generic, unclassified failure.
    Failure = 1,
    /// Invalid CLI arguments or configuration (`EX_DATAERR`).
    ConfigError = 65,
    /// Could not reach the Kubernetes API or vCenter at startup (`EX_UNAVAILABLE`).
    Unavailable = 69,
    /// Internal invariant violated — a bug, not an environment problem (`EX_SOFTWARE`).
    Software = 70,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

pub fn map_error_to_exit_code(error: &MigrationError) -> ExitCode {
    match error {
        MigrationError::Validation(_) => ExitCode::ConfigError,
        MigrationError::Transient(_) | MigrationError::StatusConflict(_) => ExitCode::Unavailable,
        MigrationError::Resource(_) | MigrationError::Infrastructure(_) | MigrationError::SafetyGated(_) | MigrationError::Rollback(_) => ExitCode::Software,
    }
}

pub fn result_to_exit_code<T>(result: Result<T, anyhow::Error>) -> std::process::ExitCode {
    match result {
        Ok(_) => ExitCode::Ok.into(),
        Err(err) => {
            tracing::error!(error = %err, "operator exiting with failure");
            ExitCode::Failure.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_config_error() {
        assert_eq!(map_error_to_exit_code(&MigrationError::validation("bad spec")), ExitCode::ConfigError);
    }

    #[test]
    fn transient_errors_map_to_unavailable() {
        assert_eq!(map_error_to_exit_code(&MigrationError::transient("timeout")), ExitCode::Unavailable);
    }
}
