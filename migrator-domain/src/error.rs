// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain-specific errors for the migration pipeline.
//!
//! Validation errors fail a
//! phase before any side effect; transient errors ask the reconciler to
//! requeue without corrupting state; resource/infrastructure errors fail the
//! phase (and, for CSI, a single volume); safety-gated errors fail without
//! restoring workloads; rollback errors are logged and swallowed by the
//! rollback sweep.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum MigrationError {
    /// A phase's `Validate` step rejected the declared spec before any
    /// mutation was attempted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A timeout, conflict, or not-found-during-racing-creation condition.
    /// Callers should return `PhaseStatus::Running` with a short requeue.
    #[error("transient error: {0}")]
    Transient(String),

    /// A cluster object is missing, malformed, or rejected by schema.
    #[error("resource error: {0}")]
    Resource(String),

    /// A vSphere-side operation failed (vMotion, tag API, FCD operation).
    #[error("infrastructure error: {0}")]
    Infrastructure(String),

    /// A defense-in-depth check in CSI migration refused to proceed.
    /// Carries no recovery path other than operator intervention.
    #[error("safety-gated error: {0}")]
    SafetyGated(String),

    /// Raised while unwinding during rollback. The rollback sweep logs these
    /// and continues; this variant exists so phase `Rollback` implementations
    /// still return `Result` like every other phase method.
    #[error("rollback error: {0}")]
    Rollback(String),

    /// The optimistic-concurrency status write lost a race. The reconciler
    /// drops the update for this reconcile and relies on the next enqueue.
    #[error("status update conflict: {0}")]
    StatusConflict(String),
}

impl MigrationError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    pub fn infrastructure(msg: impl Into<String>) -> Self {
        Self::Infrastructure(msg.into())
    }

    pub fn safety_gated(msg: impl Into<String>) -> Self {
        Self::SafetyGated(msg.into())
    }

    pub fn rollback(msg: impl Into<String>) -> Self {
        Self::Rollback(msg.into())
    }

    /// Whether the reconciler should requeue instead of failing the phase.
    pub fn is_transient(&self) -> bool {
        matches!(self, MigrationError::Transient(_) | MigrationError::StatusConflict(_))
    }

    /// Whether this error must never trigger workload restoration
    /// failure policy).
    pub fn is_safety_gated(&self) -> bool {
        matches!(self, MigrationError::SafetyGated(_))
    }

    pub fn category(&self) -> &'static str {
        match self {
            MigrationError::Validation(_) => "validation",
            MigrationError::Transient(_) => "transient",
            MigrationError::Resource(_) => "resource",
            MigrationError::Infrastructure(_) => "infrastructure",
            MigrationError::SafetyGated(_) => "safety_gated",
            MigrationError::Rollback(_) => "rollback",
            MigrationError::StatusConflict(_) => "status_conflict",
        }
    }
}

impl From<serde_json::Error> for MigrationError {
    fn from(err: serde_json::Error) -> Self {
        MigrationError::Resource(format!("serialization error: {err}"))
    }
}
