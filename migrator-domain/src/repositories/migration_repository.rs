// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Migration Repository Port
//!
//! Fetches and persists the `VSphereMigration` object's `status` subresource.
//! Kept separate from [`crate::repositories::ClusterGateway`] so the
//! reconciler's state handling can be exercised against a fake without
//! dragging in every other cluster-object port.

use crate::aggregates::MigrationAggregate;
use crate::entities::MigrationStatus;
use crate::error::MigrationError;
use async_trait::async_trait;

#[async_trait]
pub trait MigrationRepository: Send + Sync {
    async fn get_status(&self, name: &str) -> Result<Option<MigrationStatus>, MigrationError>;

    /// Replaces the `status` subresource. Implementations must use a
    /// status-subresource update (never a full-object PUT) so this never
    /// races the spec the operator is reconciling against.
    async fn update_status(&self, name: &str, status: &MigrationStatus) -> Result<(), MigrationError>;

    /// Convenience wrapper that persists an aggregate's current status and
    /// drains its uncommitted event buffer into the returned vector, so the
    /// caller can log them after the write succeeds.
    async fn commit(&self, name: &str, aggregate: &mut MigrationAggregate) -> Result<Vec<crate::events::MigrationEvent>, MigrationError> {
        self.update_status(name, aggregate.status()).await?;
        let events = aggregate.uncommitted_events().to_vec();
        aggregate.mark_events_committed();
        Ok(events)
    }
}
