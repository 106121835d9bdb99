// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # vSphere Migrator
//!
//! A Kubernetes controller that migrates an OpenShift cluster's vSphere
//! substrate — infrastructure config, control plane machines, worker
//! machines, and CSI-backed volumes — from a source vCenter to a target
//! vCenter, one resumable phase at a time.
//!
//! ## Architecture
//!
//! The crate is split the way `migrator-domain` expects its consumers to be
//! split:
//!
//! - [`application`] — the phase catalogue: one [`migrator_domain::services::Phase`]
//!   implementation per step of the migration, built only on the domain
//!   crate's ports and value objects. No `kube`, no `reqwest`.
//! - [`infrastructure`] — the adapters that satisfy those ports against a
//!   real cluster and real vCenters (`kube`-based `ClusterGateway`, a REST
//!   `VsphereGateway`, the status-subresource `MigrationRepository`), plus
//!   the controller loop, configuration, logging, and metrics.
//!
//! `migrator-bootstrap` is the binary crate that composes the two into a
//! running process.

pub mod application;
pub mod infrastructure;

pub use migrator_domain::error::MigrationError;
pub use migrator_domain::PhaseContext;
