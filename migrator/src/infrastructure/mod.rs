// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Infrastructure layer: the only place that talks to `kube`, `reqwest`, or
//! the process environment. Everything here implements a port defined in
//! `migrator_domain::repositories`, or supports the composition root that
//! wires those implementations together.

pub mod cluster;
pub mod config;
pub mod crd;
pub mod logging;
pub mod metrics;
pub mod migration_repository;
pub mod reconcile;
pub mod vsphere;

pub use cluster::KubeClusterGateway;
pub use config::OperatorConfig;
pub use crd::{VSphereMigration, VSphereMigrationSpec};
pub use metrics::{MetricsEndpoint, MetricsService};
pub use migration_repository::KubeMigrationRepository;
pub use reconcile::ReconcilerContext;
pub use vsphere::{RestVsphereGateway, SharedVsphereGatewayFactory};
