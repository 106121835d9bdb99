// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Structured logging setup. `migrator-bootstrap`'s own `BootstrapLogger`
//! covers pre-flight CLI messages; this installs the process-wide
//! `tracing_subscriber` the rest of the operator logs through once the
//! composition root has finished reading configuration.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::infrastructure::config::OperatorConfig;

/// Installs the global `tracing` subscriber. Call once, from the
/// composition root, before the controller starts watching.
pub fn init(config: &OperatorConfig) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    if config.log_format == "json" {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().pretty().with_target(true)).init();
    }
}
