// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Clock Port
//!
//! No process-level singletons — the aggregate and phase catalogue never
//! call `Utc::now()` directly, so tests can drive time deterministically and
//! replay history entries without wall-clock skew.

use chrono::{DateTime, Utc};
use std::time::Duration;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed-instant clock for unit tests, optionally advanced by
/// [`FrozenClock::advance`] to exercise minimum-monitoring-window logic
/// (e.g. the CPMS rollout wait) without sleeping.
#[derive(Debug, Clone)]
pub struct FrozenClock(std::sync::Arc<std::sync::Mutex<DateTime<Utc>>>);

impl FrozenClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(std::sync::Arc::new(std::sync::Mutex::new(at)))
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.0.lock().expect("frozen clock mutex poisoned");
        *guard += chrono::Duration::from_std(by).expect("duration fits in chrono::Duration");
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().expect("frozen clock mutex poisoned")
    }
}
