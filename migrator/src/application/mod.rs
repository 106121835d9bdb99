// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Application layer: the phase catalogue and the pure helpers it shares.
//! Everything here depends only on `migrator_domain`, never on `kube` or
//! `reqwest` directly — those live in [`crate::infrastructure`].

pub mod phase_catalogue;
pub mod phases;
pub mod support;
pub mod well_known;
