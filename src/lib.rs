// Copyright 2026 Crumb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Crumb: cookie and web-storage collection with dual HTTP/browser passes
//! and an offline statistics engine.

pub mod cli;
pub mod collector;
pub mod export;
pub mod orchestrator;
pub mod record;
pub mod stats;
pub mod store;
pub mod target;
