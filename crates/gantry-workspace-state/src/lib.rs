// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Persisted UI state buckets for the Gantry dashboard.
//!
//! A bucket is a named list of string keys stored outside the process so
//! that view state (which repository groups are expanded) survives across
//! sessions. The store is an injectable capability: the dashboard uses the
//! XDG-backed file store, tests use the in-memory one.

mod error;
mod expansion;
mod store;

pub use error::{Result, StateStoreError};
pub use expansion::ExpansionState;
pub use store::{FileStateStore, MemoryStateStore, StateStore};
