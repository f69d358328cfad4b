// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Expansion state for grouped tables.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::store::StateStore;

/// Which group keys are currently expanded, persisted under one bucket.
///
/// Hydrated once at construction; every toggle writes the full key list
/// back. Storage failures are logged and the in-memory set stays
/// authoritative for the session - the table never crashes on disk errors.
pub struct ExpansionState {
	bucket: String,
	expanded: BTreeSet<String>,
	store: Arc<dyn StateStore>,
}

impl ExpansionState {
	/// Loads the expansion set from the store's bucket.
	pub fn load(store: Arc<dyn StateStore>, bucket: impl Into<String>) -> Self {
		let bucket = bucket.into();
		let expanded = match store.read_bucket(&bucket) {
			Ok(keys) => keys.into_iter().collect(),
			Err(err) => {
				tracing::warn!(bucket, error = %err, "failed to hydrate expansion state, starting collapsed");
				BTreeSet::new()
			}
		};

		Self {
			bucket,
			expanded,
			store,
		}
	}

	pub fn is_expanded(&self, key: &str) -> bool {
		self.expanded.contains(key)
	}

	pub fn expanded_keys(&self) -> &BTreeSet<String> {
		&self.expanded
	}

	/// Toggles a key and persists the new set. Returns the new state.
	pub fn toggle(&mut self, key: &str) -> bool {
		let now_expanded = if self.expanded.remove(key) {
			false
		} else {
			self.expanded.insert(key.to_string());
			true
		};

		self.persist();
		now_expanded
	}

	fn persist(&self) {
		let keys: Vec<String> = self.expanded.iter().cloned().collect();
		if let Err(err) = self.store.write_bucket(&self.bucket, &keys) {
			tracing::warn!(bucket = %self.bucket, error = %err, "failed to persist expansion state");
		}
	}
}
