// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Row flattening for the grouped schedules table.

use std::collections::BTreeSet;

use gantry_schedules_core::{RepoAddress, RepositoryGroup};

/// One row of the flattened table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
	/// Repository group header.
	Header {
		address: RepoAddress,
		schedule_count: usize,
	},
	/// One schedule within an expanded group.
	Leaf { address: RepoAddress, name: String },
}

impl Row {
	/// Stable rendering key derived from logical identity, never position.
	pub fn key(&self) -> String {
		match self {
			Row::Header { address, .. } => address.as_key(),
			Row::Leaf { address, name } => format!("{}:{}", address.as_key(), name),
		}
	}

	pub fn is_header(&self) -> bool {
		matches!(self, Row::Header { .. })
	}

	pub fn address(&self) -> &RepoAddress {
		match self {
			Row::Header { address, .. } => address,
			Row::Leaf { address, .. } => address,
		}
	}
}

/// Flattens repository groups into the ordered row sequence.
///
/// Pure function of its inputs; cheap enough to recompute on every change.
/// Every group emits its header, even with zero schedules; leaves appear
/// only under expanded groups, in the group's own order.
pub fn flatten_rows(groups: &[RepositoryGroup], expanded: &BTreeSet<String>) -> Vec<Row> {
	let mut rows = Vec::new();
	for group in groups {
		rows.push(Row::Header {
			address: group.address.clone(),
			schedule_count: group.schedules.len(),
		});
		if expanded.contains(&group.address.as_key()) {
			for name in &group.schedules {
				rows.push(Row::Leaf {
					address: group.address.clone(),
					name: name.clone(),
				});
			}
		}
	}
	rows
}

/// Repository names that appear under more than one location.
///
/// Headers for these show the full `name@location` form to stay
/// distinguishable.
pub fn duplicate_repo_names(groups: &[RepositoryGroup]) -> BTreeSet<String> {
	let mut seen = BTreeSet::new();
	let mut duplicates = BTreeSet::new();
	for group in groups {
		if !seen.insert(group.address.name.clone()) {
			duplicates.insert(group.address.name.clone());
		}
	}
	duplicates
}
