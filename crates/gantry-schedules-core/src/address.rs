// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository addressing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;

/// Address of a repository in the workspace.
///
/// The (name, location) pair is unique; the string form `name@location` is
/// the stable key used for storage buckets and row identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoAddress {
	pub name: String,
	pub location: String,
}

impl RepoAddress {
	pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			location: location.into(),
		}
	}

	/// Stable string form: `name@location`.
	pub fn as_key(&self) -> String {
		format!("{}@{}", self.name, self.location)
	}
}

impl fmt::Display for RepoAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}@{}", self.name, self.location)
	}
}

impl FromStr for RepoAddress {
	type Err = AddressError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.split_once('@') {
			Some((name, location)) if !name.is_empty() && !location.is_empty() => {
				Ok(Self::new(name, location))
			}
			_ => Err(AddressError::InvalidAddress(s.to_string())),
		}
	}
}

/// A repository and the schedule names it owns, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryGroup {
	#[serde(flatten)]
	pub address: RepoAddress,
	pub schedules: Vec<String>,
}

impl RepositoryGroup {
	pub fn new(address: RepoAddress, schedules: Vec<String>) -> Self {
		Self { address, schedules }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn address_roundtrip(name in "[a-z][a-z0-9_]{0,20}", location in "[a-z][a-z0-9_.]{0,20}") {
			let addr = RepoAddress::new(name, location);
			let parsed: RepoAddress = addr.as_key().parse().unwrap();
			prop_assert_eq!(addr, parsed);
		}
	}

	#[test]
	fn key_format() {
		let addr = RepoAddress::new("repo1", "loc1");
		assert_eq!(addr.as_key(), "repo1@loc1");
		assert_eq!(addr.to_string(), "repo1@loc1");
	}

	#[test]
	fn parse_rejects_missing_parts() {
		assert!("".parse::<RepoAddress>().is_err());
		assert!("repo1".parse::<RepoAddress>().is_err());
		assert!("@loc1".parse::<RepoAddress>().is_err());
		assert!("repo1@".parse::<RepoAddress>().is_err());
	}

	#[test]
	fn group_serde_flattens_address() {
		let group = RepositoryGroup::new(RepoAddress::new("repo1", "loc1"), vec!["s1".to_string()]);
		let json = serde_json::to_value(&group).unwrap();
		assert_eq!(json["name"], "repo1");
		assert_eq!(json["location"], "loc1");
		assert_eq!(json["schedules"][0], "s1");
	}
}
