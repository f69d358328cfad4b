// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! State bucket storage backends.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{Result, StateStoreError};

/// A named bucket of string keys.
///
/// Implementations must tolerate a bucket that has never been written:
/// reading it returns an empty list.
pub trait StateStore: Send + Sync {
	fn read_bucket(&self, bucket: &str) -> Result<Vec<String>>;
	fn write_bucket(&self, bucket: &str, keys: &[String]) -> Result<()>;
}

/// File-backed store: one JSON string array per bucket under a directory.
#[derive(Debug)]
pub struct FileStateStore {
	dir: PathBuf,
}

impl FileStateStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	/// Opens the store at the default XDG state directory.
	///
	/// `$XDG_STATE_HOME/gantry`, falling back to `~/.local/state/gantry`.
	pub fn open_default() -> Result<Self> {
		Ok(Self::new(Self::default_dir()?))
	}

	fn default_dir() -> Result<PathBuf> {
		let home = dirs::home_dir().ok_or(StateStoreError::StateDirNotFound)?;
		let state_home = std::env::var_os("XDG_STATE_HOME")
			.map(PathBuf::from)
			.unwrap_or_else(|| home.join(".local/state"));

		tracing::debug!(state_home = %state_home.display(), "resolved state directory");
		Ok(state_home.join("gantry"))
	}

	fn bucket_path(&self, bucket: &str) -> PathBuf {
		self.dir.join(format!("{}.json", bucket))
	}
}

impl StateStore for FileStateStore {
	fn read_bucket(&self, bucket: &str) -> Result<Vec<String>> {
		let path = self.bucket_path(bucket);
		if !path.exists() {
			return Ok(Vec::new());
		}

		let raw = fs::read_to_string(&path)?;
		serde_json::from_str(&raw).map_err(|source| StateStoreError::Malformed {
			bucket: bucket.to_string(),
			source,
		})
	}

	fn write_bucket(&self, bucket: &str, keys: &[String]) -> Result<()> {
		fs::create_dir_all(&self.dir)?;
		let path = self.bucket_path(bucket);
		let raw = serde_json::to_string_pretty(keys).map_err(|source| {
			StateStoreError::Malformed {
				bucket: bucket.to_string(),
				source,
			}
		})?;
		fs::write(&path, raw)?;

		tracing::debug!(bucket, path = %path.display(), count = keys.len(), "wrote state bucket");
		Ok(())
	}
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
	buckets: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryStateStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl StateStore for MemoryStateStore {
	fn read_bucket(&self, bucket: &str) -> Result<Vec<String>> {
		Ok(self
			.buckets
			.lock()
			.expect("state buckets poisoned")
			.get(bucket)
			.cloned()
			.unwrap_or_default())
	}

	fn write_bucket(&self, bucket: &str, keys: &[String]) -> Result<()> {
		self
			.buckets
			.lock()
			.expect("state buckets poisoned")
			.insert(bucket.to_string(), keys.to_vec());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn file_store_missing_bucket_reads_empty() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStateStore::new(dir.path());
		assert_eq!(store.read_bucket("nothing-here").unwrap(), Vec::<String>::new());
	}

	#[test]
	fn file_store_roundtrip() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStateStore::new(dir.path().join("nested"));

		let keys = vec!["repo1@loc1".to_string(), "repo2@loc2".to_string()];
		store.write_bucket("expansion", &keys).unwrap();
		assert_eq!(store.read_bucket("expansion").unwrap(), keys);
	}

	#[test]
	fn file_store_overwrites_on_write() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStateStore::new(dir.path());

		store
			.write_bucket("expansion", &["a".to_string(), "b".to_string()])
			.unwrap();
		store.write_bucket("expansion", &["b".to_string()]).unwrap();
		assert_eq!(store.read_bucket("expansion").unwrap(), vec!["b".to_string()]);
	}

	#[test]
	fn file_store_rejects_malformed_bucket() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStateStore::new(dir.path());
		fs::write(dir.path().join("broken.json"), "{not json").unwrap();

		let result = store.read_bucket("broken");
		assert!(matches!(result, Err(StateStoreError::Malformed { .. })));
	}

	#[test]
	fn memory_store_roundtrip() {
		let store = MemoryStateStore::new();
		assert_eq!(store.read_bucket("b").unwrap(), Vec::<String>::new());

		store.write_bucket("b", &["x".to_string()]).unwrap();
		assert_eq!(store.read_bucket("b").unwrap(), vec!["x".to_string()]);
	}
}
