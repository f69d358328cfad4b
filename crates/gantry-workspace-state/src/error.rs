// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! State store error types.

use thiserror::Error;

/// Result type for state store operations.
pub type Result<T> = std::result::Result<T, StateStoreError>;

/// Errors that can occur reading or writing a state bucket.
#[derive(Debug, Error)]
pub enum StateStoreError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("malformed state bucket {bucket}: {source}")]
	Malformed {
		bucket: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("could not determine state directory")]
	StateDirNotFound,
}
