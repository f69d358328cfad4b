// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the workspace query client.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ScheduleClientError>;

/// Errors that can occur when querying the workspace server.
#[derive(Debug, Error)]
pub enum ScheduleClientError {
	#[error("base URL is required")]
	MissingBaseUrl,

	#[error("auth token is required")]
	MissingAuthToken,

	#[error("schedule not found: {selector}")]
	NotFound { selector: String },

	#[error("server error ({status}): {message}")]
	Server { status: u16, message: String },

	#[error("request failed: {0}")]
	Transport(#[from] reqwest::Error),

	#[error("client has been shut down")]
	ClientShutdown,
}

impl ScheduleClientError {
	/// True when the entity simply does not exist, as opposed to a failure
	/// reaching or reading the server.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}
}
