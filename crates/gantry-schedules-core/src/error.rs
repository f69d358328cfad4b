// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for workspace domain values.

use thiserror::Error;

/// Errors produced when parsing workspace addresses.
#[derive(Debug, Error)]
pub enum AddressError {
	#[error("invalid repository address: {0}")]
	InvalidAddress(String),
}
