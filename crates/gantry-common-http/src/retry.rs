// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Retry with exponential backoff for transient HTTP failures.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
	/// Total number of attempts, including the first.
	pub max_attempts: u32,
	/// Backoff before the first retry.
	pub initial_backoff: Duration,
	/// Backoff ceiling; doubling stops here.
	pub max_backoff: Duration,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			initial_backoff: Duration::from_millis(250),
			max_backoff: Duration::from_secs(5),
		}
	}
}

/// Errors that can indicate whether retrying is worthwhile.
pub trait RetryableError {
	fn is_retryable(&self) -> bool;
}

impl RetryableError for reqwest::Error {
	fn is_retryable(&self) -> bool {
		self.is_timeout()
			|| self.is_connect()
			|| self
				.status()
				.is_some_and(|s| s.is_server_error() || s == reqwest::StatusCode::TOO_MANY_REQUESTS)
	}
}

/// Runs `f`, retrying retryable failures with exponential backoff and jitter.
///
/// The final error is returned once `max_attempts` is exhausted or a
/// non-retryable error occurs.
pub async fn retry<T, E, F, Fut>(config: &RetryConfig, mut f: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: RetryableError + Display,
{
	let mut backoff = config.initial_backoff;
	let mut attempt = 1u32;

	loop {
		match f().await {
			Ok(value) => return Ok(value),
			Err(err) if attempt < config.max_attempts && err.is_retryable() => {
				let jitter = backoff.mul_f64(fastrand::f64() * 0.25);
				let delay = backoff + jitter;
				tracing::debug!(
					attempt,
					delay_ms = delay.as_millis() as u64,
					error = %err,
					"transient failure, retrying"
				);
				tokio::time::sleep(delay).await;
				backoff = (backoff * 2).min(config.max_backoff);
				attempt += 1;
			}
			Err(err) => return Err(err),
		}
	}
}
