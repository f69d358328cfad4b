// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP client for the workspace schedules API.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gantry_common_http::RetryConfig;
use gantry_schedules_core::{
	RepositoryGroup, ScheduleSelector, ScheduleSnapshot, ScheduleStatus,
};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::{Result, ScheduleClientError};

/// Configuration for the schedules client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// Timeout for HTTP requests.
	pub request_timeout: Duration,
	/// Retry configuration for HTTP requests.
	pub retry_config: RetryConfig,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			request_timeout: Duration::from_secs(30),
			retry_config: RetryConfig::default(),
		}
	}
}

/// Builder for constructing a ScheduleClient.
pub struct ScheduleClientBuilder {
	base_url: Option<String>,
	auth_token: Option<String>,
	config: ClientConfig,
}

impl ScheduleClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			base_url: None,
			auth_token: None,
			config: ClientConfig::default(),
		}
	}

	/// Sets the base URL for the workspace server.
	///
	/// Example: `https://gantry.ghuntley.com`
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());
		self
	}

	/// Sets the authentication token (user bearer token).
	pub fn auth_token(mut self, token: impl Into<String>) -> Self {
		self.auth_token = Some(token.into());
		self
	}

	/// Sets the HTTP request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = timeout;
		self
	}

	/// Sets the retry configuration.
	pub fn retry_config(mut self, config: RetryConfig) -> Self {
		self.config.retry_config = config;
		self
	}

	/// Builds the ScheduleClient.
	pub fn build(self) -> Result<ScheduleClient> {
		let base_url = self.base_url.ok_or(ScheduleClientError::MissingBaseUrl)?;
		let auth_token = self.auth_token.ok_or(ScheduleClientError::MissingAuthToken)?;

		// Normalize base URL
		let base_url = base_url.trim_end_matches('/').to_string();

		let http_client = gantry_common_http::builder()
			.timeout(self.config.request_timeout)
			.build()
			.map_err(ScheduleClientError::Transport)?;

		let inner = Arc::new(ScheduleClientInner {
			base_url: base_url.clone(),
			auth_token,
			http_client,
			config: self.config,
			closed: AtomicBool::new(false),
			cache: Mutex::new(HashMap::new()),
		});

		info!(base_url = %base_url, "Schedules client initialized");

		Ok(ScheduleClient { inner })
	}
}

impl Default for ScheduleClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Internal client state.
struct ScheduleClientInner {
	base_url: String,
	auth_token: String,
	http_client: Client,
	config: ClientConfig,
	closed: AtomicBool,
	cache: Mutex<HashMap<ScheduleSelector, ScheduleSnapshot>>,
}

/// Client for the workspace schedules API.
///
/// # Example
///
/// ```ignore
/// use gantry_schedules_client::ScheduleClient;
/// use gantry_schedules_core::{RepoAddress, ScheduleSelector};
///
/// let client = ScheduleClient::builder()
///     .base_url("https://gantry.ghuntley.com")
///     .auth_token("your_auth_token")
///     .build()?;
///
/// let selector = ScheduleSelector::new(&RepoAddress::new("repo1", "loc1"), "daily_report");
/// let snapshot = client.schedule(&selector).await?;
/// ```
#[derive(Clone)]
pub struct ScheduleClient {
	inner: Arc<ScheduleClientInner>,
}

impl ScheduleClient {
	/// Creates a new builder for constructing a ScheduleClient.
	pub fn builder() -> ScheduleClientBuilder {
		ScheduleClientBuilder::new()
	}

	/// Lists repositories and the schedule names each one owns.
	pub async fn repositories(&self) -> Result<Vec<RepositoryGroup>> {
		self.check_closed()?;

		let url = format!("{}/api/workspace/repositories", self.inner.base_url);
		debug!(url = %url, "Fetching repository list");

		let response = self.get(&url).await?;
		let groups: Vec<RepositoryGroup> = response.json().await?;

		info!(count = groups.len(), "Fetched repository list");
		Ok(groups)
	}

	/// Returns the cached snapshot for a selector, if one has been fetched.
	///
	/// This is the stale half of stale-while-revalidate: callers display it
	/// immediately and still call [`ScheduleClient::schedule`] for fresh data.
	pub fn cached(&self, selector: &ScheduleSelector) -> Option<ScheduleSnapshot> {
		self
			.inner
			.cache
			.lock()
			.expect("schedule cache poisoned")
			.get(selector)
			.cloned()
	}

	/// Fetches the snapshot for a single schedule from the network.
	///
	/// A successful response replaces the cached snapshot for the selector.
	pub async fn schedule(&self, selector: &ScheduleSelector) -> Result<ScheduleSnapshot> {
		self.check_closed()?;

		let url = format!(
			"{}/api/workspace/{}/{}/schedules/{}",
			self.inner.base_url,
			selector.repository_location,
			selector.repository_name,
			selector.schedule_name
		);

		debug!(url = %url, selector = %selector, "Fetching schedule snapshot");

		let response = self.get(&url).await?;

		if response.status() == reqwest::StatusCode::NOT_FOUND {
			return Err(ScheduleClientError::NotFound {
				selector: selector.to_string(),
			});
		}

		if !response.status().is_success() {
			let status = response.status().as_u16();
			let message = response.text().await.unwrap_or_default();
			error!(status, message = %message, "Failed to fetch schedule snapshot");
			return Err(ScheduleClientError::Server { status, message });
		}

		let snapshot: ScheduleSnapshot = response.json().await?;

		self
			.inner
			.cache
			.lock()
			.expect("schedule cache poisoned")
			.insert(selector.clone(), snapshot.clone());

		Ok(snapshot)
	}

	/// Starts or stops a schedule.
	pub async fn set_schedule_status(
		&self,
		selector: &ScheduleSelector,
		status: ScheduleStatus,
	) -> Result<()> {
		self.check_closed()?;

		let url = format!(
			"{}/api/workspace/{}/{}/schedules/{}/status",
			self.inner.base_url,
			selector.repository_location,
			selector.repository_name,
			selector.schedule_name
		);

		debug!(url = %url, selector = %selector, status = %status, "Setting schedule status");

		let request = SetStatusRequest { status };
		let response =
			gantry_common_http::retry(&self.inner.config.retry_config, || async {
				self
					.inner
					.http_client
					.post(&url)
					.header("Authorization", format!("Bearer {}", self.inner.auth_token))
					.json(&request)
					.send()
					.await
			})
			.await
			.map_err(ScheduleClientError::Transport)?;

		if response.status() == reqwest::StatusCode::NOT_FOUND {
			return Err(ScheduleClientError::NotFound {
				selector: selector.to_string(),
			});
		}

		if !response.status().is_success() {
			let status_code = response.status().as_u16();
			let message = response.text().await.unwrap_or_default();
			error!(status = status_code, message = %message, "Failed to set schedule status");
			return Err(ScheduleClientError::Server {
				status: status_code,
				message,
			});
		}

		info!(selector = %selector, status = %status, "Schedule status updated");
		Ok(())
	}

	/// Shuts down the client.
	pub async fn shutdown(&self) -> Result<()> {
		if self.inner.closed.swap(true, Ordering::SeqCst) {
			return Ok(());
		}

		info!("Schedules client shutdown");
		Ok(())
	}

	/// Returns true if the client has been shut down.
	pub fn is_closed(&self) -> bool {
		self.inner.closed.load(Ordering::SeqCst)
	}

	fn check_closed(&self) -> Result<()> {
		if self.inner.closed.load(Ordering::SeqCst) {
			return Err(ScheduleClientError::ClientShutdown);
		}
		Ok(())
	}

	async fn get(&self, url: &str) -> Result<reqwest::Response> {
		gantry_common_http::retry(&self.inner.config.retry_config, || async {
			self
				.inner
				.http_client
				.get(url)
				.header("Authorization", format!("Bearer {}", self.inner.auth_token))
				.send()
				.await
		})
		.await
		.map_err(ScheduleClientError::Transport)
	}
}

/// Request payload for the status mutation.
#[derive(Debug, Serialize)]
struct SetStatusRequest {
	status: ScheduleStatus,
}

#[cfg(test)]
mod tests {
	use super::*;
	use gantry_schedules_core::RepoAddress;

	fn test_client() -> ScheduleClient {
		ScheduleClientBuilder::new()
			.base_url("https://example.com")
			.auth_token("token_123")
			.build()
			.unwrap()
	}

	fn test_selector() -> ScheduleSelector {
		ScheduleSelector::new(&RepoAddress::new("repo1", "loc1"), "s1")
	}

	fn test_snapshot() -> ScheduleSnapshot {
		ScheduleSnapshot {
			name: "s1".to_string(),
			job_name: "job1".to_string(),
			is_job: true,
			description: None,
			cron_schedule: "0 * * * *".to_string(),
			execution_timezone: None,
			status: ScheduleStatus::Running,
			running_count: 0,
			last_tick: None,
			last_run: None,
			next_tick: None,
			partition_set: None,
		}
	}

	#[test]
	fn test_builder_requires_base_url() {
		let result = ScheduleClientBuilder::new().auth_token("token_123").build();
		assert!(matches!(result, Err(ScheduleClientError::MissingBaseUrl)));
	}

	#[test]
	fn test_builder_requires_auth_token() {
		let result = ScheduleClientBuilder::new()
			.base_url("https://example.com")
			.build();
		assert!(matches!(result, Err(ScheduleClientError::MissingAuthToken)));
	}

	#[test]
	fn test_builder_normalizes_base_url() {
		let client = ScheduleClientBuilder::new()
			.base_url("https://example.com/")
			.auth_token("token_123")
			.build()
			.unwrap();

		assert!(!client.inner.base_url.ends_with('/'));
	}

	#[test]
	fn test_client_config_defaults() {
		let config = ClientConfig::default();
		assert_eq!(config.request_timeout, Duration::from_secs(30));
	}

	#[test]
	fn test_cache_starts_empty_and_serves_inserts() {
		let client = test_client();
		let selector = test_selector();
		assert!(client.cached(&selector).is_none());

		let snapshot = test_snapshot();
		client
			.inner
			.cache
			.lock()
			.unwrap()
			.insert(selector.clone(), snapshot.clone());

		assert_eq!(client.cached(&selector), Some(snapshot));
	}

	#[tokio::test]
	async fn test_shutdown_prevents_operations() {
		let client = test_client();
		client.shutdown().await.unwrap();

		let result = client.schedule(&test_selector()).await;
		assert!(matches!(result, Err(ScheduleClientError::ClientShutdown)));
	}

	#[tokio::test]
	async fn test_double_shutdown_is_ok() {
		let client = test_client();
		client.shutdown().await.unwrap();
		client.shutdown().await.unwrap();
	}

	#[test]
	fn test_not_found_classification() {
		let err = ScheduleClientError::NotFound {
			selector: "repo1@loc1:s1".to_string(),
		};
		assert!(err.is_not_found());
		assert!(!ScheduleClientError::ClientShutdown.is_not_found());
	}
}
