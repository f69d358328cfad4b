// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lazy per-row data loading.
//!
//! Every leaf row that enters the overscanned window gets one task: wait a
//! short settle delay, then fetch. Rows that scroll back out before the
//! delay elapses have their task aborted, so a fast scroll across hundreds
//! of rows produces no network traffic for the rows skimmed past.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gantry_schedules_client::{ScheduleClient, ScheduleClientError};
use gantry_schedules_core::{ScheduleSelector, ScheduleSnapshot};
use gantry_tui_widget_schedule_table::MountedLeaf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Result of one row's fetch, delivered to the UI loop.
#[derive(Debug)]
pub enum LoadEvent {
	Loaded {
		key: String,
		snapshot: ScheduleSnapshot,
		from_cache: bool,
	},
	Failed {
		key: String,
	},
}

/// Data source for a single schedule row.
///
/// The client implements this; tests substitute their own.
#[async_trait]
pub trait ScheduleFetcher: Send + Sync + 'static {
	/// Cached snapshot, served immediately while the network revalidates.
	fn cached(&self, selector: &ScheduleSelector) -> Option<ScheduleSnapshot>;

	async fn fetch(
		&self,
		selector: &ScheduleSelector,
	) -> Result<ScheduleSnapshot, ScheduleClientError>;
}

#[async_trait]
impl ScheduleFetcher for ScheduleClient {
	fn cached(&self, selector: &ScheduleSelector) -> Option<ScheduleSnapshot> {
		ScheduleClient::cached(self, selector)
	}

	async fn fetch(
		&self,
		selector: &ScheduleSelector,
	) -> Result<ScheduleSnapshot, ScheduleClientError> {
		self.schedule(selector).await
	}
}

/// Keys that changed mount state in one [`RowLoader::sync`] call.
#[derive(Debug, Default)]
pub struct SyncOutcome {
	/// Rows that just entered the window; a fetch task now exists for each.
	pub mounted: Vec<String>,
	/// Rows that left the window; their tasks were cancelled.
	pub unmounted: Vec<String>,
}

/// Owns one cancellable fetch task per mounted leaf row.
pub struct RowLoader {
	fetcher: Arc<dyn ScheduleFetcher>,
	delay: Duration,
	tx: mpsc::UnboundedSender<LoadEvent>,
	rx: mpsc::UnboundedReceiver<LoadEvent>,
	tasks: HashMap<String, JoinHandle<()>>,
}

impl RowLoader {
	pub fn new(fetcher: Arc<dyn ScheduleFetcher>, delay: Duration) -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		Self {
			fetcher,
			delay,
			tx,
			rx,
			tasks: HashMap::new(),
		}
	}

	/// Reconciles fetch tasks with the currently mounted leaf rows.
	///
	/// At most one task ever exists per row key: a key that stays mounted
	/// keeps its task (finished or not) and is not refetched; a key that
	/// leaves is aborted; a key that re-enters gets a fresh task, which
	/// serves cache first and then revalidates.
	pub fn sync(&mut self, mounted: &[MountedLeaf]) -> SyncOutcome {
		let mounted_keys: HashSet<&str> = mounted.iter().map(|l| l.key.as_str()).collect();

		let mut outcome = SyncOutcome::default();

		self.tasks.retain(|key, handle| {
			if mounted_keys.contains(key.as_str()) {
				true
			} else {
				handle.abort();
				outcome.unmounted.push(key.clone());
				false
			}
		});

		for leaf in mounted {
			if !self.tasks.contains_key(&leaf.key) {
				self.spawn(leaf);
				outcome.mounted.push(leaf.key.clone());
			}
		}

		outcome
	}

	/// True while the row is inside the window this loader last saw.
	pub fn is_mounted(&self, key: &str) -> bool {
		self.tasks.contains_key(key)
	}

	/// Next completed fetch, if any. Non-blocking; called from the UI loop.
	pub fn try_recv(&mut self) -> Option<LoadEvent> {
		self.rx.try_recv().ok()
	}

	/// Aborts every outstanding task.
	pub fn shutdown(&mut self) {
		for (_, handle) in self.tasks.drain() {
			handle.abort();
		}
	}

	fn spawn(&mut self, leaf: &MountedLeaf) {
		let fetcher = Arc::clone(&self.fetcher);
		let tx = self.tx.clone();
		let delay = self.delay;
		let key = leaf.key.clone();
		let selector = leaf.selector.clone();

		let handle = tokio::spawn(async move {
			tokio::time::sleep(delay).await;

			if let Some(snapshot) = fetcher.cached(&selector) {
				let _ = tx.send(LoadEvent::Loaded {
					key: key.clone(),
					snapshot,
					from_cache: true,
				});
			}

			match fetcher.fetch(&selector).await {
				Ok(snapshot) => {
					let _ = tx.send(LoadEvent::Loaded {
						key,
						snapshot,
						from_cache: false,
					});
				}
				Err(err) => {
					tracing::debug!(key = %key, error = %err, "row fetch failed");
					let _ = tx.send(LoadEvent::Failed { key });
				}
			}
		});

		self.tasks.insert(leaf.key.clone(), handle);
	}
}

impl Drop for RowLoader {
	fn drop(&mut self) {
		self.shutdown();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use gantry_schedules_core::{RepoAddress, ScheduleStatus};
	use std::sync::atomic::{AtomicU32, Ordering};
	use std::sync::Mutex;

	const DELAY: Duration = Duration::from_millis(250);

	struct MockFetcher {
		calls: AtomicU32,
		cache: Mutex<HashMap<ScheduleSelector, ScheduleSnapshot>>,
	}

	impl MockFetcher {
		fn new() -> Arc<Self> {
			Arc::new(Self {
				calls: AtomicU32::new(0),
				cache: Mutex::new(HashMap::new()),
			})
		}

		fn calls(&self) -> u32 {
			self.calls.load(Ordering::SeqCst)
		}
	}

	fn snapshot(name: &str) -> ScheduleSnapshot {
		ScheduleSnapshot {
			name: name.to_string(),
			job_name: "job".to_string(),
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

	#[async_trait]
	impl ScheduleFetcher for MockFetcher {
		fn cached(&self, selector: &ScheduleSelector) -> Option<ScheduleSnapshot> {
			self.cache.lock().unwrap().get(selector).cloned()
		}

		async fn fetch(
			&self,
			selector: &ScheduleSelector,
		) -> Result<ScheduleSnapshot, ScheduleClientError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			let snapshot = snapshot(&selector.schedule_name);
			self
				.cache
				.lock()
				.unwrap()
				.insert(selector.clone(), snapshot.clone());
			Ok(snapshot)
		}
	}

	fn leaf(name: &str) -> MountedLeaf {
		let address = RepoAddress::new("repo1", "loc1");
		MountedLeaf {
			key: format!("repo1@loc1:{}", name),
			selector: ScheduleSelector::new(&address, name),
		}
	}

	async fn settle() {
		for _ in 0..10 {
			tokio::task::yield_now().await;
		}
	}

	#[tokio::test(start_paused = true)]
	async fn unmount_before_delay_fetches_nothing() {
		let fetcher = MockFetcher::new();
		let mut loader = RowLoader::new(fetcher.clone(), DELAY);

		loader.sync(&[leaf("s1")]);
		settle().await;
		// Row scrolls back out before the settle delay elapses.
		let outcome = loader.sync(&[]);
		assert_eq!(outcome.unmounted, vec!["repo1@loc1:s1".to_string()]);

		tokio::time::advance(DELAY * 2).await;
		settle().await;

		assert_eq!(fetcher.calls(), 0);
		assert!(loader.try_recv().is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn mounted_row_fetches_after_delay() {
		let fetcher = MockFetcher::new();
		let mut loader = RowLoader::new(fetcher.clone(), DELAY);

		let outcome = loader.sync(&[leaf("s1")]);
		assert_eq!(outcome.mounted, vec!["repo1@loc1:s1".to_string()]);
		settle().await;

		// Nothing fires before the delay.
		tokio::time::advance(DELAY / 2).await;
		settle().await;
		assert_eq!(fetcher.calls(), 0);

		tokio::time::advance(DELAY).await;
		settle().await;
		assert_eq!(fetcher.calls(), 1);

		match loader.try_recv() {
			Some(LoadEvent::Loaded {
				key, from_cache, ..
			}) => {
				assert_eq!(key, "repo1@loc1:s1");
				assert!(!from_cache);
			}
			other => panic!("expected Loaded, got {:?}", other),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn repeated_sync_spawns_one_task_per_key() {
		let fetcher = MockFetcher::new();
		let mut loader = RowLoader::new(fetcher.clone(), DELAY);

		loader.sync(&[leaf("s1")]);
		let outcome = loader.sync(&[leaf("s1")]);
		assert!(outcome.mounted.is_empty());
		settle().await;

		tokio::time::advance(DELAY * 2).await;
		settle().await;
		assert_eq!(fetcher.calls(), 1);

		// Staying mounted after completion does not refetch.
		loader.sync(&[leaf("s1")]);
		settle().await;
		tokio::time::advance(DELAY * 2).await;
		settle().await;
		assert_eq!(fetcher.calls(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn remount_serves_cache_then_revalidates() {
		let fetcher = MockFetcher::new();
		let mut loader = RowLoader::new(fetcher.clone(), DELAY);

		loader.sync(&[leaf("s1")]);
		settle().await;
		tokio::time::advance(DELAY * 2).await;
		settle().await;
		assert_eq!(fetcher.calls(), 1);
		assert!(matches!(loader.try_recv(), Some(LoadEvent::Loaded { .. })));

		// Unmount, then remount: a fresh fetch is issued, but the cached
		// snapshot arrives first.
		loader.sync(&[]);
		loader.sync(&[leaf("s1")]);
		settle().await;
		tokio::time::advance(DELAY * 2).await;
		settle().await;

		match loader.try_recv() {
			Some(LoadEvent::Loaded { from_cache, .. }) => assert!(from_cache),
			other => panic!("expected cached Loaded, got {:?}", other),
		}
		match loader.try_recv() {
			Some(LoadEvent::Loaded { from_cache, .. }) => assert!(!from_cache),
			other => panic!("expected revalidated Loaded, got {:?}", other),
		}
		assert_eq!(fetcher.calls(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn failures_surface_as_failed_events() {
		struct FailingFetcher;

		#[async_trait]
		impl ScheduleFetcher for FailingFetcher {
			fn cached(&self, _selector: &ScheduleSelector) -> Option<ScheduleSnapshot> {
				None
			}

			async fn fetch(
				&self,
				selector: &ScheduleSelector,
			) -> Result<ScheduleSnapshot, ScheduleClientError> {
				Err(ScheduleClientError::NotFound {
					selector: selector.to_string(),
				})
			}
		}

		let mut loader = RowLoader::new(Arc::new(FailingFetcher), DELAY);
		loader.sync(&[leaf("missing")]);
		settle().await;

		tokio::time::advance(DELAY * 2).await;
		settle().await;

		match loader.try_recv() {
			Some(LoadEvent::Failed { key }) => assert_eq!(key, "repo1@loc1:missing"),
			other => panic!("expected Failed, got {:?}", other),
		}
	}
}
