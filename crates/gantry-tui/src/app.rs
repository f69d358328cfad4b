// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use gantry_schedules_client::ScheduleClient;
use gantry_schedules_core::{
	partitions_path, RepositoryGroup, ScheduleSelector, ScheduleStatus,
};
use gantry_tui_theme::Theme;
use gantry_tui_widget_schedule_table::{Row, ScheduleTable, ScheduleTableState};
use gantry_tui_widget_status_bar::StatusBar;
use gantry_workspace_state::{ExpansionState, StateStore};
use ratatui::{
	layout::{Constraint, Direction, Layout, Rect},
	style::Modifier,
	text::Line,
	widgets::{Block, Borders, Clear, Paragraph},
	Frame,
};

use crate::loader::{LoadEvent, RowLoader, ScheduleFetcher};

/// Storage bucket for which repository groups are expanded.
pub const SCHEDULES_EXPANSION_BUCKET: &str = "schedules-table-expansion";

struct MenuEntry {
	label: &'static str,
	path: String,
}

struct MenuState {
	title: String,
	entries: Vec<MenuEntry>,
	selected: usize,
}

pub struct App {
	client: ScheduleClient,
	groups: Vec<RepositoryGroup>,
	expansion: ExpansionState,
	table: ScheduleTableState,
	loader: RowLoader,
	menu: Option<MenuState>,
	status: Option<String>,
	viewport: u16,
	should_quit: bool,
	theme: Theme,
}

impl App {
	pub fn new(
		client: ScheduleClient,
		groups: Vec<RepositoryGroup>,
		store: Arc<dyn StateStore>,
		fetch_delay: Duration,
	) -> Self {
		let expansion = ExpansionState::load(store, SCHEDULES_EXPANSION_BUCKET);
		let mut table = ScheduleTableState::default();
		table.set_groups(&groups, expansion.expanded_keys());

		let loader = RowLoader::new(
			Arc::new(client.clone()) as Arc<dyn ScheduleFetcher>,
			fetch_delay,
		);

		Self {
			client,
			groups,
			expansion,
			table,
			loader,
			menu: None,
			status: None,
			viewport: 0,
			should_quit: false,
			theme: Theme::dark(),
		}
	}

	pub fn handle_key_event(&mut self, key: KeyEvent) {
		if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
			self.should_quit = true;
			return;
		}

		if self.menu.is_some() {
			self.handle_menu_key(key);
			return;
		}

		match key.code {
			KeyCode::Char('q') => {
				self.should_quit = true;
			}
			KeyCode::Up => {
				self.table.select_prev();
			}
			KeyCode::Down => {
				self.table.select_next();
			}
			KeyCode::PageUp => {
				self.table.page_up(self.viewport);
			}
			KeyCode::PageDown => {
				self.table.page_down(self.viewport);
			}
			KeyCode::Enter => {
				self.activate_selected();
			}
			KeyCode::Char(' ') => {
				self.toggle_selected_schedule();
			}
			_ => {}
		}
	}

	fn handle_menu_key(&mut self, key: KeyEvent) {
		let Some(menu) = &mut self.menu else { return };

		match key.code {
			KeyCode::Esc => {
				self.menu = None;
			}
			KeyCode::Up => {
				menu.selected = menu.selected.saturating_sub(1);
			}
			KeyCode::Down => {
				menu.selected = (menu.selected + 1).min(menu.entries.len().saturating_sub(1));
			}
			KeyCode::Enter => {
				let entry = &menu.entries[menu.selected];
				// Navigation is the web dashboard's job; surface the link.
				self.status = Some(format!("{}: {}", entry.label, entry.path));
				self.menu = None;
			}
			_ => {}
		}
	}

	/// Enter on a header toggles expansion; on a leaf with partitions it
	/// opens the action menu.
	fn activate_selected(&mut self) {
		let Some(row) = self.table.selected_row().cloned() else {
			return;
		};
		let key = row.key();

		match row {
			Row::Header { address, .. } => {
				self.expansion.toggle(&address.as_key());
				self.table.set_groups(&self.groups, self.expansion.expanded_keys());
			}
			Row::Leaf { address, name } => {
				let Some(snapshot) = self.table.row_state(&key).snapshot() else {
					return;
				};
				if snapshot.partition_set.is_none() {
					return;
				}

				let path = partitions_path(&address, &snapshot.job_name, snapshot.is_job);
				self.menu = Some(MenuState {
					title: name,
					entries: vec![
						MenuEntry {
							label: "View partition history",
							path: path.clone(),
						},
						MenuEntry {
							label: "Launch partition backfill",
							path,
						},
					],
					selected: 0,
				});
			}
		}
	}

	/// Space starts or stops the selected schedule, optimistically.
	fn toggle_selected_schedule(&mut self) {
		let Some(row) = self.table.selected_row().cloned() else {
			return;
		};
		let key = row.key();
		let Row::Leaf { address, name } = row else {
			return;
		};
		let Some(snapshot) = self.table.row_state(&key).snapshot().cloned() else {
			return;
		};

		let new_status = match snapshot.status {
			ScheduleStatus::Running => ScheduleStatus::Stopped,
			ScheduleStatus::Stopped => ScheduleStatus::Running,
		};

		let mut updated = snapshot;
		updated.status = new_status;
		self.table.set_loaded(&key, updated);

		let client = self.client.clone();
		let selector = ScheduleSelector::new(&address, &name);
		tokio::spawn(async move {
			if let Err(err) = client.set_schedule_status(&selector, new_status).await {
				tracing::warn!(selector = %selector, error = %err, "failed to update schedule status");
			}
		});

		let verb = match new_status {
			ScheduleStatus::Running => "Started",
			ScheduleStatus::Stopped => "Stopped",
		};
		self.status = Some(format!("{} {}", verb, name));
	}

	/// Applies completed fetches and reconciles loader tasks with the rows
	/// currently inside the overscanned window.
	pub fn tick(&mut self) {
		while let Some(event) = self.loader.try_recv() {
			match event {
				LoadEvent::Loaded { key, snapshot, .. } => {
					if self.loader.is_mounted(&key) {
						self.table.set_loaded(&key, snapshot);
					}
				}
				LoadEvent::Failed { key } => {
					if self.loader.is_mounted(&key) {
						self.table.set_errored(&key);
					}
				}
			}
		}

		let mounted = self.table.mounted_leaves(self.viewport);
		let outcome = self.loader.sync(&mounted);
		for key in outcome.unmounted {
			self.table.remove_row_state(&key);
		}
		for key in outcome.mounted {
			self.table.mark_loading(&key);
		}
	}

	pub fn render(&mut self, frame: &mut Frame) {
		let areas = Layout::default()
			.direction(Direction::Vertical)
			.constraints([
				Constraint::Length(1),
				Constraint::Min(1),
				Constraint::Length(1),
			])
			.split(frame.area());

		let title = Paragraph::new("Gantry Schedules").style(self.theme.text.bold);
		frame.render_widget(title, areas[0]);

		let table_focused = self.menu.is_none();
		let border_style = if table_focused {
			self.theme.borders.focused
		} else {
			self.theme.borders.normal
		};
		let block = Block::default()
			.title("Schedules")
			.borders(Borders::ALL)
			.border_style(border_style);
		let inner = block.inner(areas[1]);
		frame.render_widget(block, areas[1]);

		// The widget spends one line on column headers.
		self.viewport = inner.height.saturating_sub(1);

		let table = ScheduleTable::new().theme(self.theme).focused(table_focused);
		frame.render_stateful_widget(table, inner, &mut self.table);

		if let Some(menu) = &self.menu {
			self.render_menu(frame, areas[1], menu);
		}

		let status_bar = self.build_status_bar();
		frame.render_widget(status_bar, areas[2]);
	}

	fn render_menu(&self, frame: &mut Frame, area: Rect, menu: &MenuState) {
		let width = 44.min(area.width);
		let height = (menu.entries.len() as u16 + 2).min(area.height);
		let popup = Rect {
			x: area.x + (area.width.saturating_sub(width)) / 2,
			y: area.y + (area.height.saturating_sub(height)) / 2,
			width,
			height,
		};

		frame.render_widget(Clear, popup);

		let block = Block::default()
			.title(menu.title.clone())
			.borders(Borders::ALL)
			.border_style(self.theme.borders.focused);

		let lines: Vec<Line> = menu
			.entries
			.iter()
			.enumerate()
			.map(|(i, entry)| {
				let style = if i == menu.selected {
					self.theme.text.normal.add_modifier(Modifier::REVERSED)
				} else {
					self.theme.text.normal
				};
				Line::styled(entry.label, style)
			})
			.collect();

		frame.render_widget(Paragraph::new(lines).block(block), popup);
	}

	fn build_status_bar(&self) -> StatusBar {
		let schedule_count: usize = self.groups.iter().map(|g| g.schedules.len()).sum();
		let mut status = StatusBar::new()
			.item("Repos", self.groups.len().to_string())
			.item("Schedules", schedule_count.to_string());

		// Tooltip stand-in: the raw cron expression of the selected row.
		if let Some(row) = self.table.selected_row() {
			if !row.is_header() {
				if let Some(snapshot) = self.table.row_state(&row.key()).snapshot() {
					status = status.item("Cron", &snapshot.cron_schedule);
				}
			}
		}

		if let Some(message) = &self.status {
			status = status.item("Status", message);
		}

		if self.menu.is_some() {
			status = status
				.shortcut("↑↓", "Select")
				.shortcut("Enter", "Open")
				.shortcut("Esc", "Close");
		} else {
			status = status
				.shortcut("↑↓", "Select")
				.shortcut("Enter", "Expand")
				.shortcut("Space", "Start/Stop")
				.shortcut("q", "Quit");
		}

		status
	}

	pub fn should_quit(&self) -> bool {
		self.should_quit
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{TimeZone, Utc};
	use gantry_schedules_core::{PartitionSet, RepoAddress, ScheduleSnapshot};
	use gantry_workspace_state::MemoryStateStore;

	fn key(code: KeyCode) -> KeyEvent {
		KeyEvent::new(code, KeyModifiers::NONE)
	}

	fn test_app(store: Arc<MemoryStateStore>) -> App {
		let client = ScheduleClient::builder()
			.base_url("http://127.0.0.1:9")
			.auth_token("token_123")
			.build()
			.unwrap();
		let groups = vec![RepositoryGroup::new(
			RepoAddress::new("repo1", "loc1"),
			vec!["s1".to_string(), "s2".to_string()],
		)];
		App::new(client, groups, store, Duration::from_millis(250))
	}

	fn loaded_snapshot(with_partitions: bool) -> ScheduleSnapshot {
		ScheduleSnapshot {
			name: "s1".to_string(),
			job_name: "report_job".to_string(),
			is_job: true,
			description: None,
			cron_schedule: "0 3 * * *".to_string(),
			execution_timezone: None,
			status: ScheduleStatus::Running,
			running_count: 0,
			last_tick: None,
			last_run: None,
			next_tick: Some(Utc.with_ymd_and_hms(2025, 6, 1, 3, 0, 0).unwrap()),
			partition_set: with_partitions.then(|| PartitionSet {
				id: "ps1".to_string(),
				name: "daily".to_string(),
			}),
		}
	}

	#[tokio::test]
	async fn enter_on_header_toggles_and_persists_expansion() {
		let store = Arc::new(MemoryStateStore::new());
		let mut app = test_app(store.clone());

		assert_eq!(app.table.rows().len(), 1);

		app.handle_key_event(key(KeyCode::Enter));
		assert_eq!(app.table.rows().len(), 3);
		assert_eq!(
			store.read_bucket(SCHEDULES_EXPANSION_BUCKET).unwrap(),
			vec!["repo1@loc1".to_string()]
		);

		app.handle_key_event(key(KeyCode::Enter));
		assert_eq!(app.table.rows().len(), 1);
		assert!(store
			.read_bucket(SCHEDULES_EXPANSION_BUCKET)
			.unwrap()
			.is_empty());
	}

	#[tokio::test]
	async fn expansion_survives_restart() {
		let store = Arc::new(MemoryStateStore::new());
		{
			let mut app = test_app(store.clone());
			app.handle_key_event(key(KeyCode::Enter));
		}

		let app = test_app(store);
		assert_eq!(app.table.rows().len(), 3);
	}

	#[tokio::test]
	async fn menu_requires_partition_set() {
		let store = Arc::new(MemoryStateStore::new());
		let mut app = test_app(store);

		app.handle_key_event(key(KeyCode::Enter));
		app.handle_key_event(key(KeyCode::Down));

		// Not yet loaded: Enter does nothing.
		app.handle_key_event(key(KeyCode::Enter));
		assert!(app.menu.is_none());

		app.table.set_loaded("repo1@loc1:s1", loaded_snapshot(false));
		app.handle_key_event(key(KeyCode::Enter));
		assert!(app.menu.is_none());

		app.table.set_loaded("repo1@loc1:s1", loaded_snapshot(true));
		app.handle_key_event(key(KeyCode::Enter));
		assert!(app.menu.is_some());
	}

	#[tokio::test]
	async fn menu_enter_surfaces_deep_link() {
		let store = Arc::new(MemoryStateStore::new());
		let mut app = test_app(store);

		app.handle_key_event(key(KeyCode::Enter));
		app.handle_key_event(key(KeyCode::Down));
		app.table.set_loaded("repo1@loc1:s1", loaded_snapshot(true));
		app.handle_key_event(key(KeyCode::Enter));

		app.handle_key_event(key(KeyCode::Enter));
		assert!(app.menu.is_none());
		let status = app.status.unwrap();
		assert!(status.contains("/workspace/repo1@loc1/jobs/report_job/partitions"));
	}

	#[tokio::test]
	async fn space_toggles_status_optimistically() {
		let store = Arc::new(MemoryStateStore::new());
		let mut app = test_app(store);

		app.handle_key_event(key(KeyCode::Enter));
		app.handle_key_event(key(KeyCode::Down));
		app.table.set_loaded("repo1@loc1:s1", loaded_snapshot(false));

		app.handle_key_event(key(KeyCode::Char(' ')));
		let snapshot = app.table.row_state("repo1@loc1:s1").snapshot().unwrap();
		assert_eq!(snapshot.status, ScheduleStatus::Stopped);

		app.handle_key_event(key(KeyCode::Char(' ')));
		let snapshot = app.table.row_state("repo1@loc1:s1").snapshot().unwrap();
		assert_eq!(snapshot.status, ScheduleStatus::Running);
	}

	#[tokio::test]
	async fn quits_on_q_and_ctrl_c() {
		let store = Arc::new(MemoryStateStore::new());
		let mut app = test_app(store.clone());
		app.handle_key_event(key(KeyCode::Char('q')));
		assert!(app.should_quit());

		let mut app = test_app(store);
		app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
		assert!(app.should_quit());
	}
}
