// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Virtualized schedules table widget.
//!
//! Repository groups flatten into header and leaf rows; only the rows inside
//! the scrolled viewport (plus an overscan margin) are rendered, and each
//! leaf row displays whatever its lazily-fetched snapshot holds so far.

mod rows;
mod virtualizer;

pub use rows::{duplicate_repo_names, flatten_rows, Row};
pub use virtualizer::{VirtualItem, Virtualizer};

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use gantry_schedules_core::{
	humanize_cron, RepositoryGroup, RunStatus, ScheduleSelector, ScheduleSnapshot, ScheduleStatus,
	TickStatus,
};
use gantry_tui_theme::Theme;
use ratatui::{
	buffer::Buffer,
	layout::Rect,
	style::{Modifier, Style},
	text::Line,
	widgets::StatefulWidget,
};
use unicode_width::UnicodeWidthStr;

/// Height of a repository header row, in terminal rows.
pub const HEADER_ROW_HEIGHT: u16 = 1;
/// Height of a schedule leaf row, in terminal rows.
pub const LEAF_ROW_HEIGHT: u16 = 3;
/// Rows mounted beyond the viewport in each scroll direction.
pub const OVERSCAN_ROWS: usize = 10;

static NOT_REQUESTED: RowViewState = RowViewState::NotRequested;

fn truncate_with_ellipsis(s: &str, max_width: usize) -> String {
	let width = UnicodeWidthStr::width(s);
	if width <= max_width {
		return s.to_string();
	}
	if max_width == 0 {
		return String::new();
	}
	if max_width == 1 {
		return "…".to_string();
	}

	let mut result = String::new();
	let mut current_width = 0;
	let target_width = max_width.saturating_sub(1);

	for c in s.chars() {
		let char_width = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
		if current_width + char_width > target_width {
			break;
		}
		result.push(c);
		current_width += char_width;
	}
	result.push('…');
	result
}

/// Fetch lifecycle of one leaf row's data.
///
/// A mounted row only moves forward: NotRequested, then Loading, then
/// Loaded or Errored. Unmounting discards the entry entirely so a remount
/// starts over with a fresh identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RowViewState {
	#[default]
	NotRequested,
	Loading,
	Loaded(Box<ScheduleSnapshot>),
	Errored,
}

impl RowViewState {
	pub fn snapshot(&self) -> Option<&ScheduleSnapshot> {
		match self {
			Self::Loaded(snapshot) => Some(snapshot),
			_ => None,
		}
	}
}

/// A leaf row currently inside the overscanned window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedLeaf {
	pub key: String,
	pub selector: ScheduleSelector,
}

/// State for [`ScheduleTable`].
#[derive(Default)]
pub struct ScheduleTableState {
	rows: Vec<Row>,
	virtualizer: Virtualizer,
	duplicate_names: BTreeSet<String>,
	expanded: BTreeSet<String>,
	scroll: u32,
	selected: usize,
	row_states: HashMap<String, RowViewState>,
}

impl ScheduleTableState {
	/// Rebuilds the flattened rows from groups and the expansion set.
	///
	/// View state for rows that disappeared (collapsed groups) is dropped.
	pub fn set_groups(&mut self, groups: &[RepositoryGroup], expanded: &BTreeSet<String>) {
		self.duplicate_names = duplicate_repo_names(groups);
		let rows = flatten_rows(groups, expanded);
		let virtualizer = Virtualizer::new(
			rows.len(),
			|i| {
				if rows[i].is_header() {
					HEADER_ROW_HEIGHT
				} else {
					LEAF_ROW_HEIGHT
				}
			},
			OVERSCAN_ROWS,
		);

		self.rows = rows;
		self.virtualizer = virtualizer;
		self.expanded = expanded.clone();

		if self.rows.is_empty() {
			self.selected = 0;
			self.scroll = 0;
		} else {
			self.selected = self.selected.min(self.rows.len() - 1);
		}

		let live: BTreeSet<String> = self.rows.iter().map(|r| r.key()).collect();
		self.row_states.retain(|key, _| live.contains(key));
	}

	pub fn rows(&self) -> &[Row] {
		&self.rows
	}

	pub fn selected_index(&self) -> usize {
		self.selected
	}

	pub fn selected_row(&self) -> Option<&Row> {
		self.rows.get(self.selected)
	}

	pub fn scroll(&self) -> u32 {
		self.scroll
	}

	pub fn select_next(&mut self) {
		if !self.rows.is_empty() {
			self.selected = (self.selected + 1).min(self.rows.len() - 1);
		}
	}

	pub fn select_prev(&mut self) {
		self.selected = self.selected.saturating_sub(1);
	}

	pub fn page_down(&mut self, viewport: u16) {
		if self.rows.is_empty() {
			return;
		}
		let step = (usize::from(viewport) / usize::from(LEAF_ROW_HEIGHT)).max(1);
		self.selected = (self.selected + step).min(self.rows.len() - 1);
	}

	pub fn page_up(&mut self, viewport: u16) {
		let step = (usize::from(viewport) / usize::from(LEAF_ROW_HEIGHT)).max(1);
		self.selected = self.selected.saturating_sub(step);
	}

	/// Scrolls just enough to keep the selected row inside the viewport.
	pub fn follow_selection(&mut self, viewport: u16) {
		if self.rows.is_empty() || viewport == 0 {
			return;
		}

		let start = self.virtualizer.start_of(self.selected);
		let end = start + u32::from(self.virtualizer.size_of(self.selected));

		if start < self.scroll {
			self.scroll = start;
		} else if end > self.scroll + u32::from(viewport) {
			self.scroll = end.saturating_sub(u32::from(viewport));
		}
		self.scroll = self.scroll.min(self.virtualizer.max_scroll(viewport));
	}

	/// Leaf rows inside the overscanned window for the given viewport.
	///
	/// This is the mount set the data loader keys off: entering it starts a
	/// delayed fetch, leaving it cancels one still pending.
	pub fn mounted_leaves(&self, viewport: u16) -> Vec<MountedLeaf> {
		self.virtualizer
			.window(self.scroll, viewport)
			.iter()
			.filter_map(|item| match &self.rows[item.index] {
				Row::Leaf { address, name } => Some(MountedLeaf {
					key: self.rows[item.index].key(),
					selector: ScheduleSelector::new(address, name),
				}),
				Row::Header { .. } => None,
			})
			.collect()
	}

	pub fn row_state(&self, key: &str) -> &RowViewState {
		self.row_states.get(key).unwrap_or(&NOT_REQUESTED)
	}

	/// Marks a row as loading. Returns false if a fetch was already issued.
	pub fn mark_loading(&mut self, key: &str) -> bool {
		let state = self
			.row_states
			.entry(key.to_string())
			.or_insert(RowViewState::NotRequested);
		if *state == RowViewState::NotRequested {
			*state = RowViewState::Loading;
			true
		} else {
			false
		}
	}

	pub fn set_loaded(&mut self, key: &str, snapshot: ScheduleSnapshot) {
		self
			.row_states
			.insert(key.to_string(), RowViewState::Loaded(Box::new(snapshot)));
	}

	pub fn set_errored(&mut self, key: &str) {
		self.row_states.insert(key.to_string(), RowViewState::Errored);
	}

	/// Drops a row's transient view state when it unmounts.
	pub fn remove_row_state(&mut self, key: &str) {
		self.row_states.remove(key);
	}
}

/// Column x-positions and widths for the table grid.
struct Columns {
	toggle: (u16, u16),
	name: (u16, u16),
	schedule: (u16, u16),
	tick: (u16, u16),
	run: (u16, u16),
	actions: (u16, u16),
}

impl Columns {
	fn layout(area: Rect) -> Self {
		let toggle_w = 2u16;
		let rest = area.width.saturating_sub(toggle_w);
		let name_w = rest * 28 / 100;
		let schedule_w = rest * 30 / 100;
		let tick_w = rest * 12 / 100;
		let run_w = rest * 20 / 100;
		let actions_w = rest
			.saturating_sub(name_w)
			.saturating_sub(schedule_w)
			.saturating_sub(tick_w)
			.saturating_sub(run_w);

		let x0 = area.x;
		let x1 = x0 + toggle_w;
		let x2 = x1 + name_w;
		let x3 = x2 + schedule_w;
		let x4 = x3 + tick_w;
		let x5 = x4 + run_w;

		Self {
			toggle: (x0, toggle_w),
			name: (x1, name_w),
			schedule: (x2, schedule_w),
			tick: (x3, tick_w),
			run: (x4, run_w),
			actions: (x5, actions_w),
		}
	}
}

fn draw_cell(buf: &mut Buffer, (x, width): (u16, u16), y: u16, text: &str, style: Style) {
	if width == 0 {
		return;
	}
	let truncated = truncate_with_ellipsis(text, usize::from(width.saturating_sub(1)));
	let line = Line::styled(truncated, style);
	buf.set_line(x, y, &line, width);
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
	ts.format("%b %d %H:%M").to_string()
}

fn tick_style(theme: &Theme, status: TickStatus) -> Style {
	match status {
		TickStatus::Success => theme.status_style(true),
		TickStatus::Failure => theme.status_style(false),
		TickStatus::Started => Style::default().fg(theme.colors.accent),
		TickStatus::Skipped => theme.text.muted,
	}
}

fn run_style(theme: &Theme, status: RunStatus) -> Style {
	match status {
		RunStatus::Success => theme.status_style(true),
		RunStatus::Failure => theme.status_style(false),
		RunStatus::Started | RunStatus::Queued => Style::default().fg(theme.colors.accent),
		RunStatus::Canceled => theme.text.muted,
	}
}

/// Virtualized table of schedules grouped by repository.
#[derive(Debug, Clone)]
pub struct ScheduleTable {
	theme: Theme,
	focused: bool,
}

impl ScheduleTable {
	pub fn new() -> Self {
		Self {
			theme: Theme::dark(),
			focused: false,
		}
	}

	pub fn theme(mut self, theme: Theme) -> Self {
		self.theme = theme;
		self
	}

	pub fn focused(mut self, focused: bool) -> Self {
		self.focused = focused;
		self
	}

	fn draw_column_headers(&self, area: Rect, buf: &mut Buffer) {
		let columns = Columns::layout(area);
		let style = self.theme.text.muted.add_modifier(Modifier::BOLD);
		draw_cell(buf, columns.name, area.y, "Schedule name", style);
		draw_cell(buf, columns.schedule, area.y, "Schedule", style);
		draw_cell(buf, columns.tick, area.y, "Last tick", style);
		draw_cell(buf, columns.run, area.y, "Last run", style);
		draw_cell(buf, columns.actions, area.y, "Actions", style);
	}

	fn draw_header_line(
		&self,
		buf: &mut Buffer,
		area: Rect,
		y: u16,
		row: &Row,
		expanded: bool,
		duplicated: bool,
		selected: bool,
	) {
		let (address, count) = match row {
			Row::Header {
				address,
				schedule_count,
			} => (address, *schedule_count),
			Row::Leaf { .. } => return,
		};

		let glyph = if expanded { "▾" } else { "▸" };
		let label = if duplicated {
			address.as_key()
		} else {
			address.name.clone()
		};
		let text = format!("{} {} [{}]", glyph, label, count);

		let mut style = self.theme.text.bold;
		if selected {
			style = style.add_modifier(Modifier::REVERSED);
		}
		draw_cell(buf, (area.x, area.width), y, &text, style);
	}

	#[allow(clippy::too_many_arguments)]
	fn draw_leaf_line(
		&self,
		buf: &mut Buffer,
		area: Rect,
		y: u16,
		line: u16,
		name: &str,
		state: &RowViewState,
		selected: bool,
	) {
		// Third line is the visual separator between leaves.
		if line >= 2 {
			return;
		}

		let columns = Columns::layout(area);
		let highlight = |style: Style| {
			if selected {
				style.add_modifier(Modifier::REVERSED)
			} else {
				style
			}
		};

		let Some(snapshot) = state.snapshot() else {
			// NotRequested, Loading, and Errored all degrade to the same
			// neutral placeholder; failures never escape the row.
			if line == 0 {
				draw_cell(buf, columns.name, y, name, highlight(self.theme.text.bold));
				draw_cell(
					buf,
					columns.schedule,
					y,
					"loading or none…",
					highlight(self.theme.text.muted),
				);
			}
			return;
		};

		match line {
			0 => {
				let (indicator, indicator_style) = match snapshot.status {
					ScheduleStatus::Running => ("●", self.theme.status_style(true)),
					ScheduleStatus::Stopped => ("○", self.theme.text.muted),
				};
				draw_cell(buf, columns.toggle, y, indicator, highlight(indicator_style));
				draw_cell(buf, columns.name, y, name, highlight(self.theme.text.bold));

				let cron = humanize_cron(
					&snapshot.cron_schedule,
					snapshot.execution_timezone.as_deref(),
				);
				draw_cell(buf, columns.schedule, y, &cron, highlight(self.theme.text.normal));

				if let Some(tick) = &snapshot.last_tick {
					draw_cell(
						buf,
						columns.tick,
						y,
						&tick.status.to_string(),
						highlight(tick_style(&self.theme, tick.status)),
					);
				}
				if let Some(run) = &snapshot.last_run {
					draw_cell(
						buf,
						columns.run,
						y,
						&run.status.to_string(),
						highlight(run_style(&self.theme, run.status)),
					);
				}
				// The action menu exists only once partition metadata is known.
				if snapshot.partition_set.is_some() {
					draw_cell(buf, columns.actions, y, "[⋯]", highlight(self.theme.text.normal));
				}
			}
			1 => {
				let target = if snapshot.is_job { "job" } else { "pipeline" };
				draw_cell(
					buf,
					columns.name,
					y,
					&format!("{}: {}", target, snapshot.job_name),
					highlight(self.theme.text.muted),
				);

				let next_tick = match snapshot.upcoming_tick() {
					Some(ts) => format!("Next tick: {}", format_timestamp(ts)),
					None => "Next tick: None".to_string(),
				};
				draw_cell(buf, columns.schedule, y, &next_tick, highlight(self.theme.text.muted));

				if let Some(tick) = &snapshot.last_tick {
					draw_cell(
						buf,
						columns.tick,
						y,
						&format_timestamp(tick.timestamp),
						highlight(self.theme.text.muted),
					);
				}
				if let Some(run) = &snapshot.last_run {
					if let Some(finished) = run.finished_at.or(run.started_at) {
						draw_cell(
							buf,
							columns.run,
							y,
							&format_timestamp(finished),
							highlight(self.theme.text.muted),
						);
					}
				}
			}
			_ => {}
		}
	}

	fn draw_scrollbar(&self, buf: &mut Buffer, area: Rect, state: &ScheduleTableState) {
		let total = state.virtualizer.total_size();
		let viewport = u32::from(area.height);
		if total <= viewport || area.width == 0 || area.height == 0 {
			return;
		}

		let x = area.x + area.width - 1;
		let track = u32::from(area.height);
		let thumb = ((viewport * track) / total).max(1);
		let max_scroll = state.virtualizer.max_scroll(area.height);
		let thumb_offset = if max_scroll == 0 {
			0
		} else {
			(state.scroll * (track - thumb)) / max_scroll
		};

		for i in 0..track {
			let (symbol, style) = if i >= thumb_offset && i < thumb_offset + thumb {
				("█", Style::default().fg(self.theme.colors.text))
			} else {
				("░", Style::default().fg(self.theme.colors.text_muted))
			};
			buf[(x, area.y + i as u16)].set_symbol(symbol).set_style(style);
		}
	}
}

impl Default for ScheduleTable {
	fn default() -> Self {
		Self::new()
	}
}

impl StatefulWidget for ScheduleTable {
	type State = ScheduleTableState;

	fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
		if area.width == 0 || area.height < 2 {
			return;
		}

		self.draw_column_headers(area, buf);

		let body = Rect {
			x: area.x,
			y: area.y + 1,
			width: area.width,
			height: area.height - 1,
		};

		state.follow_selection(body.height);

		for item in state.virtualizer.window(state.scroll, body.height) {
			let row = &state.rows[item.index];
			let selected = self.focused && item.index == state.selected;

			for line in 0..item.size {
				let global = item.start + u32::from(line);
				if global < state.scroll || global >= state.scroll + u32::from(body.height) {
					continue;
				}
				let y = body.y + (global - state.scroll) as u16;

				match row {
					Row::Header { address, .. } => {
						let expanded = state.expanded.contains(&address.as_key());
						let duplicated = state.duplicate_names.contains(&address.name);
						self.draw_header_line(buf, body, y, row, expanded, duplicated, selected);
					}
					Row::Leaf { name, .. } => {
						let row_state = state
							.row_states
							.get(&row.key())
							.unwrap_or(&NOT_REQUESTED);
						self.draw_leaf_line(buf, body, y, line, name, row_state, selected);
					}
				}
			}
		}

		self.draw_scrollbar(buf, body, state);
	}
}
