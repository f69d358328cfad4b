// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use gantry_tui_theme::Theme;
use ratatui::{
	buffer::Buffer,
	layout::Rect,
	style::{Style, Stylize},
	text::{Line, Span},
	widgets::Widget,
};

/// One label/value pair shown on the left side of the bar.
#[derive(Debug, Clone)]
pub struct StatusItem {
	pub label: String,
	pub value: String,
}

/// Single-line status bar: items on the left, key shortcuts on the right.
#[derive(Debug, Clone, Default)]
pub struct StatusBar {
	items: Vec<StatusItem>,
	shortcuts: Vec<(String, String)>,
	style: Style,
}

impl StatusBar {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn item(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
		self.items.push(StatusItem {
			label: label.into(),
			value: value.into(),
		});
		self
	}

	pub fn shortcut(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
		self.shortcuts.push((key.into(), desc.into()));
		self
	}

	pub fn style(mut self, style: Style) -> Self {
		self.style = style;
		self
	}
}

impl Widget for StatusBar {
	fn render(self, area: Rect, buf: &mut Buffer) {
		if area.width == 0 || area.height == 0 {
			return;
		}

		let theme = Theme::default();
		if self.style != Style::default() {
			buf.set_style(area, self.style);
		}

		let mut shortcut_spans = Vec::new();
		for (i, (key, desc)) in self.shortcuts.iter().enumerate() {
			if i > 0 {
				shortcut_spans.push(Span::raw(" | "));
			}
			shortcut_spans.push(Span::raw(key).bold().fg(theme.colors.accent));
			shortcut_spans.push(Span::raw(" "));
			shortcut_spans.push(Span::raw(desc));
		}
		let shortcut_line = Line::from(shortcut_spans);
		let shortcut_width = shortcut_line.width() as u16;

		let available_for_items = area.width.saturating_sub(shortcut_width + 1);

		let mut item_spans = Vec::new();
		for (i, item) in self.items.iter().enumerate() {
			if i > 0 {
				item_spans.push(Span::raw(" | "));
			}
			item_spans.push(Span::raw(&item.label).bold());
			item_spans.push(Span::raw(": "));
			item_spans.push(Span::raw(&item.value));
		}
		let item_line = Line::from(item_spans);

		buf.set_line(area.x, area.y, &item_line, available_for_items);

		let shortcut_x = area.right().saturating_sub(shortcut_width);
		if shortcut_x > area.x {
			buf.set_line(shortcut_x, area.y, &shortcut_line, shortcut_width);
		}
	}
}
