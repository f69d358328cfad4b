// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use ratatui::style::{Color, Modifier, Style};

/// Semantic color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
	pub background: Color,
	pub text: Color,
	pub text_muted: Color,
	pub accent: Color,
	pub success: Color,
	pub warning: Color,
	pub danger: Color,
}

/// Text styles derived from the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyles {
	pub normal: Style,
	pub bold: Style,
	pub muted: Style,
}

/// Border styles for focused and unfocused panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderStyles {
	pub normal: Style,
	pub focused: Style,
}

/// Theme for Gantry TUI widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
	pub colors: ColorPalette,
	pub text: TextStyles,
	pub borders: BorderStyles,
}

impl Theme {
	pub fn dark() -> Self {
		let colors = ColorPalette {
			background: Color::Reset,
			text: Color::Gray,
			text_muted: Color::DarkGray,
			accent: Color::Cyan,
			success: Color::Green,
			warning: Color::Yellow,
			danger: Color::Red,
		};

		Self {
			colors,
			text: TextStyles {
				normal: Style::default().fg(colors.text),
				bold: Style::default().fg(colors.text).add_modifier(Modifier::BOLD),
				muted: Style::default().fg(colors.text_muted),
			},
			borders: BorderStyles {
				normal: Style::default().fg(colors.text_muted),
				focused: Style::default().fg(colors.accent),
			},
		}
	}

	/// Style for a tick or run status tag.
	pub fn status_style(&self, ok: bool) -> Style {
		if ok {
			Style::default().fg(self.colors.success)
		} else {
			Style::default().fg(self.colors.danger)
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::dark()
	}
}
