// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Window computation for the virtualized table.
//!
//! Row offsets are prefix sums over the estimated sizes; finding the rows
//! that intersect the viewport is a binary search over them, so the lookup
//! stays O(log n) no matter how many schedules the workspace holds.

/// A row worth rendering right now: stable index, size, and start offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualItem {
	pub index: usize,
	/// Estimated height in terminal rows.
	pub size: u16,
	/// Cumulative offset of the row's first line.
	pub start: u32,
}

/// Maps a scroll offset and viewport height to the window of rows to mount.
#[derive(Debug, Clone, Default)]
pub struct Virtualizer {
	/// offsets[i] is the start of row i; offsets[count] is the total size.
	offsets: Vec<u32>,
	overscan: usize,
}

impl Virtualizer {
	pub fn new(count: usize, estimate_size: impl Fn(usize) -> u16, overscan: usize) -> Self {
		let mut offsets = Vec::with_capacity(count + 1);
		let mut total = 0u32;
		offsets.push(0);
		for index in 0..count {
			total += u32::from(estimate_size(index));
			offsets.push(total);
		}
		Self { offsets, overscan }
	}

	pub fn count(&self) -> usize {
		self.offsets.len().saturating_sub(1)
	}

	/// Sum of all estimated row sizes.
	pub fn total_size(&self) -> u32 {
		*self.offsets.last().unwrap_or(&0)
	}

	pub fn start_of(&self, index: usize) -> u32 {
		self.offsets[index]
	}

	pub fn size_of(&self, index: usize) -> u16 {
		(self.offsets[index + 1] - self.offsets[index]) as u16
	}

	/// Largest scroll offset that still fills the viewport.
	pub fn max_scroll(&self, viewport: u16) -> u32 {
		self.total_size().saturating_sub(u32::from(viewport))
	}

	/// Index of the row containing `offset`.
	fn index_at(&self, offset: u32) -> usize {
		self.offsets[1..].partition_point(|&end| end <= offset)
	}

	/// Rows intersecting `[scroll, scroll + viewport)`, padded by the
	/// overscan margin in each direction.
	pub fn window(&self, scroll: u32, viewport: u16) -> Vec<VirtualItem> {
		let count = self.count();
		if count == 0 || viewport == 0 {
			return Vec::new();
		}

		let first_visible = self.index_at(scroll).min(count - 1);
		let end_offset = scroll.saturating_add(u32::from(viewport));
		let end_visible = self.offsets[..count].partition_point(|&start| start < end_offset);

		let first = first_visible.saturating_sub(self.overscan);
		let end = (end_visible + self.overscan).min(count);

		(first..end)
			.map(|index| VirtualItem {
				index,
				size: self.size_of(index),
				start: self.start_of(index),
			})
			.collect()
	}
}
