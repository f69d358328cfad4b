// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schedule snapshot types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::RepoAddress;

/// Selector for a single schedule: repository address plus schedule name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleSelector {
	pub repository_name: String,
	pub repository_location: String,
	pub schedule_name: String,
}

impl ScheduleSelector {
	pub fn new(address: &RepoAddress, schedule_name: impl Into<String>) -> Self {
		Self {
			repository_name: address.name.clone(),
			repository_location: address.location.clone(),
			schedule_name: schedule_name.into(),
		}
	}

	pub fn address(&self) -> RepoAddress {
		RepoAddress::new(&self.repository_name, &self.repository_location)
	}
}

impl fmt::Display for ScheduleSelector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}@{}:{}",
			self.repository_name, self.repository_location, self.schedule_name
		)
	}
}

/// Run/pause status of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
	/// Schedule is active and will produce ticks
	Running,
	/// Schedule is paused
	Stopped,
}

impl fmt::Display for ScheduleStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Running => write!(f, "running"),
			Self::Stopped => write!(f, "stopped"),
		}
	}
}

impl FromStr for ScheduleStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"running" => Ok(Self::Running),
			"stopped" => Ok(Self::Stopped),
			_ => Err(format!("unknown schedule status: {}", s)),
		}
	}
}

/// Outcome of a single schedule tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickStatus {
	/// Tick evaluation in progress
	Started,
	/// Tick decided not to launch anything
	Skipped,
	/// Tick launched its runs
	Success,
	/// Tick evaluation failed
	Failure,
}

impl fmt::Display for TickStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Started => write!(f, "started"),
			Self::Skipped => write!(f, "skipped"),
			Self::Success => write!(f, "success"),
			Self::Failure => write!(f, "failure"),
		}
	}
}

impl FromStr for TickStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"started" => Ok(Self::Started),
			"skipped" => Ok(Self::Skipped),
			"success" => Ok(Self::Success),
			"failure" => Ok(Self::Failure),
			_ => Err(format!("unknown tick status: {}", s)),
		}
	}
}

/// Status of a launched run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
	Queued,
	Started,
	Success,
	Failure,
	Canceled,
}

impl fmt::Display for RunStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Queued => write!(f, "queued"),
			Self::Started => write!(f, "started"),
			Self::Success => write!(f, "success"),
			Self::Failure => write!(f, "failure"),
			Self::Canceled => write!(f, "canceled"),
		}
	}
}

impl FromStr for RunStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"queued" => Ok(Self::Queued),
			"started" => Ok(Self::Started),
			"success" => Ok(Self::Success),
			"failure" => Ok(Self::Failure),
			"canceled" => Ok(Self::Canceled),
			_ => Err(format!("unknown run status: {}", s)),
		}
	}
}

/// Most recent tick of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSnapshot {
	pub status: TickStatus,
	pub timestamp: DateTime<Utc>,
}

/// Most recent run launched by a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
	pub run_id: String,
	pub status: RunStatus,
	pub started_at: Option<DateTime<Utc>>,
	pub finished_at: Option<DateTime<Utc>>,
}

/// Partition dimension attached to a schedule's target job, if any.
///
/// Presence of this gates the partition history / backfill actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSet {
	pub id: String,
	pub name: String,
}

/// Full per-schedule state as returned by the workspace server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
	pub name: String,
	/// Name of the job (or legacy pipeline) the schedule targets.
	pub job_name: String,
	/// True when the target is a job, false for a legacy pipeline.
	pub is_job: bool,
	pub description: Option<String>,
	pub cron_schedule: String,
	/// IANA timezone the cron expression is evaluated in; UTC when absent.
	pub execution_timezone: Option<String>,
	pub status: ScheduleStatus,
	/// Number of in-flight runs launched by this schedule.
	pub running_count: u32,
	pub last_tick: Option<TickSnapshot>,
	pub last_run: Option<RunSnapshot>,
	pub next_tick: Option<DateTime<Utc>>,
	pub partition_set: Option<PartitionSet>,
}

impl ScheduleSnapshot {
	/// The next tick to display: only a running schedule has one, a stopped
	/// schedule renders "None" even when the server reports a timestamp.
	pub fn upcoming_tick(&self) -> Option<DateTime<Utc>> {
		match self.status {
			ScheduleStatus::Running => self.next_tick,
			ScheduleStatus::Stopped => None,
		}
	}
}
