// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deep-link path construction.
//!
//! Routing itself is owned by the web dashboard; this module only composes
//! the paths the TUI surfaces to the operator.

use crate::RepoAddress;

/// Path under a repository's workspace scope: `/workspace/name@location{suffix}`.
pub fn workspace_path(address: &RepoAddress, suffix: &str) -> String {
	format!("/workspace/{}{}", address.as_key(), suffix)
}

/// Deep link to a single schedule.
pub fn schedule_path(address: &RepoAddress, schedule_name: &str) -> String {
	workspace_path(address, &format!("/schedules/{}", schedule_name))
}

/// Deep link to the partitions view of a schedule's target.
///
/// The path segment branches on whether the target is a job or a legacy
/// pipeline.
pub fn partitions_path(address: &RepoAddress, job_name: &str, is_job: bool) -> String {
	let kind = if is_job { "jobs" } else { "pipelines" };
	workspace_path(address, &format!("/{}/{}/partitions", kind, job_name))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn workspace_path_format() {
		let addr = RepoAddress::new("repo1", "loc1");
		assert_eq!(workspace_path(&addr, ""), "/workspace/repo1@loc1");
		assert_eq!(
			schedule_path(&addr, "daily_report"),
			"/workspace/repo1@loc1/schedules/daily_report"
		);
	}

	#[test]
	fn partitions_path_branches_on_job() {
		let addr = RepoAddress::new("repo1", "loc1");
		assert_eq!(
			partitions_path(&addr, "report_job", true),
			"/workspace/repo1@loc1/jobs/report_job/partitions"
		);
		assert_eq!(
			partitions_path(&addr, "report_pipeline", false),
			"/workspace/repo1@loc1/pipelines/report_pipeline/partitions"
		);
	}
}
