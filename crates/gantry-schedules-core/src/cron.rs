// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Human-readable rendering of cron expressions.
//!
//! Covers the shapes schedules actually use; anything else falls back to the
//! raw expression so the operator always sees something truthful.

/// Render a 5-field cron expression as readable English.
///
/// A non-UTC timezone is appended in parentheses. Unrecognized expressions
/// are returned verbatim.
pub fn humanize_cron(expression: &str, timezone: Option<&str>) -> String {
	let described = describe(expression).unwrap_or_else(|| expression.to_string());
	match timezone {
		Some(tz) if tz != "UTC" => format!("{} ({})", described, tz),
		_ => described,
	}
}

fn describe(expression: &str) -> Option<String> {
	let fields: Vec<&str> = expression.split_whitespace().collect();
	if fields.len() != 5 {
		return None;
	}
	let (minute, hour, dom, month, dow) = (fields[0], fields[1], fields[2], fields[3], fields[4]);

	if month != "*" {
		return None;
	}

	match (parse_field(minute), parse_field(hour), dom, dow) {
		(Field::Any, Field::Any, "*", "*") => Some("Every minute".to_string()),
		(Field::Step(1), Field::Any, "*", "*") => Some("Every minute".to_string()),
		(Field::Step(n), Field::Any, "*", "*") => Some(format!("Every {} minutes", n)),
		(Field::Exact(0), Field::Any, "*", "*") => Some("Every hour".to_string()),
		(Field::Exact(m), Field::Any, "*", "*") => Some(format!("Every hour at :{:02}", m)),
		(Field::Exact(m), Field::Exact(h), "*", "*") => {
			Some(format!("Every day at {:02}:{:02}", h, m))
		}
		(Field::Exact(m), Field::Exact(h), "*", dow) => {
			day_name(dow).map(|day| format!("Every {} at {:02}:{:02}", day, h, m))
		}
		(Field::Exact(m), Field::Exact(h), dom, "*") => dom
			.parse::<u32>()
			.ok()
			.filter(|d| (1..=31).contains(d))
			.map(|d| format!("On day {} of every month at {:02}:{:02}", d, h, m)),
		_ => None,
	}
}

enum Field {
	Any,
	Exact(u32),
	Step(u32),
	Other,
}

fn parse_field(field: &str) -> Field {
	if field == "*" {
		return Field::Any;
	}
	if let Some(step) = field.strip_prefix("*/") {
		return match step.parse() {
			Ok(n) if n > 0 => Field::Step(n),
			_ => Field::Other,
		};
	}
	match field.parse() {
		Ok(n) => Field::Exact(n),
		Err(_) => Field::Other,
	}
}

fn day_name(dow: &str) -> Option<&'static str> {
	match dow {
		"0" | "7" => Some("Sunday"),
		"1" => Some("Monday"),
		"2" => Some("Tuesday"),
		"3" => Some("Wednesday"),
		"4" => Some("Thursday"),
		"5" => Some("Friday"),
		"6" => Some("Saturday"),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_minute() {
		assert_eq!(humanize_cron("* * * * *", None), "Every minute");
		assert_eq!(humanize_cron("*/1 * * * *", None), "Every minute");
	}

	#[test]
	fn minute_steps() {
		assert_eq!(humanize_cron("*/15 * * * *", None), "Every 15 minutes");
	}

	#[test]
	fn hourly() {
		assert_eq!(humanize_cron("0 * * * *", None), "Every hour");
		assert_eq!(humanize_cron("5 * * * *", None), "Every hour at :05");
	}

	#[test]
	fn daily() {
		assert_eq!(humanize_cron("30 3 * * *", None), "Every day at 03:30");
	}

	#[test]
	fn weekly() {
		assert_eq!(humanize_cron("0 9 * * 1", None), "Every Monday at 09:00");
		assert_eq!(humanize_cron("0 9 * * 7", None), "Every Sunday at 09:00");
	}

	#[test]
	fn monthly() {
		assert_eq!(
			humanize_cron("0 0 15 * *", None),
			"On day 15 of every month at 00:00"
		);
	}

	#[test]
	fn unrecognized_falls_back_to_raw() {
		assert_eq!(humanize_cron("0 3 * * 1-5", None), "0 3 * * 1-5");
		assert_eq!(humanize_cron("0 0 1 1 *", None), "0 0 1 1 *");
		assert_eq!(humanize_cron("not a cron", None), "not a cron");
		assert_eq!(humanize_cron("*/0 * * * *", None), "*/0 * * * *");
	}

	#[test]
	fn timezone_appended_when_not_utc() {
		assert_eq!(
			humanize_cron("0 * * * *", Some("America/New_York")),
			"Every hour (America/New_York)"
		);
		assert_eq!(humanize_cron("0 * * * *", Some("UTC")), "Every hour");
	}
}
