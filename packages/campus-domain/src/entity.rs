use std::{fmt, str::FromStr};

use time::{Date, Duration, Month, OffsetDateTime, Time};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
	Project,
	Task,
	Document,
}
impl EntityKind {
	pub const ALL: [Self; 3] = [Self::Project, Self::Task, Self::Document];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Project => "project",
			Self::Task => "task",
			Self::Document => "document",
		}
	}

	/// Parses a comma separated list such as `project,task`. Duplicates collapse and an
	/// empty list means every kind.
	pub fn parse_csv(raw: &str) -> Result<Vec<Self>> {
		let mut out = Vec::new();

		for part in raw.split(',') {
			let trimmed = part.trim();

			if trimmed.is_empty() {
				continue;
			}

			let kind = trimmed.parse::<Self>()?;

			if !out.contains(&kind) {
				out.push(kind);
			}
		}

		if out.is_empty() {
			return Ok(Self::ALL.to_vec());
		}

		out.sort();

		Ok(out)
	}
}
impl fmt::Display for EntityKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for EntityKind {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"project" => Ok(Self::Project),
			"task" => Ok(Self::Task),
			"document" => Ok(Self::Document),
			_ => Err(Error::UnknownValue { kind: "entity type", value: raw.to_string() }),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
	Low,
	Medium,
	High,
	Urgent,
}
impl TaskPriority {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Low => "LOW",
			Self::Medium => "MEDIUM",
			Self::High => "HIGH",
			Self::Urgent => "URGENT",
		}
	}
}
impl FromStr for TaskPriority {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		match raw.trim().to_ascii_uppercase().as_str() {
			"LOW" => Ok(Self::Low),
			"MEDIUM" => Ok(Self::Medium),
			"HIGH" => Ok(Self::High),
			"URGENT" => Ok(Self::Urgent),
			_ => Err(Error::UnknownValue { kind: "priority", value: raw.to_string() }),
		}
	}
}

/// Calendar-aligned creation window, evaluated in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
	Today,
	ThisWeek,
	ThisMonth,
	ThisYear,
}
impl DateRange {
	/// Inclusive lower bound on `created_at` for this window.
	pub fn start(self, now: OffsetDateTime) -> OffsetDateTime {
		let now = now.to_offset(time::UtcOffset::UTC);
		let today = now.date();
		let date = match self {
			Self::Today => today,
			Self::ThisWeek =>
				today - Duration::days(i64::from(today.weekday().number_days_from_monday())),
			Self::ThisMonth => first_of_month(today),
			Self::ThisYear => first_of_year(today),
		};

		date.with_time(Time::MIDNIGHT).assume_utc()
	}
}
impl FromStr for DateRange {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		match raw.trim() {
			"today" => Ok(Self::Today),
			"this_week" => Ok(Self::ThisWeek),
			"this_month" => Ok(Self::ThisMonth),
			"this_year" => Ok(Self::ThisYear),
			_ => Err(Error::UnknownValue { kind: "date range", value: raw.to_string() }),
		}
	}
}

fn first_of_month(date: Date) -> Date {
	date - Duration::days(i64::from(date.day()) - 1)
}

fn first_of_year(date: Date) -> Date {
	Date::from_calendar_date(date.year(), Month::January, 1).unwrap_or(date)
}
