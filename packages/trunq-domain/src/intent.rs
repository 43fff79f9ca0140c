use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Closed classification assigned to every note and used as a retrieval filter axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
	Tasks,
	Schedules,
	Reminder,
	Ideas,
	Note,
	Metric,
	Reflection,
	Curiosity,
	Decisions,
	People,
}
impl Intent {
	pub const ALL: [Self; 10] = [
		Self::Tasks,
		Self::Schedules,
		Self::Reminder,
		Self::Ideas,
		Self::Note,
		Self::Metric,
		Self::Reflection,
		Self::Curiosity,
		Self::Decisions,
		Self::People,
	];
	/// Categories used when a question cannot be analyzed.
	pub const ACTION_LIKE: [Self; 3] = [Self::Tasks, Self::Reminder, Self::Schedules];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Tasks => "tasks",
			Self::Schedules => "schedules",
			Self::Reminder => "reminder",
			Self::Ideas => "ideas",
			Self::Note => "note",
			Self::Metric => "metric",
			Self::Reflection => "reflection",
			Self::Curiosity => "curiosity",
			Self::Decisions => "decisions",
			Self::People => "people",
		}
	}

	/// One-line description used when prompting a language model.
	pub fn description(self) -> &'static str {
		match self {
			Self::Tasks => "Concrete actionable items",
			Self::Schedules => "Time-bound commitments or appointments",
			Self::Reminder => "Soft nudges to follow up on something",
			Self::Ideas => "Creative thoughts or brainstorming",
			Self::Note => "Static facts, information, or references",
			Self::Metric => "Self-tracking data with measurable values",
			Self::Reflection => "Personal feelings, insights, or introspection",
			Self::Curiosity => "Knowledge-seeking questions",
			Self::Decisions => "Committed choices or strategic plans",
			Self::People => "Notes about relationships or social context",
		}
	}
}

impl fmt::Display for Intent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Intent {
	type Err = ParseIntentError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		let trimmed = raw.trim();

		Self::ALL
			.into_iter()
			.find(|intent| intent.as_str().eq_ignore_ascii_case(trimmed))
			.ok_or_else(|| ParseIntentError { value: trimmed.to_string() })
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown intent category {value:?}.")]
pub struct ParseIntentError {
	pub value: String,
}
