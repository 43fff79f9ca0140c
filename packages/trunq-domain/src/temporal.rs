use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Intent;

/// A time window. `start < end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RangeBounds")]
pub struct TemporalRange {
	#[serde(with = "crate::time_serde")]
	start: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	end: OffsetDateTime,
}
impl TemporalRange {
	/// Returns `None` unless `start` is strictly before `end`.
	pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Option<Self> {
		(start < end).then_some(Self { start, end })
	}

	/// Both bounds must be present; a one-sided range is treated as absent.
	pub fn from_bounds(start: Option<OffsetDateTime>, end: Option<OffsetDateTime>) -> Option<Self> {
		match (start, end) {
			(Some(start), Some(end)) => Self::new(start, end),
			_ => None,
		}
	}

	pub fn start(&self) -> OffsetDateTime {
		self.start
	}

	pub fn end(&self) -> OffsetDateTime {
		self.end
	}
}

#[derive(Deserialize)]
struct RangeBounds {
	#[serde(with = "crate::time_serde")]
	start: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	end: OffsetDateTime,
}
impl TryFrom<RangeBounds> for TemporalRange {
	type Error = &'static str;

	fn try_from(bounds: RangeBounds) -> Result<Self, Self::Error> {
		Self::new(bounds.start, bounds.end).ok_or("Temporal range start must precede its end.")
	}
}

/// Structured retrieval plan derived from a free-form question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalIntent {
	pub relevant_intents: Vec<Intent>,
	pub temporal_range: Option<TemporalRange>,
	pub semantic_query: String,
	pub requires_synthesis: bool,
}
impl RetrievalIntent {
	/// Builds an intent, deduplicating categories in order and widening an empty set to every
	/// category. A blank refined query falls back to the question itself.
	pub fn new(
		question: &str,
		relevant_intents: impl IntoIterator<Item = Intent>,
		temporal_range: Option<TemporalRange>,
		semantic_query: Option<String>,
		requires_synthesis: bool,
	) -> Self {
		let mut intents = Vec::new();

		for intent in relevant_intents {
			if !intents.contains(&intent) {
				intents.push(intent);
			}
		}

		if intents.is_empty() {
			intents.extend(Intent::ALL);
		}

		let semantic_query = semantic_query
			.map(|query| query.trim().to_string())
			.filter(|query| !query.is_empty())
			.unwrap_or_else(|| question.trim().to_string());

		Self { relevant_intents: intents, temporal_range, semantic_query, requires_synthesis }
	}

	/// The degraded-but-safe intent used when analysis fails.
	pub fn fallback(question: &str) -> Self {
		Self {
			relevant_intents: Intent::ACTION_LIKE.to_vec(),
			temporal_range: None,
			semantic_query: question.to_string(),
			requires_synthesis: true,
		}
	}
}
