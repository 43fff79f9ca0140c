//! Normalizes per-source records into [`FusedItem`]s.
//!
//! Fusion is a pure function of its inputs. Exact duplicates are dropped within a source; overlap
//! across sources is left for the synthesizer to resolve.

use std::collections::HashSet;

use serde::Serialize;
use time::OffsetDateTime;

use crate::{RetrievalSource, SemanticHits};
use trunq_domain::{Intent, NoteRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
	Retrieved,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedItem {
	pub text: String,
	pub intent: Option<Intent>,
	pub tags: Vec<String>,
	#[serde(with = "trunq_domain::time_serde::option")]
	pub timestamp: Option<OffsetDateTime>,
	pub source: RetrievalSource,
	pub status: ItemStatus,
}

/// Structured items first, in store order, then semantic items. Listed semantic items are
/// ordered by scheduled time with unscheduled items last; similarity hits keep their rank.
///
/// Structured items and listed semantic items are capped at `limit` each. Similarity hits are
/// already bounded by the configured top-k and are never trimmed here.
pub fn fuse(structured: &[NoteRecord], semantic: &SemanticHits, limit: usize) -> Vec<FusedItem> {
	let mut out = dedupe(structured.iter().map(structured_item));

	out.truncate(limit);

	let semantic_items = match semantic {
		SemanticHits::Listed(memories) => {
			let mut items = memories
				.iter()
				.map(|memory| FusedItem {
					text: memory.summary.trim().to_string(),
					intent: memory.intent,
					tags: memory.tags.clone(),
					timestamp: memory
						.scheduled_for
						.and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok()),
					source: RetrievalSource::Semantic,
					status: ItemStatus::Retrieved,
				})
				.collect::<Vec<_>>();

			items.sort_by_key(|item| (item.timestamp.is_none(), item.timestamp));

			let mut items = dedupe(items);

			items.truncate(limit);

			items
		},
		SemanticHits::Scored(hits) => dedupe(hits.iter().map(|hit| FusedItem {
			text: hit.memory.trim().to_string(),
			intent: None,
			tags: Vec::new(),
			timestamp: None,
			source: RetrievalSource::Semantic,
			status: ItemStatus::Retrieved,
		})),
	};

	out.extend(semantic_items);

	out
}

fn structured_item(note: &NoteRecord) -> FusedItem {
	FusedItem {
		text: note.formatted_text.trim().to_string(),
		intent: Some(note.intent),
		tags: note.tags.clone(),
		timestamp: note.scheduled_for,
		source: RetrievalSource::Structured,
		status: ItemStatus::Retrieved,
	}
}

fn dedupe(items: impl IntoIterator<Item = FusedItem>) -> Vec<FusedItem> {
	let mut seen = HashSet::new();

	items
		.into_iter()
		.filter(|item| !item.text.is_empty() && seen.insert(item.text.clone()))
		.collect()
}
