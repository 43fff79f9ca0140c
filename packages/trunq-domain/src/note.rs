use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::Intent;

/// A note as emitted by the extraction step, before either store has seen it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNote {
	pub raw_text: String,
	pub formatted_text: String,
	pub title: String,
	pub intent: Intent,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default, with = "crate::time_serde::option")]
	pub scheduled_for: Option<OffsetDateTime>,
	#[serde(default)]
	pub has_deadline: bool,
}

/// A stored note. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
	pub note_id: Uuid,
	pub namespace: String,
	pub raw_text: String,
	pub formatted_text: String,
	pub title: String,
	pub intent: Intent,
	pub tags: Vec<String>,
	#[serde(with = "crate::time_serde::option")]
	pub scheduled_for: Option<OffsetDateTime>,
	pub has_deadline: bool,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
impl NoteRecord {
	pub fn from_new(namespace: &str, note: NewNote, now: OffsetDateTime) -> Self {
		let NewNote { raw_text, formatted_text, title, intent, tags, scheduled_for, has_deadline } =
			note;

		Self {
			note_id: Uuid::new_v4(),
			namespace: namespace.to_string(),
			raw_text,
			formatted_text,
			title,
			intent,
			tags,
			scheduled_for,
			has_deadline,
			created_at: now,
		}
	}
}
