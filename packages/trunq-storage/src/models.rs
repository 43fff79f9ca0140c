use time::OffsetDateTime;
use uuid::Uuid;

use trunq_domain::{Intent, NoteRecord};

use crate::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
pub struct NoteRow {
	pub note_id: Uuid,
	pub namespace: String,
	pub raw_text: String,
	pub formatted_text: String,
	pub title: String,
	pub intent: String,
	pub tags: Vec<String>,
	pub scheduled_for: Option<OffsetDateTime>,
	pub has_deadline: bool,
	pub created_at: OffsetDateTime,
}
impl TryFrom<NoteRow> for NoteRecord {
	type Error = Error;

	fn try_from(row: NoteRow) -> Result<Self> {
		let intent: Intent = row.intent.parse().map_err(|_| {
			Error::CorruptNote {
				message: format!("note {} carries an unknown intent {:?}", row.note_id, row.intent),
			}
		})?;

		Ok(Self {
			note_id: row.note_id,
			namespace: row.namespace,
			raw_text: row.raw_text,
			formatted_text: row.formatted_text,
			title: row.title,
			intent,
			tags: row.tags,
			scheduled_for: row.scheduled_for,
			has_deadline: row.has_deadline,
			created_at: row.created_at,
		})
	}
}

/// One note's derived memory in the vector collection.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryPoint {
	pub memory_id: Uuid,
	pub namespace: String,
	pub note_id: Uuid,
	pub content: String,
	pub title: String,
	pub intent: Intent,
	pub tags: Vec<String>,
	pub raw_text: String,
	pub date: OffsetDateTime,
	pub has_deadline: bool,
	/// Epoch seconds.
	pub scheduled_for: Option<i64>,
}
impl MemoryPoint {
	pub fn from_note(note: &NoteRecord) -> Self {
		Self {
			memory_id: note.note_id,
			namespace: note.namespace.clone(),
			note_id: note.note_id,
			content: note.formatted_text.clone(),
			title: note.title.clone(),
			intent: note.intent,
			tags: note.tags.clone(),
			raw_text: note.raw_text.clone(),
			date: note.created_at,
			has_deadline: note.has_deadline,
			scheduled_for: note.scheduled_for.map(OffsetDateTime::unix_timestamp),
		}
	}
}

/// A memory read back through a filtered listing, metadata included.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedMemory {
	pub memory_id: Option<Uuid>,
	pub summary: String,
	pub intent: Option<Intent>,
	pub tags: Vec<String>,
	/// Epoch seconds.
	pub scheduled_for: Option<i64>,
}

/// A similarity search hit. Plain search carries no structured metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMemory {
	pub memory: String,
	pub score: f32,
}
