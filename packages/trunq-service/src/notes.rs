//! Note ingestion and text search over the structured store.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, Result, RetrievalSource, TrunqService, require_non_blank};
use trunq_domain::{NewNote, NoteRecord};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestRequest {
	pub caller_id: String,
	pub notes: Vec<NewNote>,
}

#[derive(Clone, Debug, Serialize)]
pub struct IngestResponse {
	pub notes: Vec<NoteRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchNotesRequest {
	pub caller_id: String,
	pub text: String,
	#[serde(default)]
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchNotesResponse {
	pub notes: Vec<NoteRecord>,
}

impl TrunqService {
	pub async fn ingest(&self, req: IngestRequest) -> Result<IngestResponse> {
		self.ingest_at(req, OffsetDateTime::now_utc()).await
	}

	/// Writes each note to the structured store and then to the semantic store, each write bounded
	/// by `retrieval.source_timeout_ms`. The first failure or timeout aborts the remaining notes.
	///
	/// Writes are not transactional across the two stores. A note whose semantic write fails stays
	/// in the structured store, and retrying the request inserts it again under a new note id.
	pub async fn ingest_at(&self, req: IngestRequest, now: OffsetDateTime) -> Result<IngestResponse> {
		require_non_blank("caller_id", &req.caller_id)?;

		if req.notes.is_empty() {
			return Err(Error::InvalidRequest {
				message: "notes must contain at least one note.".to_string(),
			});
		}

		for (idx, note) in req.notes.iter().enumerate() {
			require_non_blank(&format!("notes[{idx}].raw_text"), &note.raw_text)?;
			require_non_blank(&format!("notes[{idx}].formatted_text"), &note.formatted_text)?;
		}

		let IngestRequest { caller_id, notes } = req;
		let mut stored = Vec::with_capacity(notes.len());

		for note in notes {
			let record = NoteRecord::from_new(&caller_id, note, now);

			self.bounded(RetrievalSource::Structured, self.stores.notes.insert_note(&record)).await?;
			self.bounded(RetrievalSource::Semantic, self.stores.memories.write(&record)).await?;

			tracing::info!(
				namespace = %record.namespace,
				note_id = %record.note_id,
				intent = record.intent.as_str(),
				"Note ingested."
			);

			stored.push(record);
		}

		Ok(IngestResponse { notes: stored })
	}

	/// Case-insensitive substring search over raw note text.
	pub async fn search_notes(&self, req: SearchNotesRequest) -> Result<SearchNotesResponse> {
		require_non_blank("caller_id", &req.caller_id)?;
		require_non_blank("text", &req.text)?;

		let limit = self.resolve_limit(req.limit)?;
		let notes = self
			.bounded(
				RetrievalSource::Structured,
				self.stores.notes.search_text(&req.caller_id, req.text.trim(), limit),
			)
			.await?;

		Ok(SearchNotesResponse { notes })
	}
}
