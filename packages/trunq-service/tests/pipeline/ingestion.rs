use time::macros::datetime;

use super::suite::{Harness, StoreMode};
use trunq_domain::{Intent, NewNote};
use trunq_service::{Error, IngestRequest, RetrievalSource, SearchNotesRequest};

fn crossfit() -> NewNote {
	NewNote {
		raw_text: "um so tomorrow crossfit at six".to_string(),
		formatted_text: "Go to CrossFit tomorrow at 6am".to_string(),
		title: "CrossFit Session".to_string(),
		intent: Intent::Schedules,
		tags: vec!["CrossFit".to_string(), "fitness".to_string()],
		scheduled_for: Some(datetime!(2025-10-27 06:00 UTC)),
		has_deadline: true,
	}
}

#[tokio::test]
async fn ingest_writes_both_stores_under_the_caller_namespace() {
	let harness = Harness::builder().build();
	let now = datetime!(2025-10-26 20:00 UTC);
	let response = harness
		.service
		.ingest_at(IngestRequest { caller_id: "alice".to_string(), notes: vec![crossfit()] }, now)
		.await
		.expect("ingest failed");

	assert_eq!(response.notes.len(), 1);

	let record = &response.notes[0];

	assert_eq!(record.namespace, "alice");
	assert_eq!(record.created_at, now);
	assert_eq!(harness.notes.notes(), response.notes);

	let memories = harness.memories.memories();

	assert_eq!(memories.len(), 1);
	assert_eq!(memories[0].namespace, "alice");
	assert_eq!(memories[0].content, "Go to CrossFit tomorrow at 6am");
	assert_eq!(memories[0].scheduled_for, Some(1_761_544_800));
}

#[tokio::test]
async fn ingest_surfaces_store_failures() {
	let harness = Harness::builder().memories_mode(StoreMode::Failing).build();
	let err = harness
		.service
		.ingest(IngestRequest { caller_id: "alice".to_string(), notes: vec![crossfit()] })
		.await
		.expect_err("expected a storage failure");

	assert!(matches!(err, Error::Storage { .. }));
}

#[tokio::test]
async fn hanging_semantic_write_times_out_after_structured_insert() {
	let harness = Harness::builder().memories_mode(StoreMode::Hanging).build();
	let err = harness
		.service
		.ingest(IngestRequest { caller_id: "alice".to_string(), notes: vec![crossfit()] })
		.await
		.expect_err("expected a timeout");

	assert!(matches!(err, Error::Timeout { store: RetrievalSource::Semantic, .. }));
	// The structured insert is already committed.
	assert_eq!(harness.notes.notes().len(), 1);
	assert!(harness.memories.memories().is_empty());
}

#[tokio::test]
async fn hanging_structured_insert_times_out_before_semantic_write() {
	let harness = Harness::builder().notes_mode(StoreMode::Hanging).build();
	let err = harness
		.service
		.ingest(IngestRequest { caller_id: "alice".to_string(), notes: vec![crossfit()] })
		.await
		.expect_err("expected a timeout");

	assert!(matches!(err, Error::Timeout { store: RetrievalSource::Structured, .. }));
	assert!(harness.memories.memories().is_empty());
}

#[tokio::test]
async fn ingest_rejects_empty_or_blank_notes() {
	let harness = Harness::builder().build();
	let empty = harness
		.service
		.ingest(IngestRequest { caller_id: "alice".to_string(), notes: Vec::new() })
		.await
		.expect_err("expected invalid request");
	let mut blank = crossfit();

	blank.formatted_text = "   ".to_string();

	let blank = harness
		.service
		.ingest(IngestRequest { caller_id: "alice".to_string(), notes: vec![crossfit(), blank] })
		.await
		.expect_err("expected invalid request");

	assert!(matches!(empty, Error::InvalidRequest { .. }));
	assert!(
		matches!(blank, Error::InvalidRequest { message } if message.contains("notes[1].formatted_text"))
	);
	assert!(harness.notes.notes().is_empty());
}

#[tokio::test]
async fn search_notes_matches_raw_text_case_insensitively() {
	let harness = Harness::builder().build();

	harness.seed("alice", "Call the Plumber", Intent::Tasks, None);
	harness.seed("alice", "Buy milk", Intent::Tasks, None);
	harness.seed("bob", "Plumber invoice", Intent::Note, None);

	let response = harness
		.service
		.search_notes(SearchNotesRequest {
			caller_id: "alice".to_string(),
			text: " PLUMBER ".to_string(),
			limit: None,
		})
		.await
		.expect("search failed");

	assert_eq!(response.notes.len(), 1);
	assert_eq!(response.notes[0].formatted_text, "Call the Plumber");
}
