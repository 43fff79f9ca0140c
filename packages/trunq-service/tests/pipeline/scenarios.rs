use serde_json::json;
use time::macros::datetime;

use super::suite::{Harness, MemoryCall, StoreMode};
use trunq_domain::{FilterExpr, INTENT_KEY, Intent, NumericOp, SCHEDULED_FOR_KEY};
use trunq_service::{
	AnswerRequest, Error, QueryRequest, RetrievalSource, RetrieveRequest, Strategy,
};

fn today_analysis() -> serde_json::Value {
	json!({
		"relevant_intents": ["tasks", "reminder", "schedules"],
		"temporal_range_start": "2025-10-26T00:00:00+00:00",
		"temporal_range_end": "2025-10-26T23:59:59+00:00",
		"semantic_query": "actionable tasks and reminders for today",
		"requires_synthesis": true
	})
}

fn avoiding_analysis() -> serde_json::Value {
	json!({
		"relevant_intents": ["reflection", "decisions", "tasks"],
		"temporal_range_start": null,
		"temporal_range_end": null,
		"semantic_query": "things user is avoiding or procrastinating",
		"requires_synthesis": true
	})
}

fn retrieve(question: &str) -> RetrieveRequest {
	RetrieveRequest { caller_id: "alice".to_string(), question: question.to_string(), limit: None }
}

fn seed_day(harness: &Harness) {
	let seeds = [
		("alice", "Dentist at 10am", Intent::Schedules, datetime!(2025-10-26 10:00 UTC)),
		("alice", "Pay rent", Intent::Tasks, datetime!(2025-10-27 09:00 UTC)),
		("alice", "Brainstorm app names", Intent::Ideas, datetime!(2025-10-26 12:00 UTC)),
		("bob", "Bob's standup", Intent::Tasks, datetime!(2025-10-26 09:00 UTC)),
	];

	for (namespace, text, intent, scheduled_for) in seeds {
		harness.seed(namespace, text, intent, Some(scheduled_for));
	}
}

#[tokio::test]
async fn today_question_runs_filtered_listing_with_combined_filter() {
	let harness = Harness::builder().analysis(today_analysis()).build();

	seed_day(&harness);

	let response = harness
		.service
		.retrieve_at(retrieve("What do I need to do today?"), datetime!(2025-10-26 08:00 UTC))
		.await
		.expect("retrieve failed");
	let range = response.intent.temporal_range.expect("range missing");

	assert_eq!(response.intent.relevant_intents, vec![
		Intent::Tasks,
		Intent::Reminder,
		Intent::Schedules
	]);
	assert_eq!(range.start(), datetime!(2025-10-26 00:00:00 UTC));
	assert_eq!(range.end(), datetime!(2025-10-26 23:59:59 UTC));
	assert_eq!(response.strategy, Strategy::FilteredListing);

	let expected_filter = FilterExpr::And(vec![
		FilterExpr::Or(vec![
			FilterExpr::equals(INTENT_KEY, "tasks"),
			FilterExpr::equals(INTENT_KEY, "reminder"),
			FilterExpr::equals(INTENT_KEY, "schedules"),
		]),
		FilterExpr::numeric(SCHEDULED_FOR_KEY, NumericOp::Gt, 1_761_436_800),
		FilterExpr::numeric(SCHEDULED_FOR_KEY, NumericOp::Lt, 1_761_523_199),
	]);

	assert_eq!(harness.memories.calls(), vec![MemoryCall::List {
		namespace: "alice".to_string(),
		filter: expected_filter,
		limit: 30,
	}]);

	let structured = response
		.items
		.iter()
		.filter(|item| item.source == RetrievalSource::Structured)
		.map(|item| item.text.as_str())
		.collect::<Vec<_>>();
	let semantic = response
		.items
		.iter()
		.filter(|item| item.source == RetrievalSource::Semantic)
		.collect::<Vec<_>>();

	// The structured store is queried by category only.
	assert_eq!(structured, vec!["Dentist at 10am", "Pay rent"]);
	assert_eq!(semantic.len(), 1);
	assert_eq!(semantic[0].text, "Dentist at 10am");
	assert_eq!(semantic[0].intent, Some(Intent::Schedules));
	assert_eq!(semantic[0].timestamp, Some(datetime!(2025-10-26 10:00 UTC)));
}

#[tokio::test]
async fn timeless_question_runs_semantic_search_without_metadata() {
	let harness = Harness::builder().analysis(avoiding_analysis()).build();

	for n in 0..7 {
		harness.seed("alice", &format!("Avoiding chore {n}"), Intent::Reflection, None);
	}

	let response = harness
		.service
		.retrieve(retrieve("What have I been avoiding?"))
		.await
		.expect("retrieve failed");

	assert!(response.intent.temporal_range.is_none());
	assert_eq!(response.strategy, Strategy::SemanticSearch);
	assert_eq!(harness.memories.calls(), vec![MemoryCall::Search {
		namespace: "alice".to_string(),
		query: "things user is avoiding or procrastinating".to_string(),
		top_k: 5,
	}]);
	assert!(harness.notes.calls().is_empty());
	assert_eq!(response.items.len(), 5);
	assert!(response.items.iter().all(|item| {
		item.intent.is_none() && item.tags.is_empty() && item.timestamp.is_none()
	}));
}

#[tokio::test]
async fn structured_store_failure_degrades_to_semantic_results() {
	let harness =
		Harness::builder().analysis(today_analysis()).notes_mode(StoreMode::Failing).build();

	seed_day(&harness);

	let response = harness
		.service
		.retrieve_at(retrieve("What do I need to do today?"), datetime!(2025-10-26 08:00 UTC))
		.await
		.expect("a failing store must not fail retrieval");

	assert_eq!(harness.notes.calls().len(), 1);
	assert!(response.items.iter().all(|item| item.source == RetrievalSource::Semantic));
	assert_eq!(response.items.len(), 1);
}

#[tokio::test]
async fn semantic_store_failure_keeps_structured_results() {
	let harness =
		Harness::builder().analysis(today_analysis()).memories_mode(StoreMode::Failing).build();

	seed_day(&harness);

	let response = harness
		.service
		.retrieve_at(retrieve("What do I need to do today?"), datetime!(2025-10-26 08:00 UTC))
		.await
		.expect("a failing store must not fail retrieval");

	assert_eq!(response.items.len(), 2);
	assert!(response.items.iter().all(|item| item.source == RetrievalSource::Structured));
}

#[tokio::test]
async fn hanging_store_times_out_as_source_failure() {
	let harness =
		Harness::builder().analysis(today_analysis()).notes_mode(StoreMode::Hanging).build();

	seed_day(&harness);

	let response = harness
		.service
		.retrieve_at(retrieve("What do I need to do today?"), datetime!(2025-10-26 08:00 UTC))
		.await
		.expect("a hanging store must not fail retrieval");

	assert_eq!(response.items.len(), 1);
	assert_eq!(response.items[0].source, RetrievalSource::Semantic);
}

#[tokio::test]
async fn synthesis_failure_yields_no_answer() {
	let harness = Harness::builder().analysis(avoiding_analysis()).build();

	harness.seed("alice", "Avoiding taxes", Intent::Reflection, None);

	let response = harness
		.service
		.answer(AnswerRequest {
			caller_id: "alice".to_string(),
			question: "What have I been avoiding?".to_string(),
		})
		.await
		.expect("answer failed");

	assert_eq!(response.answer, None);
	assert_eq!(harness.completion.prompts().len(), 1);
}

#[tokio::test]
async fn answer_with_no_matching_notes_is_still_an_answer() {
	let harness = Harness::builder()
		.analysis(avoiding_analysis())
		.answer("  I could not find anything you are avoiding.  ")
		.build();
	let response = harness
		.service
		.answer(AnswerRequest {
			caller_id: "alice".to_string(),
			question: "What have I been avoiding?".to_string(),
		})
		.await
		.expect("answer failed");

	assert_eq!(response.answer.as_deref(), Some("I could not find anything you are avoiding."));
}

#[tokio::test]
async fn answer_combines_structured_and_semantic_context() {
	let harness = Harness::builder().analysis(avoiding_analysis()).answer("1. Taxes").build();

	harness.seed("alice", "File taxes", Intent::Tasks, None);
	harness.seed("alice", "Dreading the tax form", Intent::Reflection, None);

	harness
		.service
		.answer(AnswerRequest {
			caller_id: "alice".to_string(),
			question: "What have I been avoiding?".to_string(),
		})
		.await
		.expect("answer failed");

	let calls = harness.memories.calls();
	let prompt = harness.completion.prompts().pop().expect("prompt missing");

	assert_eq!(harness.notes.calls().len(), 1);
	assert!(matches!(calls.as_slice(), [MemoryCall::Search { top_k: 5, .. }]));
	assert!(prompt.contains("Structured notes from the database:\n- [tasks] File taxes"));
	assert!(prompt.contains("Contextual memories:\n- File taxes\n- Dreading the tax form"));
}

#[tokio::test]
async fn analysis_failure_falls_back_to_action_like_categories() {
	let harness = Harness::builder().build();
	let question = "What do I need to do?";
	let response = harness.service.retrieve(retrieve(question)).await.expect("retrieve failed");

	assert_eq!(harness.extractor.count(), 1);
	assert_eq!(response.intent.relevant_intents, Intent::ACTION_LIKE.to_vec());
	assert!(response.intent.temporal_range.is_none());
	assert!(response.intent.requires_synthesis);
	assert_eq!(response.strategy, Strategy::SemanticSearch);
	assert_eq!(harness.memories.calls(), vec![MemoryCall::Search {
		namespace: "alice".to_string(),
		query: question.to_string(),
		top_k: 5,
	}]);
}

#[tokio::test]
async fn out_of_enumeration_category_falls_back() {
	let harness = Harness::builder()
		.analysis(json!({
			"relevant_intents": ["shopping"],
			"semantic_query": "groceries",
			"requires_synthesis": false
		}))
		.build();
	let response = harness.service.retrieve(retrieve("Groceries?")).await.expect("retrieve failed");

	assert_eq!(response.intent.relevant_intents, Intent::ACTION_LIKE.to_vec());
	assert_eq!(response.intent.semantic_query, "Groceries?");
}

#[tokio::test]
async fn malformed_range_bound_falls_back() {
	let harness = Harness::builder()
		.analysis(json!({
			"relevant_intents": ["ideas"],
			"temporal_range_start": "today",
			"temporal_range_end": "2025-10-26T23:59:59Z",
			"semantic_query": "ideas",
			"requires_synthesis": false
		}))
		.build();
	let response = harness.service.retrieve(retrieve("Ideas today?")).await.expect("retrieve failed");

	assert_eq!(response.intent.relevant_intents, Intent::ACTION_LIKE.to_vec());
	assert!(response.intent.temporal_range.is_none());
	assert!(response.intent.requires_synthesis);
	assert_eq!(response.intent.semantic_query, "Ideas today?");
}

#[tokio::test]
async fn semantic_search_returns_full_top_k_below_limit() {
	let harness = Harness::builder().analysis(avoiding_analysis()).build();

	for n in 0..7 {
		harness.seed("alice", &format!("Avoiding chore {n}"), Intent::Reflection, None);
	}

	let request = RetrieveRequest { limit: Some(2), ..retrieve("What have I been avoiding?") };
	let response = harness.service.retrieve(request).await.expect("retrieve failed");

	assert_eq!(response.strategy, Strategy::SemanticSearch);
	assert_eq!(harness.memories.calls(), vec![MemoryCall::Search {
		namespace: "alice".to_string(),
		query: "things user is avoiding or procrastinating".to_string(),
		top_k: 5,
	}]);
	assert_eq!(response.items.len(), 5);
}

#[tokio::test]
async fn inverted_range_behaves_as_no_range() {
	let harness = Harness::builder()
		.analysis(json!({
			"relevant_intents": ["tasks"],
			"temporal_range_start": "2025-10-27T00:00:00Z",
			"temporal_range_end": "2025-10-26T00:00:00Z",
			"semantic_query": "tasks",
			"requires_synthesis": false
		}))
		.build();
	let response = harness.service.retrieve(retrieve("Tasks?")).await.expect("retrieve failed");

	assert!(response.intent.temporal_range.is_none());
	assert_eq!(response.strategy, Strategy::SemanticSearch);
}

#[tokio::test]
async fn query_synthesizes_only_when_intent_asks() {
	let mut analysis = avoiding_analysis();

	analysis["requires_synthesis"] = json!(false);

	let raw = Harness::builder().analysis(analysis).answer("unused").build();

	raw.seed("alice", "Avoiding taxes", Intent::Reflection, None);

	let response = raw
		.service
		.query(QueryRequest {
			caller_id: "alice".to_string(),
			question: "What have I been avoiding?".to_string(),
			limit: Some(3),
		})
		.await
		.expect("query failed");

	assert_eq!(response.answer, None);
	assert_eq!(response.items.len(), 1);
	assert!(raw.completion.prompts().is_empty());

	let synthesized = Harness::builder().analysis(avoiding_analysis()).answer("Taxes.").build();
	let response = synthesized
		.service
		.query(QueryRequest {
			caller_id: "alice".to_string(),
			question: "What have I been avoiding?".to_string(),
			limit: None,
		})
		.await
		.expect("query failed");

	assert_eq!(response.answer.as_deref(), Some("Taxes."));
}

#[tokio::test]
async fn retrieval_is_namespace_isolated() {
	let harness = Harness::builder().analysis(avoiding_analysis()).build();

	harness.seed("bob", "Bob avoids email", Intent::Reflection, None);

	let response = harness
		.service
		.retrieve(retrieve("What have I been avoiding?"))
		.await
		.expect("retrieve failed");

	assert!(response.items.is_empty());
}

#[tokio::test]
async fn invalid_requests_are_rejected_before_analysis() {
	let harness = Harness::builder().analysis(avoiding_analysis()).build();

	for req in [
		RetrieveRequest { caller_id: " ".to_string(), question: "q".to_string(), limit: None },
		RetrieveRequest { caller_id: "alice".to_string(), question: "".to_string(), limit: None },
		RetrieveRequest { caller_id: "alice".to_string(), question: "q".to_string(), limit: Some(0) },
		RetrieveRequest {
			caller_id: "alice".to_string(),
			question: "q".to_string(),
			limit: Some(51),
		},
	] {
		let err = harness.service.retrieve(req).await.expect_err("expected invalid request");

		assert!(matches!(err, Error::InvalidRequest { .. }));
	}

	assert_eq!(harness.extractor.count(), 0);
}
