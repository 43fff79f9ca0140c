//! Dual-source retrieval.
//!
//! The strategy is picked from the intent: a valid temporal range means a filtered listing over
//! both stores, anything else means a similarity search over the semantic store. Every store call
//! is bounded by `retrieval.source_timeout_ms`, and a failing or slow store contributes nothing
//! instead of failing the query.

use std::time::Duration;

use serde::Serialize;

use crate::{BoxFuture, Error, Filters, Result, RetrievalSource, TrunqService};
use trunq_domain::{IntentMembership, NoteRecord, RetrievalIntent};
use trunq_storage::models::{ListedMemory, ScoredMemory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
	FilteredListing,
	SemanticSearch,
}
impl Strategy {
	pub fn for_intent(intent: &RetrievalIntent) -> Self {
		if intent.temporal_range.is_some() { Self::FilteredListing } else { Self::SemanticSearch }
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::FilteredListing => "filtered_listing",
			Self::SemanticSearch => "semantic_search",
		}
	}
}

/// Semantic store output. Listings carry metadata; similarity hits carry text only.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticHits {
	Listed(Vec<ListedMemory>),
	Scored(Vec<ScoredMemory>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedSources {
	pub strategy: Strategy,
	pub structured: Vec<NoteRecord>,
	pub semantic: SemanticHits,
}

impl TrunqService {
	pub async fn retrieve_sources(
		&self,
		namespace: &str,
		intent: &RetrievalIntent,
		filters: &Filters,
		limit: u32,
	) -> RetrievedSources {
		let strategy = Strategy::for_intent(intent);

		tracing::info!(namespace, strategy = strategy.as_str(), "Retrieval strategy selected.");

		match strategy {
			Strategy::FilteredListing => {
				let candidates = limit.saturating_mul(self.cfg.retrieval.listing_headroom);
				let semantic = async {
					match filters.semantic.as_ref() {
						Some(filter) =>
							self.guarded(
								RetrievalSource::Semantic,
								self.stores.memories.list(namespace, filter, candidates),
							)
							.await,
						None => Ok(Vec::new()),
					}
				};
				let (structured, semantic) = tokio::join!(
					self.read_structured(namespace, &filters.structured, candidates),
					semantic,
				);

				RetrievedSources {
					strategy,
					structured,
					semantic: SemanticHits::Listed(degrade(RetrievalSource::Semantic, semantic)),
				}
			},
			Strategy::SemanticSearch => RetrievedSources {
				strategy,
				structured: Vec::new(),
				semantic: SemanticHits::Scored(
					self.search_semantic(namespace, &intent.semantic_query).await,
				),
			},
		}
	}

	/// Category-membership read of the structured store. Failures degrade to an empty list.
	///
	/// No temporal predicate is applied here, even under a filtered listing; only the semantic
	/// listing is time-bounded.
	pub(crate) async fn read_structured(
		&self,
		namespace: &str,
		membership: &IntentMembership,
		limit: u32,
	) -> Vec<NoteRecord> {
		let result = self
			.guarded(
				RetrievalSource::Structured,
				self.stores.notes.list_by_intents(namespace, membership, limit),
			)
			.await;

		degrade(RetrievalSource::Structured, result)
	}

	/// Top-k similarity search of the semantic store. Failures degrade to an empty list.
	pub(crate) async fn search_semantic(&self, namespace: &str, query: &str) -> Vec<ScoredMemory> {
		let result = self
			.guarded(
				RetrievalSource::Semantic,
				self.stores.memories.search(namespace, query, self.cfg.retrieval.semantic_top_k),
			)
			.await;

		degrade(RetrievalSource::Semantic, result)
	}

	/// Bounds one store call by `retrieval.source_timeout_ms`. The call's own error is returned
	/// unchanged.
	pub(crate) async fn bounded<T>(
		&self,
		store: RetrievalSource,
		call: BoxFuture<'_, Result<T>>,
	) -> Result<T> {
		let timeout_ms = self.cfg.retrieval.source_timeout_ms;

		tokio::time::timeout(Duration::from_millis(timeout_ms), call)
			.await
			.map_err(|_| Error::Timeout { store, timeout_ms })?
	}

	async fn guarded<T>(&self, store: RetrievalSource, call: BoxFuture<'_, Result<T>>) -> Result<T> {
		match self.bounded(store, call).await {
			Ok(value) => Ok(value),
			Err(err @ Error::Timeout { .. }) => Err(err),
			Err(err) => Err(Error::SourceUnavailable { store, message: err.to_string() }),
		}
	}
}

fn degrade<T>(store: RetrievalSource, result: Result<Vec<T>>) -> Vec<T> {
	match result {
		Ok(items) => items,
		Err(err) => {
			tracing::warn!(
				source = store.as_str(),
				error = %err,
				"Retrieval source failed. Continuing without its results."
			);

			Vec::new()
		},
	}
}
