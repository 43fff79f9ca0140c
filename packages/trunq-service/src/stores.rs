//! Default store implementations over Postgres and Qdrant.

use std::sync::Arc;

use crate::{BoxFuture, EmbeddingProvider, Error, MemoryStore, NoteStore, Result};
use trunq_config::EmbeddingProviderConfig;
use trunq_domain::{FilterExpr, IntentMembership, NoteRecord};
use trunq_storage::{
	db::Db,
	models::{ListedMemory, MemoryPoint, ScoredMemory},
	qdrant::QdrantStore,
	queries,
};

impl NoteStore for Db {
	fn insert_note<'a>(&'a self, note: &'a NoteRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { Ok(queries::insert_note(self, note).await?) })
	}

	fn list_by_intents<'a>(
		&'a self,
		namespace: &'a str,
		membership: &'a IntentMembership,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<NoteRecord>>> {
		Box::pin(async move {
			Ok(queries::list_notes_by_intents(self, namespace, membership, limit).await?)
		})
	}

	fn search_text<'a>(
		&'a self,
		namespace: &'a str,
		text: &'a str,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<NoteRecord>>> {
		Box::pin(async move { Ok(queries::search_notes_text(self, namespace, text, limit).await?) })
	}
}

/// Semantic store backed by a Qdrant collection. Text is embedded before writes and searches.
pub struct QdrantMemoryStore {
	qdrant: QdrantStore,
	embedding: Arc<dyn EmbeddingProvider>,
	embedding_cfg: EmbeddingProviderConfig,
}
impl QdrantMemoryStore {
	pub fn new(
		qdrant: QdrantStore,
		embedding: Arc<dyn EmbeddingProvider>,
		embedding_cfg: EmbeddingProviderConfig,
	) -> Self {
		Self { qdrant, embedding, embedding_cfg }
	}

	async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
		let vectors = self.embedding.embed(&self.embedding_cfg, &[text.to_string()]).await?;

		vectors.into_iter().next().ok_or_else(|| Error::Provider {
			message: "Embedding provider returned no vectors.".to_string(),
		})
	}
}

impl MemoryStore for QdrantMemoryStore {
	fn write<'a>(&'a self, note: &'a NoteRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let point = MemoryPoint::from_note(note);
			let vector = self.embed_one(&point.content).await?;

			self.qdrant.upsert_memory(&point, vector).await?;

			Ok(())
		})
	}

	fn search<'a>(
		&'a self,
		namespace: &'a str,
		query: &'a str,
		top_k: u32,
	) -> BoxFuture<'a, Result<Vec<ScoredMemory>>> {
		Box::pin(async move {
			let vector = self.embed_one(query).await?;

			Ok(self.qdrant.search_memories(namespace, vector, top_k).await?)
		})
	}

	fn list<'a>(
		&'a self,
		namespace: &'a str,
		filter: &'a FilterExpr,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<ListedMemory>>> {
		Box::pin(async move { Ok(self.qdrant.scroll_memories(namespace, filter, limit).await?) })
	}
}
