pub mod analyzer;
pub mod filter;
pub mod fuser;
pub mod notes;
pub mod query;
pub mod retriever;
pub mod stores;
pub mod synthesizer;

mod error;

pub use error::{Error, Result, RetrievalSource};
pub use filter::{Filters, build_filters};
pub use fuser::{FusedItem, ItemStatus, fuse};
pub use notes::{IngestRequest, IngestResponse, SearchNotesRequest, SearchNotesResponse};
pub use query::{
	AnswerRequest, AnswerResponse, QueryRequest, QueryResponse, RetrieveRequest, RetrieveResponse,
};
pub use retriever::{RetrievedSources, SemanticHits, Strategy};
pub use stores::QdrantMemoryStore;

use std::{future::Future, pin::Pin, sync::Arc};

use reqwest::Client;
use serde_json::Value;

use trunq_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use trunq_domain::{FilterExpr, IntentMembership, NoteRecord};
use trunq_providers::{completion, embedding, extractor};
use trunq_storage::{
	db::Db,
	models::{ListedMemory, ScoredMemory},
	qdrant::QdrantStore,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Language model call that must answer with a JSON object.
pub trait ExtractorProvider
where
	Self: Send + Sync,
{
	fn extract<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<Value>>;
}

/// Language model call that answers in plain text.
pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>>;
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

/// The structured store. Notes are queried by category membership or raw text substring.
pub trait NoteStore
where
	Self: Send + Sync,
{
	fn insert_note<'a>(&'a self, note: &'a NoteRecord) -> BoxFuture<'a, Result<()>>;

	fn list_by_intents<'a>(
		&'a self,
		namespace: &'a str,
		membership: &'a IntentMembership,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<NoteRecord>>>;

	fn search_text<'a>(
		&'a self,
		namespace: &'a str,
		text: &'a str,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<NoteRecord>>>;
}

/// The semantic memory store.
pub trait MemoryStore
where
	Self: Send + Sync,
{
	fn write<'a>(&'a self, note: &'a NoteRecord) -> BoxFuture<'a, Result<()>>;

	fn search<'a>(
		&'a self,
		namespace: &'a str,
		query: &'a str,
		top_k: u32,
	) -> BoxFuture<'a, Result<Vec<ScoredMemory>>>;

	fn list<'a>(
		&'a self,
		namespace: &'a str,
		filter: &'a FilterExpr,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<ListedMemory>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub extractor: Arc<dyn ExtractorProvider>,
	pub completion: Arc<dyn CompletionProvider>,
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(
		extractor: Arc<dyn ExtractorProvider>,
		completion: Arc<dyn CompletionProvider>,
		embedding: Arc<dyn EmbeddingProvider>,
	) -> Self {
		Self { extractor, completion, embedding }
	}

	/// HTTP providers sharing one long-lived client.
	pub fn http() -> Result<Self> {
		let provider = Arc::new(DefaultProviders { client: trunq_providers::http_client()? });

		Ok(Self { extractor: provider.clone(), completion: provider.clone(), embedding: provider })
	}
}

#[derive(Clone)]
pub struct Stores {
	pub notes: Arc<dyn NoteStore>,
	pub memories: Arc<dyn MemoryStore>,
}

pub struct TrunqService {
	pub cfg: Config,
	pub providers: Providers,
	pub stores: Stores,
}
impl TrunqService {
	pub fn new(cfg: Config, db: Db, qdrant: QdrantStore) -> Result<Self> {
		let providers = Providers::http()?;
		let memories = QdrantMemoryStore::new(
			qdrant,
			providers.embedding.clone(),
			cfg.providers.embedding.clone(),
		);
		let stores = Stores { notes: Arc::new(db), memories: Arc::new(memories) };

		Ok(Self { cfg, providers, stores })
	}

	pub fn with_components(cfg: Config, providers: Providers, stores: Stores) -> Self {
		Self { cfg, providers, stores }
	}

	/// Resolves an optional caller limit against the configured default and ceiling.
	pub(crate) fn resolve_limit(&self, limit: Option<u32>) -> Result<u32> {
		let retrieval = &self.cfg.retrieval;
		let limit = limit.unwrap_or(retrieval.default_limit);

		if limit == 0 || limit > retrieval.max_limit {
			return Err(Error::InvalidRequest {
				message: format!("limit must be between 1 and {}.", retrieval.max_limit),
			});
		}

		Ok(limit)
	}
}

struct DefaultProviders {
	client: Client,
}

impl ExtractorProvider for DefaultProviders {
	fn extract<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move { Ok(extractor::extract(&self.client, cfg, messages).await?) })
	}
}

impl CompletionProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(completion::complete(&self.client, cfg, messages).await?) })
	}
}

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(&self.client, cfg, texts).await?) })
	}
}

pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<()> {
	if value.trim().is_empty() {
		return Err(Error::InvalidRequest { message: format!("{field} must be non-empty.") });
	}

	Ok(())
}
