use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	/// Turns a question into a retrieval intent. Must answer with JSON.
	pub llm_analyzer: LlmProviderConfig,
	/// Writes the final conversational answer.
	pub llm_synthesizer: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Retrieval knobs. Every field has an explicit default so the section may be omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct Retrieval {
	/// Result count used when a request does not carry a limit.
	#[serde(default = "default_limit")]
	pub default_limit: u32,
	#[serde(default = "default_max_limit")]
	pub max_limit: u32,
	/// Fixed top-k for plain similarity search.
	#[serde(default = "default_semantic_top_k")]
	pub semantic_top_k: u32,
	/// Filtered listing fetches `limit * listing_headroom` raw candidates.
	#[serde(default = "default_listing_headroom")]
	pub listing_headroom: u32,
	/// Upper bound for a single store read before it counts as unavailable.
	#[serde(default = "default_source_timeout_ms")]
	pub source_timeout_ms: u64,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			default_limit: default_limit(),
			max_limit: default_max_limit(),
			semantic_top_k: default_semantic_top_k(),
			listing_headroom: default_listing_headroom(),
			source_timeout_ms: default_source_timeout_ms(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
}

fn default_limit() -> u32 {
	10
}

fn default_max_limit() -> u32 {
	50
}

fn default_semantic_top_k() -> u32 {
	5
}

fn default_listing_headroom() -> u32 {
	3
}

fn default_source_timeout_ms() -> u64 {
	10_000
}
