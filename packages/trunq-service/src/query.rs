//! Question-answering entry points.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
	FusedItem, Result, SemanticHits, Strategy, TrunqService, build_filters, fuse,
	require_non_blank,
};
use trunq_domain::RetrievalIntent;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrieveRequest {
	pub caller_id: String,
	pub question: String,
	#[serde(default)]
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RetrieveResponse {
	pub intent: RetrievalIntent,
	pub strategy: Strategy,
	pub items: Vec<FusedItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnswerRequest {
	pub caller_id: String,
	pub question: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnswerResponse {
	pub intent: RetrievalIntent,
	/// `None` when synthesis failed.
	pub answer: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryRequest {
	pub caller_id: String,
	pub question: String,
	#[serde(default)]
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct QueryResponse {
	pub intent: RetrievalIntent,
	pub strategy: Strategy,
	pub items: Vec<FusedItem>,
	/// Present only when the intent asked for synthesis and it succeeded.
	pub answer: Option<String>,
}

impl TrunqService {
	/// Returns fused records without synthesizing.
	pub async fn retrieve(&self, req: RetrieveRequest) -> Result<RetrieveResponse> {
		self.retrieve_at(req, OffsetDateTime::now_utc()).await
	}

	pub async fn retrieve_at(
		&self,
		req: RetrieveRequest,
		now: OffsetDateTime,
	) -> Result<RetrieveResponse> {
		let (intent, strategy, items) =
			self.run_retrieval(&req.caller_id, &req.question, req.limit, now).await?;

		Ok(RetrieveResponse { intent, strategy, items })
	}

	/// Always synthesizes from category-matched structured notes and the semantic top-k.
	pub async fn answer(&self, req: AnswerRequest) -> Result<AnswerResponse> {
		self.answer_at(req, OffsetDateTime::now_utc()).await
	}

	pub async fn answer_at(&self, req: AnswerRequest, now: OffsetDateTime) -> Result<AnswerResponse> {
		require_non_blank("caller_id", &req.caller_id)?;
		require_non_blank("question", &req.question)?;

		let namespace = req.caller_id.as_str();
		let limit = self.cfg.retrieval.default_limit;
		let intent = self.analyze_at(&req.question, now).await;
		let filters = build_filters(&intent);
		let (structured, semantic) = tokio::join!(
			self.read_structured(namespace, &filters.structured, limit),
			self.search_semantic(namespace, &intent.semantic_query),
		);
		let items = fuse(&structured, &SemanticHits::Scored(semantic), limit as usize);
		let answer = self.synthesize(&req.question, &items).await;

		Ok(AnswerResponse { intent, answer })
	}

	/// Retrieves, then synthesizes only if the analyzed intent requires it.
	pub async fn query(&self, req: QueryRequest) -> Result<QueryResponse> {
		self.query_at(req, OffsetDateTime::now_utc()).await
	}

	pub async fn query_at(&self, req: QueryRequest, now: OffsetDateTime) -> Result<QueryResponse> {
		let (intent, strategy, items) =
			self.run_retrieval(&req.caller_id, &req.question, req.limit, now).await?;
		let answer = if intent.requires_synthesis {
			self.synthesize(&req.question, &items).await
		} else {
			None
		};

		Ok(QueryResponse { intent, strategy, items, answer })
	}

	async fn run_retrieval(
		&self,
		caller_id: &str,
		question: &str,
		limit: Option<u32>,
		now: OffsetDateTime,
	) -> Result<(RetrievalIntent, Strategy, Vec<FusedItem>)> {
		require_non_blank("caller_id", caller_id)?;
		require_non_blank("question", question)?;

		let limit = self.resolve_limit(limit)?;
		let intent = self.analyze_at(question, now).await;
		let filters = build_filters(&intent);
		let sources = self.retrieve_sources(caller_id, &intent, &filters, limit).await;
		let items = fuse(&sources.structured, &sources.semantic, limit as usize);

		Ok((intent, sources.strategy, items))
	}
}
