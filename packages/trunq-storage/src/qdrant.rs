//! The semantic memory collection.
//!
//! Each note is mirrored as one point with a `dense` named vector and a flat payload. Filtered
//! listings translate a [`FilterExpr`] into a Qdrant [`Filter`], scoped to the caller namespace.

pub const DENSE_VECTOR_NAME: &str = "dense";
pub const NAMESPACE_KEY: &str = "namespace";

use std::collections::HashMap;

use qdrant_client::{
	Payload,
	qdrant::{
		Condition, CreateCollectionBuilder, Distance, Filter, PointId, PointStruct, Query,
		QueryPointsBuilder, Range, ScrollPointsBuilder, UpsertPointsBuilder, Value,
		VectorParamsBuilder, Vector, VectorsConfigBuilder, point_id::PointIdOptions, value::Kind,
	},
};
use serde_json::Value as JsonValue;
use time::format_description::well_known::Rfc3339;

use trunq_domain::{FilterExpr, INTENT_KEY, Intent, NumericOp, SCHEDULED_FOR_KEY};

use crate::{
	Error, Result,
	models::{ListedMemory, MemoryPoint, ScoredMemory},
};

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &trunq_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Creates the collection with a cosine `dense` vector if it does not exist yet.
	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(self.collection.clone()).await? {
			return Ok(());
		}

		let mut vectors_config = VectorsConfigBuilder::default();

		vectors_config.add_named_vector_params(
			DENSE_VECTOR_NAME,
			VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
		);

		let builder =
			CreateCollectionBuilder::new(self.collection.clone()).vectors_config(vectors_config);

		self.client.create_collection(builder).await?;

		tracing::info!(collection = %self.collection, "Created memory collection.");

		Ok(())
	}

	pub async fn upsert_memory(&self, memory: &MemoryPoint, vector: Vec<f32>) -> Result<()> {
		if vector.len() != self.vector_dim as usize {
			return Err(Error::DimensionMismatch {
				expected: self.vector_dim,
				actual: vector.len(),
			});
		}

		let payload = Payload::from(memory_payload(memory)?);
		let mut vector_map = HashMap::new();

		vector_map.insert(DENSE_VECTOR_NAME.to_string(), Vector::from(vector));

		let point = PointStruct::new(memory.memory_id.to_string(), vector_map, payload);
		let upsert = UpsertPointsBuilder::new(self.collection.clone(), vec![point]).wait(true);

		self.client.upsert_points(upsert).await?;

		Ok(())
	}

	/// Lists memories in `namespace` matching `filter`, in collection order.
	pub async fn scroll_memories(
		&self,
		namespace: &str,
		filter: &FilterExpr,
		limit: u32,
	) -> Result<Vec<ListedMemory>> {
		let scoped = namespaced_filter(namespace, Some(filter));
		let request = ScrollPointsBuilder::new(self.collection.clone())
			.filter(scoped)
			.limit(limit)
			.with_payload(true);
		let response = self.client.scroll(request).await?;

		Ok(response
			.result
			.into_iter()
			.map(|point| listed_memory(point.id.as_ref(), &point.payload))
			.collect())
	}

	/// Nearest-neighbour search in `namespace`. Hits carry only their text and score.
	pub async fn search_memories(
		&self,
		namespace: &str,
		vector: Vec<f32>,
		top_k: u32,
	) -> Result<Vec<ScoredMemory>> {
		let request = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.using(DENSE_VECTOR_NAME)
			.filter(namespaced_filter(namespace, None))
			.limit(u64::from(top_k))
			.with_payload(true);
		let response = self.client.query(request).await?;

		Ok(response
			.result
			.into_iter()
			.filter_map(|point| {
				payload_string(&point.payload, "content")
					.map(|memory| ScoredMemory { memory, score: point.score })
			})
			.collect())
	}
}

/// Translates a filter expression into a Qdrant condition. Negated leaves are wrapped in a
/// `must_not` filter.
pub fn to_qdrant_condition(expr: &FilterExpr) -> Condition {
	match expr {
		FilterExpr::And(operands) =>
			Condition::from(Filter::must(operands.iter().map(to_qdrant_condition))),
		FilterExpr::Or(operands) =>
			Condition::from(Filter::should(operands.iter().map(to_qdrant_condition))),
		FilterExpr::Metadata(cond) => {
			let leaf = Condition::matches(cond.key.as_str(), cond.value.clone());

			if cond.negate { Condition::from(Filter::must_not([leaf])) } else { leaf }
		},
		FilterExpr::Numeric(cond) => {
			let leaf = Condition::range(cond.key.as_str(), numeric_range(cond.op, cond.value));

			if cond.negate { Condition::from(Filter::must_not([leaf])) } else { leaf }
		},
	}
}

fn namespaced_filter(namespace: &str, expr: Option<&FilterExpr>) -> Filter {
	let mut conditions = vec![Condition::matches(NAMESPACE_KEY, namespace.to_string())];

	if let Some(expr) = expr {
		conditions.push(to_qdrant_condition(expr));
	}

	Filter::must(conditions)
}

fn numeric_range(op: NumericOp, value: i64) -> Range {
	let value = value as f64;

	match op {
		NumericOp::Gt => Range { gt: Some(value), ..Default::default() },
		NumericOp::Gte => Range { gte: Some(value), ..Default::default() },
		NumericOp::Lt => Range { lt: Some(value), ..Default::default() },
		NumericOp::Lte => Range { lte: Some(value), ..Default::default() },
		NumericOp::Eq => Range { gte: Some(value), lte: Some(value), ..Default::default() },
	}
}

fn memory_payload(memory: &MemoryPoint) -> Result<HashMap<String, Value>> {
	let date = memory.date.format(&Rfc3339).map_err(|err| Error::CorruptNote {
		message: format!("note {} has an unformattable date: {err}", memory.note_id),
	})?;
	let mut payload = HashMap::new();

	payload.insert(NAMESPACE_KEY.to_string(), Value::from(memory.namespace.clone()));
	payload.insert("note_id".to_string(), Value::from(memory.note_id.to_string()));
	payload.insert("content".to_string(), Value::from(memory.content.clone()));
	payload.insert("title".to_string(), Value::from(memory.title.clone()));
	payload.insert(INTENT_KEY.to_string(), Value::from(memory.intent.as_str().to_string()));
	payload.insert(
		"tags".to_string(),
		Value::from(JsonValue::from(memory.tags.iter().cloned().collect::<Vec<_>>())),
	);
	payload.insert("raw_text".to_string(), Value::from(memory.raw_text.clone()));
	payload.insert("date".to_string(), Value::from(date));
	payload.insert("has_deadline".to_string(), Value::from(JsonValue::Bool(memory.has_deadline)));

	if let Some(scheduled_for) = memory.scheduled_for {
		payload.insert(SCHEDULED_FOR_KEY.to_string(), Value::from(scheduled_for));
	}

	Ok(payload)
}

fn listed_memory(id: Option<&PointId>, payload: &HashMap<String, Value>) -> ListedMemory {
	ListedMemory {
		memory_id: id.and_then(point_id_to_uuid),
		summary: payload_string(payload, "content").unwrap_or_default(),
		intent: payload_string(payload, INTENT_KEY).and_then(|raw| raw.parse::<Intent>().ok()),
		tags: payload_strings(payload, "tags"),
		scheduled_for: payload_i64(payload, SCHEDULED_FOR_KEY),
	}
}

fn point_id_to_uuid(point_id: &PointId) -> Option<uuid::Uuid> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => uuid::Uuid::parse_str(id).ok(),
		_ => None,
	}
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	match &payload.get(key)?.kind {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		_ => None,
	}
}

fn payload_strings(payload: &HashMap<String, Value>, key: &str) -> Vec<String> {
	let Some(Kind::ListValue(list)) = payload.get(key).and_then(|value| value.kind.as_ref()) else {
		return Vec::new();
	};

	list.values
		.iter()
		.filter_map(|value| match &value.kind {
			Some(Kind::StringValue(text)) => Some(text.clone()),
			_ => None,
		})
		.collect()
}

fn payload_i64(payload: &HashMap<String, Value>, key: &str) -> Option<i64> {
	match &payload.get(key)?.kind {
		Some(Kind::IntegerValue(value)) => Some(*value),
		Some(Kind::DoubleValue(value)) =>
			if value.fract() == 0.0 {
				Some(*value as i64)
			} else {
				None
			},
		_ => None,
	}
}
