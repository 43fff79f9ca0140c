use trunq_domain::{
	FilterExpr, INTENT_KEY, IntentMembership, NumericOp, RetrievalIntent, SCHEDULED_FOR_KEY,
};

/// Per-store filters compiled from one retrieval intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
	/// Category membership for the structured store.
	pub structured: IntentMembership,
	/// `OR` of category equalities, wrapped in `AND` with the scheduled-time bounds when the
	/// intent has a temporal range. `None` only when the intent names no category.
	pub semantic: Option<FilterExpr>,
}

pub fn build_filters(intent: &RetrievalIntent) -> Filters {
	let structured = IntentMembership { intents: intent.relevant_intents.clone() };

	if intent.relevant_intents.is_empty() {
		return Filters { structured, semantic: None };
	}

	let categories = FilterExpr::Or(
		intent
			.relevant_intents
			.iter()
			.map(|intent| FilterExpr::equals(INTENT_KEY, intent.as_str()))
			.collect(),
	);
	let semantic = match intent.temporal_range {
		Some(range) => FilterExpr::And(vec![
			categories,
			FilterExpr::numeric(SCHEDULED_FOR_KEY, NumericOp::Gt, range.start().unix_timestamp()),
			FilterExpr::numeric(SCHEDULED_FOR_KEY, NumericOp::Lt, range.end().unix_timestamp()),
		]),
		None => categories,
	};

	Filters { structured, semantic: Some(semantic) }
}
