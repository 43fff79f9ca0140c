//! Query analysis: free-form question to [`RetrievalIntent`].

use serde::Deserialize;
use serde_json::Value;
use time::{
	OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::well_known::Rfc3339,
	macros::format_description,
};

use crate::{Error, Result, TrunqService};
use trunq_domain::{Intent, RetrievalIntent, TemporalRange};

#[derive(Debug, Deserialize)]
struct AnalysisOutput {
	relevant_intents: Vec<Intent>,
	#[serde(default)]
	temporal_range_start: Option<String>,
	#[serde(default)]
	temporal_range_end: Option<String>,
	#[serde(default)]
	semantic_query: Option<String>,
	#[serde(default = "default_requires_synthesis")]
	requires_synthesis: bool,
}

impl TrunqService {
	pub async fn analyze(&self, question: &str) -> RetrievalIntent {
		self.analyze_at(question, OffsetDateTime::now_utc()).await
	}

	/// Analyzes `question` as if the current time were `now`. Never fails: any model or parse
	/// error yields [`RetrievalIntent::fallback`].
	pub async fn analyze_at(&self, question: &str, now: OffsetDateTime) -> RetrievalIntent {
		let messages = build_analysis_messages(question, now);
		let raw = match self
			.providers
			.extractor
			.extract(&self.cfg.providers.llm_analyzer, &messages)
			.await
		{
			Ok(raw) => raw,
			Err(err) => {
				tracing::warn!(error = %err, "Query analysis failed. Using fallback intent.");

				return RetrievalIntent::fallback(question);
			},
		};

		match parse_analysis(question, raw) {
			Ok(intent) => intent,
			Err(err) => {
				tracing::warn!(error = %err, "Query analysis was unparsable. Using fallback intent.");

				RetrievalIntent::fallback(question)
			},
		}
	}
}

/// Parses the model's JSON. Categories outside the closed set or a bound that is not a timestamp
/// reject the whole analysis. A range with a missing or non-increasing bound is dropped.
pub fn parse_analysis(question: &str, raw: Value) -> Result<RetrievalIntent> {
	let output: AnalysisOutput = serde_json::from_value(raw).map_err(|err| Error::Provider {
		message: format!("Analysis output does not match the schema: {err}"),
	})?;
	let start = parse_bound("temporal_range_start", output.temporal_range_start.as_deref())?;
	let end = parse_bound("temporal_range_end", output.temporal_range_end.as_deref())?;

	Ok(RetrievalIntent::new(
		question,
		output.relevant_intents,
		TemporalRange::from_bounds(start, end),
		output.semantic_query,
		output.requires_synthesis,
	))
}

pub fn build_analysis_messages(question: &str, now: OffsetDateTime) -> Vec<Value> {
	let schema = serde_json::json!({
		"relevant_intents": ["string"],
		"temporal_range_start": "RFC3339 string or null",
		"temporal_range_end": "RFC3339 string or null",
		"semantic_query": "string",
		"requires_synthesis": "boolean"
	});
	let schema_text = serde_json::to_string_pretty(&schema).unwrap_or_else(|_| schema.to_string());
	let categories = Intent::ALL
		.iter()
		.map(|intent| format!("- \"{}\" - {}", intent.as_str(), intent.description()))
		.collect::<Vec<_>>()
		.join("\n");
	let system_prompt = "You analyze natural language questions about personal notes and extract \
structured information for retrieval. Output must be valid JSON only and must match the provided \
schema exactly. Do not add explanations or extra fields.";
	let user_prompt = format!(
		"Current date and time is {now}.\n\n\
The user's notes are categorized by these intent types:\n{categories}\n\n\
Extract from the question:\n\
1. relevant_intents: which intent categories apply (one or more).\n\
2. temporal_range_start and temporal_range_end: absolute instants bounding the time the question \
refers to, or null for both when it has no time context. They must differ.\n\
3. semantic_query: a refined search query for semantic memory retrieval.\n\
4. requires_synthesis: true if the answer needs a written summary, false for raw results.\n\n\
Examples:\n\
Question: \"What do I need to do today?\" (current date 2025-10-26)\n\
{{\"relevant_intents\": [\"tasks\", \"reminder\", \"schedules\"], \"temporal_range_start\": \"2025-10-26T00:00:00Z\", \"temporal_range_end\": \"2025-10-26T23:59:59Z\", \"semantic_query\": \"actionable tasks and reminders for today\", \"requires_synthesis\": true}}\n\
Question: \"What was I avoiding?\"\n\
{{\"relevant_intents\": [\"reflection\", \"decisions\", \"tasks\"], \"temporal_range_start\": null, \"temporal_range_end\": null, \"semantic_query\": \"things user is avoiding or procrastinating\", \"requires_synthesis\": true}}\n\
Question: \"Show me all my ideas about software\"\n\
{{\"relevant_intents\": [\"ideas\"], \"temporal_range_start\": null, \"temporal_range_end\": null, \"semantic_query\": \"software ideas and concepts\", \"requires_synthesis\": false}}\n\n\
Return JSON matching this exact schema:\n{schema}\n\
Question:\n{question}",
		now = format_now(now),
		categories = categories,
		schema = schema_text,
		question = question,
	);

	vec![
		serde_json::json!({ "role": "system", "content": system_prompt }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

fn format_now(now: OffsetDateTime) -> String {
	let utc = now.to_offset(UtcOffset::UTC);

	match utc.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]")) {
		Ok(formatted) => format!("{formatted} UTC"),
		Err(_) => utc.unix_timestamp().to_string(),
	}
}

fn parse_bound(field: &str, raw: Option<&str>) -> Result<Option<OffsetDateTime>> {
	let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
		return Ok(None);
	};

	parse_instant(raw).map(Some).ok_or_else(|| Error::Provider {
		message: format!("Analysis field {field} is not a timestamp: {raw:?}."),
	})
}

/// Accepts RFC 3339, or a bare `YYYY-MM-DDTHH:MM:SS` read as UTC.
fn parse_instant(raw: &str) -> Option<OffsetDateTime> {
	let raw = raw.trim();

	if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
		return Some(instant);
	}

	let bare = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

	PrimitiveDateTime::parse(raw, bare).ok().map(PrimitiveDateTime::assume_utc)
}

fn default_requires_synthesis() -> bool {
	true
}
