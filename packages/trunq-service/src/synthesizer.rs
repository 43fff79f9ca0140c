use serde_json::Value;

use crate::{FusedItem, RetrievalSource, TrunqService};

impl TrunqService {
	/// Writes a conversational answer from both sources. Returns `None` when the model call
	/// fails or comes back empty, which callers must tell apart from an answer about no notes.
	pub async fn synthesize(&self, question: &str, items: &[FusedItem]) -> Option<String> {
		let messages = build_synthesis_messages(question, items);

		match self.providers.completion.complete(&self.cfg.providers.llm_synthesizer, &messages).await
		{
			Ok(answer) if !answer.trim().is_empty() => Some(answer.trim().to_string()),
			Ok(_) => {
				tracing::error!("Answer synthesis returned empty content.");

				None
			},
			Err(err) => {
				tracing::error!(error = %err, "Answer synthesis failed.");

				None
			},
		}
	}
}

pub fn build_synthesis_messages(question: &str, items: &[FusedItem]) -> Vec<Value> {
	let structured_context = render_context(items, RetrievalSource::Structured);
	let semantic_context = render_context(items, RetrievalSource::Semantic);
	let prompt = format!(
		"You are a helpful assistant answering questions from a user's personal notes.\n\n\
User asked: \"{question}\"\n\n\
Structured notes from the database:\n{structured_context}\n\n\
Contextual memories:\n{semantic_context}\n\n\
Based on both sources above, give a clear, concise answer to the question.\n\
- Combine information from both sources.\n\
- Deduplicate items that appear in both.\n\
- Use natural, conversational language.\n\
- If the question is about tasks or reminders, format the answer as a numbered list.",
	);

	vec![serde_json::json!({ "role": "user", "content": prompt })]
}

fn render_context(items: &[FusedItem], source: RetrievalSource) -> String {
	let lines = items
		.iter()
		.filter(|item| item.source == source)
		.map(|item| match item.intent {
			Some(intent) => format!("- [{intent}] {}", item.text),
			None => format!("- {}", item.text),
		})
		.collect::<Vec<_>>();

	if lines.is_empty() { "(none)".to_string() } else { lines.join("\n") }
}
