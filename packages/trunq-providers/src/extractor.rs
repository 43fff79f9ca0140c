use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

const MAX_ATTEMPTS: usize = 3;

/// Calls a chat completion endpoint in JSON mode and returns the parsed JSON object.
///
/// A response whose content is not valid JSON is retried up to three times. Transport and HTTP
/// status errors are returned immediately.
pub async fn extract(
	client: &Client,
	cfg: &trunq_config::LlmProviderConfig,
	messages: &[Value],
) -> Result<Value> {
	let timeout = Duration::from_millis(cfg.timeout_ms);
	let url = format!("{}{}", cfg.api_base, cfg.path);

	for attempt in 1..=MAX_ATTEMPTS {
		let body = serde_json::json!({
			"model": cfg.model,
			"temperature": cfg.temperature,
			"messages": messages,
			"response_format": { "type": "json_object" },
		});
		let res = client
			.post(&url)
			.timeout(timeout)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		match parse_extractor_json(json) {
			Ok(parsed) => return Ok(parsed),
			Err(err) => {
				tracing::warn!(attempt, error = %err, "Extractor returned unusable content.");
			},
		}
	}

	Err(Error::InvalidResponse { message: "Extractor response is not valid JSON.".to_string() })
}

fn parse_extractor_json(json: Value) -> Result<Value> {
	if let Some(content) = crate::first_choice_content(&json) {
		let parsed: Value = serde_json::from_str(strip_code_fence(content)).map_err(|_| {
			Error::InvalidResponse { message: "Extractor content is not valid JSON.".to_string() }
		})?;

		if !parsed.is_object() {
			return Err(Error::InvalidResponse {
				message: "Extractor content must be a JSON object.".to_string(),
			});
		}

		return Ok(parsed);
	}

	if json.is_object() && json.get("choices").is_none() {
		return Ok(json);
	}

	Err(Error::InvalidResponse { message: "Extractor response is missing JSON content.".to_string() })
}

fn strip_code_fence(content: &str) -> &str {
	let trimmed = content.trim();
	let Some(inner) = trimmed.strip_prefix("```") else {
		return trimmed;
	};
	let inner = inner.strip_prefix("json").unwrap_or(inner);

	inner.strip_suffix("```").unwrap_or(inner).trim()
}
