mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, LlmProviderConfig, Postgres, Providers, Qdrant, Retrieval,
	Security, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("llm_analyzer", &cfg.providers.llm_analyzer.api_key),
		("llm_synthesizer", &cfg.providers.llm_synthesizer.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}
	for (label, temperature) in [
		("llm_analyzer", cfg.providers.llm_analyzer.temperature),
		("llm_synthesizer", cfg.providers.llm_synthesizer.temperature),
	] {
		if !temperature.is_finite() {
			return Err(Error::Validation {
				message: format!("providers.{label}.temperature must be a finite number."),
			});
		}
		if !(0.0..=2.0).contains(&temperature) {
			return Err(Error::Validation {
				message: format!("providers.{label}.temperature must be in the range 0.0-2.0."),
			});
		}
	}

	let retrieval = &cfg.retrieval;

	if retrieval.max_limit == 0 {
		return Err(Error::Validation {
			message: "retrieval.max_limit must be greater than zero.".to_string(),
		});
	}
	if retrieval.default_limit == 0 || retrieval.default_limit > retrieval.max_limit {
		return Err(Error::Validation {
			message: "retrieval.default_limit must be between 1 and retrieval.max_limit."
				.to_string(),
		});
	}
	if retrieval.semantic_top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.semantic_top_k must be greater than zero.".to_string(),
		});
	}
	if retrieval.listing_headroom == 0 {
		return Err(Error::Validation {
			message: "retrieval.listing_headroom must be greater than zero.".to_string(),
		});
	}
	if retrieval.source_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "retrieval.source_timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();

	if cfg.service.log_level.is_empty() {
		cfg.service.log_level = "info".to_string();
	}

	for api_base in [
		&mut cfg.providers.embedding.api_base,
		&mut cfg.providers.llm_analyzer.api_base,
		&mut cfg.providers.llm_synthesizer.api_base,
	] {
		while api_base.ends_with('/') {
			api_base.pop();
		}
	}
}
