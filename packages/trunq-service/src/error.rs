use std::fmt;

use serde::Serialize;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// One of the two stores a query reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalSource {
	Structured,
	Semantic,
}
impl RetrievalSource {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Structured => "structured",
			Self::Semantic => "semantic",
		}
	}
}

impl fmt::Display for RetrievalSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
	#[error("The {store} store is unavailable: {message}")]
	SourceUnavailable { store: RetrievalSource, message: String },
	#[error("The {store} store did not respond within {timeout_ms} ms.")]
	Timeout { store: RetrievalSource, timeout_ms: u64 },
}
impl From<trunq_storage::Error> for Error {
	fn from(err: trunq_storage::Error) -> Self {
		match err {
			trunq_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			err @ (trunq_storage::Error::DimensionMismatch { .. }
			| trunq_storage::Error::CorruptNote { .. }) => Self::Storage { message: err.to_string() },
			trunq_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
		}
	}
}

impl From<trunq_providers::Error> for Error {
	fn from(err: trunq_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
