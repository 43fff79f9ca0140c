pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures calling an OpenAI-compatible endpoint.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Provider request failed: {0}")]
	Reqwest(#[from] reqwest::Error),
	#[error("Provider header name is invalid: {0}")]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error("Provider header value is invalid: {0}")]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("Provider config is invalid: {message}")]
	InvalidConfig { message: String },
	#[error("Provider response is unusable: {message}")]
	InvalidResponse { message: String },
}
