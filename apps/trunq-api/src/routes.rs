use axum::{
	Json, Router,
	extract::{Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use trunq_service::{
	AnswerRequest, AnswerResponse, Error, IngestRequest, IngestResponse, QueryRequest,
	QueryResponse, RetrieveRequest, RetrieveResponse, SearchNotesRequest, SearchNotesResponse,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/notes", post(ingest))
		.route("/v1/notes/search", get(search_notes))
		.route("/v1/query/retrieve", post(retrieve))
		.route("/v1/query/answer", post(answer))
		.route("/v1/query", post(query))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn ingest(
	State(state): State<AppState>,
	Json(payload): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
	let response = state.service.ingest(payload).await?;

	Ok(Json(response))
}

async fn search_notes(
	State(state): State<AppState>,
	Query(params): Query<SearchNotesRequest>,
) -> Result<Json<SearchNotesResponse>, ApiError> {
	let response = state.service.search_notes(params).await?;

	Ok(Json(response))
}

async fn retrieve(
	State(state): State<AppState>,
	Json(payload): Json<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>, ApiError> {
	let response = state.service.retrieve(payload).await?;

	Ok(Json(response))
}

async fn answer(
	State(state): State<AppState>,
	Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
	let response = state.service.answer(payload).await?;

	Ok(Json(response))
}

async fn query(
	State(state): State<AppState>,
	Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
	let response = state.service.query(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } => {
				let fields = invalid_field(&message).map(|field| vec![field]);

				ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", message, fields)
			},
			Error::Provider { message } =>
				ApiError::new(StatusCode::BAD_GATEWAY, "provider_error", message, None),
			Error::Storage { message } =>
				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message, None),
			Error::Qdrant { message } =>
				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "qdrant_error", message, None),
			err @ Error::SourceUnavailable { .. } => ApiError::new(
				StatusCode::SERVICE_UNAVAILABLE,
				"source_unavailable",
				err.to_string(),
				None,
			),
			err @ Error::Timeout { .. } =>
				ApiError::new(StatusCode::GATEWAY_TIMEOUT, "timeout", err.to_string(), None),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		if self.status.is_server_error() {
			tracing::error!(
				error_code = %self.error_code,
				message = %self.message,
				"Request failed."
			);
		}

		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

/// Validation messages lead with the offending field path, e.g. `notes[1].raw_text must ...`.
fn invalid_field(message: &str) -> Option<String> {
	let (field, rest) = message.split_once(' ')?;

	rest.starts_with("must").then(|| field.to_string())
}
