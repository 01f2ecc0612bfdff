use axum::{
	Json, Router,
	extract::{Query, State, rejection::QueryRejection},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing::get,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use campus_domain::{
	entity::{DateRange, EntityKind, TaskPriority},
	principal::{Principal, Role},
	text,
};
use campus_service::{Error as ServiceError, SearchQuery, SearchResponse};

pub const HEADER_PRINCIPAL_ID: &str = "x-principal-id";
pub const HEADER_PRINCIPAL_ROLE: &str = "x-principal-role";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/search", get(search))
		.with_state(state)
}

/// Query string of `GET /search`. Unknown keys are rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SearchParams {
	pub q: Option<String>,
	pub types: Option<String>,
	pub status: Option<String>,
	pub priority: Option<String>,
	pub date_range: Option<String>,
	pub keyword: Option<bool>,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	headers: HeaderMap,
	params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let Query(params) = params.map_err(|err| {
		json_error(StatusCode::BAD_REQUEST, "invalid_request", err.body_text(), None)
	})?;

	// Query text is validated before the principal headers.
	if params.q.as_deref().is_none_or(|q| text::normalize(q).is_empty()) {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			"Query text must not be empty.",
			Some(vec!["q".to_string()]),
		));
	}

	let principal = principal_from_headers(&headers)?;
	let query = search_query(params, principal)?;
	let response = state.service.search(query).await?;

	Ok(Json(response))
}

fn principal_from_headers(headers: &HeaderMap) -> Result<Principal, ApiError> {
	let unauthenticated =
		|message: &str| json_error(StatusCode::UNAUTHORIZED, "unauthenticated", message, None);
	let id = headers
		.get(HEADER_PRINCIPAL_ID)
		.and_then(|value| value.to_str().ok())
		.ok_or_else(|| unauthenticated("Missing principal id header."))?
		.trim()
		.parse::<Uuid>()
		.map_err(|_| unauthenticated("Principal id must be a UUID."))?;
	let role = headers
		.get(HEADER_PRINCIPAL_ROLE)
		.and_then(|value| value.to_str().ok())
		.ok_or_else(|| unauthenticated("Missing principal role header."))?
		.parse::<Role>()
		.map_err(|_| unauthenticated("Principal role must be ADMIN, LECTURER, or STUDENT."))?;

	Ok(Principal::new(id, role))
}

fn search_query(params: SearchParams, principal: Principal) -> Result<SearchQuery, ApiError> {
	let mut query = SearchQuery::new(params.q.unwrap_or_default(), principal);

	if let Some(raw) = params.types.as_deref() {
		query.types = EntityKind::parse_csv(raw).map_err(|err| invalid_field("types", err))?;
	}
	if let Some(raw) = params.priority.as_deref() {
		query.priority =
			Some(raw.parse::<TaskPriority>().map_err(|err| invalid_field("priority", err))?);
	}
	if let Some(raw) = params.date_range.as_deref() {
		query.date_range =
			Some(raw.parse::<DateRange>().map_err(|err| invalid_field("dateRange", err))?);
	}

	query.status = params.status;
	query.force_keyword = params.keyword.unwrap_or(false);

	Ok(query)
}

fn invalid_field(field: &str, err: campus_domain::Error) -> ApiError {
	json_error(
		StatusCode::BAD_REQUEST,
		"invalid_request",
		err.to_string(),
		Some(vec![field.to_string()]),
	)
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
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidQuery { message } => json_error(
				StatusCode::BAD_REQUEST,
				"invalid_request",
				message,
				Some(vec!["q".to_string()]),
			),
			ServiceError::SearchUnavailable { message } => {
				tracing::error!(error = %message, "Search request failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"search_unavailable",
					"Search is temporarily unavailable.",
					None,
				)
			},
			other => {
				tracing::error!(error = %other, "Unexpected search error.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal error.", None)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
