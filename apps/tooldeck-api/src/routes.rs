use std::net::SocketAddr;

use axum::{
	Json, Router,
	extract::{ConnectInfo, Path, Query, Request, State, rejection::QueryRejection},
	http::{
		HeaderMap, HeaderName, HeaderValue, StatusCode,
		header::{CACHE_CONTROL, ETAG, IF_NONE_MATCH, RETRY_AFTER},
	},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde_json::{Value, json};

use tooldeck_service::{
	CacheMeta, CacheStatus, Error, ListOutcome, ListParams, ListRequest, RateDecision, rate_limit,
};

use crate::state::AppState;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_CATALOG_SOURCE: HeaderName = HeaderName::from_static("x-catalog-source");
const X_CATALOG_FALLBACK: HeaderName = HeaderName::from_static("x-catalog-fallback");
const X_CACHE_FETCHED_AT: HeaderName = HeaderName::from_static("x-cache-fetched-at");
const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/services", get(list_services))
		.route("/v1/services/{id}", get(get_service))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/v1/admin/cache", get(cache_status))
		.route("/v1/admin/cache/invalidate", post(invalidate_cache))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_services(
	State(state): State<AppState>,
	params: Result<Query<ListParams>, QueryRejection>,
	request: Request,
) -> Result<Response, ApiError> {
	let client_key = client_key(&request);
	let Query(params) = params
		.map_err(|rejection| state.service.reject_params(&client_key, rejection.body_text()))?;
	let if_none_match =
		request.headers().get(IF_NONE_MATCH).and_then(|value| value.to_str().ok()).map(String::from);
	let reply =
		state.service.list(ListRequest { client_key, params, if_none_match }).await?;
	let mut headers = HeaderMap::new();

	insert_rate_headers(&mut headers, &reply.rate);

	match reply.outcome {
		ListOutcome::NotModified { meta } => {
			insert_cache_headers(&mut headers, &meta);

			Ok((StatusCode::NOT_MODIFIED, headers).into_response())
		},
		ListOutcome::Page { body, meta } => {
			insert_cache_headers(&mut headers, &meta);
			insert_header(&mut headers, X_CATALOG_FALLBACK, body.fallback.as_str());

			Ok((StatusCode::OK, headers, Json(body)).into_response())
		},
	}
}

async fn get_service(
	State(state): State<AppState>,
	Path(id): Path<String>,
	request: Request,
) -> Result<Response, ApiError> {
	let reply = state.service.get_service(&client_key(&request), &id).await?;
	let mut headers = HeaderMap::new();

	insert_rate_headers(&mut headers, &reply.rate);
	insert_cache_headers(&mut headers, &reply.meta);

	Ok((StatusCode::OK, headers, Json(reply.service)).into_response())
}

async fn cache_status(State(state): State<AppState>) -> Json<CacheStatus> {
	Json(state.service.cache_status())
}

async fn invalidate_cache(State(state): State<AppState>) -> Json<CacheStatus> {
	Json(state.service.invalidate_cache())
}

fn client_key(request: &Request) -> String {
	let forwarded_for =
		request.headers().get(X_FORWARDED_FOR).and_then(|value| value.to_str().ok());
	let peer = request.extensions().get::<ConnectInfo<SocketAddr>>().map(|info| info.0.ip());

	rate_limit::client_key(forwarded_for, peer)
}

fn insert_cache_headers(headers: &mut HeaderMap, meta: &CacheMeta) {
	insert_header(headers, ETAG, &meta.etag);
	insert_header(headers, CACHE_CONTROL, &meta.cache_control);
	insert_header(headers, X_CATALOG_SOURCE, meta.served_from.as_str());
	insert_header(headers, X_CACHE_FETCHED_AT, &meta.fetched_at_ms.to_string());
}

fn insert_rate_headers(headers: &mut HeaderMap, rate: &RateDecision) {
	insert_header(headers, X_RATELIMIT_LIMIT, &rate.limit.to_string());
	insert_header(headers, X_RATELIMIT_REMAINING, &rate.remaining.to_string());
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
	match HeaderValue::from_str(value) {
		Ok(value) => {
			headers.insert(name, value);
		},
		Err(_) => tracing::warn!(header = %name, "Skipping header with an invalid value."),
	}
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	body: Value,
	rate: Option<RateDecision>,
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		let message = err.to_string();

		match err {
			Error::Validation { issues } => Self {
				status: StatusCode::BAD_REQUEST,
				body: json!({ "error": message, "issues": issues }),
				rate: None,
			},
			Error::RateLimited { decision } => Self {
				status: StatusCode::TOO_MANY_REQUESTS,
				body: json!({ "error": message, "retryAfterSeconds": decision.retry_after_secs }),
				rate: Some(decision),
			},
			Error::NotFound { .. } =>
				Self { status: StatusCode::NOT_FOUND, body: json!({ "error": message }), rate: None },
			Error::Upstream { .. } | Error::Internal { .. } => {
				tracing::error!(error = %message, "Request failed.");

				Self {
					status: StatusCode::INTERNAL_SERVER_ERROR,
					body: json!({ "services": [], "error": message }),
					rate: None,
				}
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let mut headers = HeaderMap::new();

		if let Some(rate) = self.rate.as_ref() {
			insert_rate_headers(&mut headers, rate);
			insert_header(&mut headers, RETRY_AFTER, &rate.retry_after_secs.to_string());
		}

		(self.status, headers, Json(self.body)).into_response()
	}
}
