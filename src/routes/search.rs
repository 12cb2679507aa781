use actix_web::error::QueryPayloadError;
use actix_web::http::header::{ContentType, ACCESS_CONTROL_ALLOW_ORIGIN};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::core::{build_expression, parse_tags, Clock};
use crate::models::HealthResponse;
use crate::services::{fetch_records, FetchError, SelectRequest, SelectSource};

/// Query parameter carrying the comma separated filter tags
pub const PARAMS: &str = "params";

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn SelectSource>,
    pub clock: Arc<dyn Clock>,
    pub bucket: String,
    pub key: String,
}

/// Anything that stops a search from producing its JSON body
///
/// Every variant renders the same generic 500; the detail only goes to the log.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid query string: {0}")]
    Query(#[from] QueryPayloadError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ResponseError for SearchError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::InternalServerError()
            .content_type(ContentType::plaintext())
            .insert_header((ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
            .body("Internal Server Error")
    }
}

/// Configure all search-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/actresses", web::get().to(search_actresses));
}

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now(),
        })
}

/// Filtered search endpoint
///
/// GET /api/v1/actresses?params=低身長,貧乳
///
/// Responds with a JSON array of records. Unknown tags are ignored and a
/// missing or empty `params` returns every row.
async fn search_actresses(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, SearchError> {
    run_search(&state, req.query_string()).await.map_err(|e| {
        tracing::error!("Search failed for query {:?}: {}", req.query_string(), e);
        e
    })
}

async fn run_search(state: &AppState, query_string: &str) -> Result<HttpResponse, SearchError> {
    let query = web::Query::<HashMap<String, String>>::from_query(query_string)?;
    let tags = parse_tags(query.get(PARAMS).map(String::as_str));
    tracing::debug!("Filter tags: {:?}", tags);

    let today = state.clock.today();
    let expression = build_expression(&tags, today);
    tracing::debug!("Select expression: {}", expression);

    let request = SelectRequest::new(&state.bucket, &state.key, expression);
    let records = fetch_records(state.source.as_ref(), &request, today).await?;
    let body = serde_json::to_string(&records)?;

    tracing::info!("Returning {} records for {} tags", records.len(), tags.len());

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .insert_header((ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .body(body))
}
