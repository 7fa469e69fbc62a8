//! Route table and handlers of the listing API
//!
//! Handlers are thin: they pull the username and optional `?token=` out of
//! the request, call [`ListingService`], and let [`ApiError`] render itself
//! as the relayed upstream status.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::github::ApiError;
use crate::services::ListingService;
use crate::types::{ListingResponse, Username, View};

pub const ABOUT_TEXT: &str = "github-listing-api is an API written in Rust using the axum framework. API allows (based on github user's repositories) to: list names of repositories, return languages used with their size in bytes used, get all stars count and check current user's requests limits for github api. API has five endpoints receiving only GET requests.";

/// Optional personal token passed as `?token=`
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

pub fn router(listing_service: ListingService) -> Router {
    Router::new()
        .route("/", get(about_api))
        .route("/current_limits", get(current_limits))
        .route("/current_limits/", get(current_limits))
        .route("/all_repositories/{username}", get(all_repositories))
        .route("/all_languages/{username}", get(all_languages))
        .route("/all_stars_count/{username}", get(all_stars_count))
        .with_state(listing_service)
}

async fn about_api() -> Json<Value> {
    Json(json!({ "API About": ABOUT_TEXT }))
}

async fn current_limits(
    State(listing_service): State<ListingService>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<Value>, ApiError> {
    let rate = listing_service.current_limits(query.token).await?;
    Ok(Json(json!({ "current_limits": rate })))
}

async fn all_repositories(
    State(listing_service): State<ListingService>,
    Path(username): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<ListingResponse>, ApiError> {
    listing_view(&listing_service, username, query, View::Repositories).await
}

async fn all_languages(
    State(listing_service): State<ListingService>,
    Path(username): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<ListingResponse>, ApiError> {
    listing_view(&listing_service, username, query, View::Languages).await
}

async fn all_stars_count(
    State(listing_service): State<ListingService>,
    Path(username): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<ListingResponse>, ApiError> {
    listing_view(&listing_service, username, query, View::Stars).await
}

async fn listing_view(
    listing_service: &ListingService,
    username: String,
    query: TokenQuery,
    view: View,
) -> Result<Json<ListingResponse>, ApiError> {
    let username = Username::from(username);
    match listing_service.handle(&username, query.token, view).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::warn!("Listing {} for {} failed: {}", view, username, e);
            Err(e)
        }
    }
}

impl ApiError {
    /// Status relayed to the caller; failures without an upstream status become 502
    pub fn http_status(&self) -> StatusCode {
        self.upstream_status()
            .filter(|code| *code >= 400)
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY)
    }

    /// Body `detail` text: fixed messages for 401/500, the reason phrase for other relayed codes
    pub fn detail(&self) -> String {
        match self {
            ApiError::Generic(_) => self
                .http_status()
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.http_status(), Json(json!({ "detail": self.detail() }))).into_response()
    }
}
