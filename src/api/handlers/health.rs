use crate::{GIT_COMMIT_HASH, api::SharedStore};
use axum::{
    extract::Extension,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "User store is reachable", body = [Health]),
        (status = 503, description = "User store is unreachable", body = [Health])
    ),
    tag= "health"
)]
// axum handler for health
pub async fn health(store: Extension<SharedStore>) -> impl IntoResponse {
    let result = store.ping().await;
    if let Err(e) = &result {
        error!("Failed to ping user store: {e}");
    }

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if result.is_ok() {
            "ok".to_string()
        } else {
            "error".to_string()
        },
    };

    let short_hash = GIT_COMMIT_HASH.get(0..7).unwrap_or(GIT_COMMIT_HASH);

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&format!(
        "{}:{}:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash
    )) {
        headers.insert(HeaderName::from_static("x-app"), value);
    }

    let status = if result.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, headers, Json(health))
}
