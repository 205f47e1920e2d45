#![allow(clippy::needless_for_each)]

use crate::{
    gate,
    password::PasswordVerifier,
    token::TokenService,
    users::UserStore,
};
use anyhow::Result;
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use utoipa::OpenApi;

pub mod handlers;

use handlers::{
    health, health::__path_health, me, me::__path_me, user_login, user_login::__path_login,
    user_register, user_register::__path_register,
};

pub type SharedStore = Arc<dyn UserStore>;

#[derive(OpenApi)]
#[openapi(
    paths(health, register, login, me),
    components(schemas(
        health::Health,
        user_register::UserRegister,
        user_register::Registered,
        user_login::UserLogin,
        user_login::LoginToken,
        me::Me
    )),
    tags(
        (name = "tollgate", description = "Bearer-token authentication API")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the application router.
///
/// `/user/me` sits behind [`gate::require_bearer`]; login, register and health
/// are public.
pub fn router(
    store: SharedStore,
    verifier: Arc<PasswordVerifier>,
    tokens: Arc<TokenService>,
) -> Router {
    let protected = Router::new()
        .route("/user/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(
            tokens.clone(),
            gate::require_bearer,
        ));

    Router::new()
        .route("/user/register", post(handlers::register))
        .route("/user/login", post(handlers::login))
        .merge(protected)
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(verifier))
                .layer(Extension(tokens))
                .layer(Extension(store)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to bind or serve
pub async fn new(
    port: u16,
    store: SharedStore,
    verifier: Arc<PasswordVerifier>,
    tokens: Arc<TokenService>,
) -> Result<()> {
    let app = router(store, verifier, tokens);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {e}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = openapi();
        for path in ["/health", "/user/register", "/user/login", "/user/me"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
