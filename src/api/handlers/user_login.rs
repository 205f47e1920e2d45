use crate::{
    api::SharedStore,
    password::{PasswordVerifier, VerificationError},
    token::{SigningError, TokenService, now_unix_seconds},
};
use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct UserLogin {
    username: String,
    #[schema(value_type = String, format = Password)]
    password: SecretString,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginToken {
    pub token: String,
}

#[utoipa::path(
    post,
    path= "/user/login",
    request_body = UserLogin,
    responses (
        (status = 200, description = "Login successful", body = LoginToken, content_type = "application/json"),
        (status = 400, description = "Missing or invalid payload"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Token generation failed"),
    ),
    tag= "login"
)]
// axum handler for login
#[instrument(skip(verifier, tokens, store))]
pub async fn login(
    verifier: Extension<Arc<PasswordVerifier>>,
    tokens: Extension<Arc<TokenService>>,
    store: Extension<SharedStore>,
    payload: Option<Json<UserLogin>>,
) -> Response {
    let Some(Json(user)) = payload else {
        warn!("invalid request body");
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    if user.username.is_empty() || user.password.expose_secret().is_empty() {
        warn!("invalid request body");
        return (StatusCode::BAD_REQUEST, "Missing credentials".to_string()).into_response();
    }

    let identity = match store.find_by_username(&user.username).await {
        Ok(Some(identity)) => identity,
        Ok(None) => {
            warn!("user not found");
            let verifier = Arc::clone(&verifier);
            let password = user.password;
            // same bcrypt cost as a wrong password
            let _ = tokio::task::spawn_blocking(move || {
                verifier.verify_unknown(password.expose_secret())
            })
            .await;
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Err(e) => {
            error!("Error looking up user: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // bcrypt is deliberately slow, keep it off the async workers
    let verifier = Arc::clone(&verifier);
    let stored_hash = identity.password_hash.clone();
    let password = user.password;
    let verified = tokio::task::spawn_blocking(move || {
        verifier.verify(&stored_hash, password.expose_secret())
    })
    .await;

    match verified {
        Ok(Ok(())) => debug!("password verified"),
        Ok(Err(VerificationError::EmptyInput)) => {
            warn!("stored or supplied password is empty");
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Ok(Err(e)) => {
            warn!("invalid password: {e}");
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Err(e) => {
            error!("Password verification task failed: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    let issued = tokens.issue(
        &identity.user_id.to_string(),
        &identity.username,
        now_unix_seconds(),
    );

    token_response(issued, &user.username)
}

fn token_response(issued: Result<String, SigningError>, username: &str) -> Response {
    match issued {
        Ok(token) => (StatusCode::OK, Json(LoginToken { token })).into_response(),
        Err(e) => {
            error!(user = %username, "failed to sign token: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "token generation failed"})),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::body::to_bytes;
    use serde_json::Value;

    #[tokio::test]
    async fn signing_failure_is_a_500_with_error_body() -> Result<()> {
        let response = token_response(
            Err(SigningError::SigningFailure("expiry out of range".to_string())),
            "alice",
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let payload: Value = serde_json::from_slice(&body)?;
        assert_eq!(payload, json!({"error": "token generation failed"}));
        Ok(())
    }

    #[tokio::test]
    async fn issued_token_is_returned() -> Result<()> {
        let response = token_response(Ok("a.b.c".to_string()), "alice");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let payload: LoginToken = serde_json::from_slice(&body)?;
        assert_eq!(payload.token, "a.b.c");
        Ok(())
    }
}
