use crate::{
    api::{
        SharedStore,
        handlers::{valid_email, valid_username},
    },
    password::{PasswordVerifier, VerificationError},
    users::{NewUser, StoreError},
};
use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Span, error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Deserialize)]
pub struct UserRegister {
    username: String,
    #[schema(value_type = String, format = Password)]
    password: SecretString,
    gender: String,
    age: i32,
    email: String,
    phone: String,
    address: Option<String>,
}

// contact details stay out of logs and spans
impl std::fmt::Debug for UserRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRegister")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Registered {
    pub user_id: Uuid,
}

#[utoipa::path(
    post,
    path= "/user/register",
    request_body = UserRegister,
    responses (
        (status = 201, description = "Registration successful", body = Registered, content_type = "application/json"),
        (status = 400, description = "Missing or invalid payload"),
        (status = 409, description = "User with the specified username already exists"),
    ),
    tag= "register"
)]
// axum handler for register
#[instrument(skip(verifier, store, payload), fields(username = tracing::field::Empty))]
pub async fn register(
    verifier: Extension<Arc<PasswordVerifier>>,
    store: Extension<SharedStore>,
    payload: Option<Json<UserRegister>>,
) -> Response {
    let Some(Json(user)) = payload else {
        warn!("invalid request body");
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };
    Span::current().record("username", user.username.as_str());

    if !valid_username(&user.username) {
        return (StatusCode::BAD_REQUEST, "Invalid username".to_string()).into_response();
    }

    if !valid_email(&user.email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    let verifier = Arc::clone(&verifier);
    let password = user.password;
    let hashed = tokio::task::spawn_blocking(move || verifier.hash(password.expose_secret())).await;

    let password_hash = match hashed {
        Ok(Ok(hash)) => hash,
        Ok(Err(VerificationError::EmptyInput)) => {
            return (StatusCode::BAD_REQUEST, "Invalid password".to_string()).into_response();
        }
        Ok(Err(VerificationError::TooLong)) => {
            warn!("password too long");
            return (StatusCode::BAD_REQUEST, "Password too long".to_string()).into_response();
        }
        Ok(Err(e)) => {
            error!("Error hashing password: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error hashing password".to_string(),
            )
                .into_response();
        }
        Err(e) => {
            error!("Password hashing task failed: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let new_user = NewUser {
        username: user.username,
        password_hash,
        gender: user.gender,
        age: user.age,
        email: user.email,
        phone: user.phone,
        address: user.address,
    };

    let username = new_user.username.clone();
    match store.insert_user(new_user).await {
        Ok(user_id) => {
            info!(user = %username, "user registered");
            (StatusCode::CREATED, Json(Registered { user_id })).into_response()
        }
        Err(StoreError::Duplicate) => {
            warn!(user = %username, "user already exists");
            (StatusCode::CONFLICT, "User already exists".to_string()).into_response()
        }
        Err(e) => {
            error!(user = %username, "Error inserting user: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error inserting user".to_string(),
            )
                .into_response()
        }
    }
}
