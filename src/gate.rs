//! Bearer authentication in front of protected routes.
//!
//! Flow Overview: read the `Authorization` header, strip the `Bearer ` scheme,
//! validate the token, check the subject is a UUID, and hand a [`Principal`]
//! to the handler. Every failure answers the same bare `401`.

use crate::token::{TokenError, TokenService, now_unix_seconds};
use axum::{
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

pub const BEARER_PREFIX: &str = "Bearer ";

/// Authenticated caller, available to handlers as `Extension<Principal>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    #[error("missing bearer scheme")]
    MissingScheme,
    #[error("missing token")]
    MissingToken,
    #[error("unauthorized: {0}")]
    Unauthorized(TokenError),
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

/// Authenticate a raw `Authorization` header value at time `now`.
///
/// # Errors
///
/// Returns [`GateError::MissingScheme`] or [`GateError::MissingToken`] for a
/// bad header, and [`GateError::Unauthorized`] wrapping the token failure
/// otherwise, including [`TokenError::InvalidSubject`] for a non-UUID subject.
pub fn authenticate(
    header: Option<&str>,
    tokens: &TokenService,
    now: i64,
) -> Result<Principal, GateError> {
    let Some(token) = header.and_then(|value| value.strip_prefix(BEARER_PREFIX)) else {
        warn!("authorization header without bearer scheme");
        return Err(GateError::MissingScheme);
    };

    if token.is_empty() {
        warn!("bearer token not found");
        return Err(GateError::MissingToken);
    }

    let claims = tokens.validate_at(token, now).map_err(|e| {
        match e {
            TokenError::Expired => warn!("bearer token expired"),
            TokenError::BadSignature => warn!("bearer token signature mismatch"),
            TokenError::Malformed => warn!("bearer token malformed"),
            TokenError::InvalidSubject => warn!("bearer token subject invalid"),
        }
        GateError::Unauthorized(e)
    })?;

    let user_id = Uuid::parse_str(&claims.user_id).map_err(|e| {
        warn!(user_id = %claims.user_id, "invalid user id in token: {e}");
        GateError::Unauthorized(TokenError::InvalidSubject)
    })?;

    Ok(Principal {
        user_id,
        username: claims.username,
    })
}

/// axum middleware guarding every route it wraps.
///
/// # Errors
///
/// Returns a bare `401` via [`GateError`]; the inner service is not called.
pub async fn require_bearer(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, GateError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let principal = authenticate(header, &tokens, now_unix_seconds())?;
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::token::{SigningKey, TOKEN_VALIDITY};

    const T: i64 = 1_700_000_000;
    const USER_ID: &str = "0d9f4c4e-2b7a-4f61-8f7e-1c3b5a6d7e8f";

    fn tokens() -> TokenService {
        TokenService::new(SigningKey::new(vec![42u8; 32]).unwrap())
    }

    fn bearer(token: &str) -> String {
        format!("{BEARER_PREFIX}{token}")
    }

    #[test]
    fn valid_token_yields_principal() {
        let svc = tokens();
        let token = svc.issue(USER_ID, "alice", T).unwrap();
        let principal = authenticate(Some(&bearer(&token)), &svc, T + 1).unwrap();
        assert_eq!(principal.user_id, Uuid::parse_str(USER_ID).unwrap());
        assert_eq!(principal.username, "alice");
    }

    #[test]
    fn missing_or_wrong_scheme() {
        let svc = tokens();
        let token = svc.issue(USER_ID, "alice", T).unwrap();
        for header in [
            None,
            Some(String::new()),
            Some(token.clone()),
            Some(format!("bearer {token}")),
            Some(format!("Bearer\t{token}")),
            Some(format!("Basic {token}")),
            Some("Bearer".to_string()),
        ] {
            assert_eq!(
                authenticate(header.as_deref(), &svc, T),
                Err(GateError::MissingScheme),
                "{header:?}"
            );
        }
    }

    #[test]
    fn empty_token() {
        assert_eq!(
            authenticate(Some("Bearer "), &tokens(), T),
            Err(GateError::MissingToken)
        );
    }

    #[test]
    fn expired_token() {
        let svc = tokens();
        let token = svc.issue(USER_ID, "alice", T).unwrap();
        let later = T + i64::try_from(TOKEN_VALIDITY.as_secs()).unwrap() + 1;
        assert_eq!(
            authenticate(Some(&bearer(&token)), &svc, later),
            Err(GateError::Unauthorized(TokenError::Expired))
        );
    }

    #[test]
    fn foreign_key_token() {
        let other = TokenService::new(SigningKey::new(vec![1u8; 32]).unwrap());
        let token = other.issue(USER_ID, "alice", T).unwrap();
        assert_eq!(
            authenticate(Some(&bearer(&token)), &tokens(), T + 1),
            Err(GateError::Unauthorized(TokenError::BadSignature))
        );
    }

    #[test]
    fn malformed_token() {
        assert_eq!(
            authenticate(Some("Bearer not-a-token"), &tokens(), T),
            Err(GateError::Unauthorized(TokenError::Malformed))
        );
    }

    #[test]
    fn non_uuid_subject() {
        let svc = tokens();
        let token = svc.issue("user-42", "alice", T).unwrap();
        assert_eq!(
            authenticate(Some(&bearer(&token)), &svc, T + 1),
            Err(GateError::Unauthorized(TokenError::InvalidSubject))
        );
    }

    #[test]
    fn every_failure_is_a_bare_401() {
        for err in [
            GateError::MissingScheme,
            GateError::MissingToken,
            GateError::Unauthorized(TokenError::Expired),
            GateError::Unauthorized(TokenError::BadSignature),
            GateError::Unauthorized(TokenError::Malformed),
            GateError::Unauthorized(TokenError::InvalidSubject),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
