use crate::gate::Principal;
use axum::{Json, extract::Extension};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Me {
    pub user_id: Uuid,
    pub username: String,
}

#[utoipa::path(
    get,
    path= "/user/me",
    responses (
        (status = 200, description = "Authenticated user", body = Me, content_type = "application/json"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag= "me"
)]
// axum handler for the authenticated caller
pub async fn me(Extension(principal): Extension<Principal>) -> Json<Me> {
    Json(Me {
        user_id: principal.user_id,
        username: principal.username,
    })
}
