use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::parse_body;
use super::ApiError;
use super::ApiSuccess;
use super::SuccessResponseData;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteUserRequest {
    username: String,
}

pub async fn delete_user(
    State(state): State<AppState>,
    payload: Result<Json<DeleteUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<SuccessResponseData>, ApiError> {
    let username = Username::new(parse_body(payload)?.username).map_err(UserError::from)?;

    state
        .user_service
        .delete_user(&username)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, SuccessResponseData { success: true }))
}
