use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::parse_body;
use super::ApiError;
use super::ApiSuccess;
use super::SuccessResponseData;
use crate::domain::user::models::Password;
use crate::domain::user::models::Role;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// HTTP request body for replacing a password
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct UpdatePasswordRequest {
    username: String,
    password: String,
}

/// HTTP request body for replacing the free-text info
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateInfoRequest {
    username: String,
    info: String,
}

/// HTTP request body for changing the role
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateRoleRequest {
    username: String,
    role: String,
}

// A `NotModified` outcome is still a 200, reported as `{"success": false}`.

pub async fn update_password(
    State(state): State<AppState>,
    payload: Result<Json<UpdatePasswordRequest>, JsonRejection>,
) -> Result<ApiSuccess<SuccessResponseData>, ApiError> {
    let req = parse_body(payload)?;
    let username = Username::new(req.username).map_err(UserError::from)?;
    let password = Password::new(req.password).map_err(UserError::from)?;

    state
        .user_service
        .update_password(&username, password)
        .await
        .map_err(ApiError::from)
        .map(|outcome| ApiSuccess::new(StatusCode::OK, outcome.into()))
}

pub async fn update_info(
    State(state): State<AppState>,
    payload: Result<Json<UpdateInfoRequest>, JsonRejection>,
) -> Result<ApiSuccess<SuccessResponseData>, ApiError> {
    let req = parse_body(payload)?;
    let username = Username::new(req.username).map_err(UserError::from)?;

    state
        .user_service
        .update_info(&username, req.info)
        .await
        .map_err(ApiError::from)
        .map(|outcome| ApiSuccess::new(StatusCode::OK, outcome.into()))
}

pub async fn update_role(
    State(state): State<AppState>,
    payload: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> Result<ApiSuccess<SuccessResponseData>, ApiError> {
    let req = parse_body(payload)?;
    let username = Username::new(req.username).map_err(UserError::from)?;
    let role = req.role.parse::<Role>().map_err(UserError::from)?;

    state
        .user_service
        .update_role(&username, role)
        .await
        .map_err(ApiError::from)
        .map(|outcome| ApiSuccess::new(StatusCode::OK, outcome.into()))
}
