use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::parse_body;
use super::ApiError;
use super::ApiSuccess;
use super::SuccessResponseData;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Password;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<SuccessResponseData>, ApiError> {
    let command = parse_body(payload)?.try_into_command()?;

    state
        .user_service
        .create_user(command)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::CREATED, SuccessResponseData { success: true }))
}

/// HTTP request body for creating a user (raw JSON, absent fields are empty)
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    username: String,
    password: String,
    role: String,
    info: String,
}

impl CreateUserRequest {
    fn try_into_command(self) -> Result<CreateUserCommand, UserError> {
        Ok(CreateUserCommand {
            username: Username::new(self.username)?,
            password: Password::new(self.password)?,
            role: self.role.parse()?,
            info: self.info,
        })
    }
}
