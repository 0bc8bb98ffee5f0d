use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::Principal;
use crate::inbound::http::router::AppState;

pub async fn change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let command = ChangePasswordCommand {
        current_password: body.current_password,
        new_password: body.new_password,
        confirm_new_password: body.confirm_new_password,
    };

    state
        .user_service
        .change_password(&principal.user.id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
    confirm_new_password: String,
}
