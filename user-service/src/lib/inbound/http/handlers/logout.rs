use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::Principal;
use crate::inbound::http::router::AppState;

/// Revoke the presented access token and, when supplied, the refresh token.
pub async fn logout(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Option<Json<LogoutRequestBody>>,
) -> Result<ApiSuccess<LogoutResponseData>, ApiError> {
    let refresh_token = body.and_then(|Json(body)| body.refresh_token);

    state
        .user_service
        .logout(&principal, refresh_token.as_deref())
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::OK,
                LogoutResponseData {
                    message: "Successfully logged out".to_string(),
                },
            )
        })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogoutRequestBody {
    refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutResponseData {
    pub message: String,
}
