use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Form;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

const TOKEN_TYPE: &str = "bearer";

/// Exchange a username and password for an access token.
///
/// Unknown users and wrong passwords get the same 401 response.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Form<LoginRequest>, FormRejection>,
) -> Result<ApiSuccess<TokenResponseData>, ApiError> {
    let Form(body) = body.map_err(ApiError::from)?;

    let user = state
        .user_service
        .authenticate_user(&body.username, &body.password)
        .await?
        .ok_or_else(|| {
            tracing::warn!(reason = "invalid_credentials", "Login failed");
            ApiError::invalid_credentials()
        })?;

    let claims = auth::ClaimSet::new(user.username.as_str());
    let result = state
        .authenticator
        .issue_token(&claims)
        .map_err(|e| ApiError::InternalServerError(format!("Token generation failed: {}", e)))?;

    tracing::info!(user_id = %user.id, "Login succeeded");

    Ok(ApiSuccess::new(
        StatusCode::OK,
        TokenResponseData {
            access_token: result.access_token,
            token_type: TOKEN_TYPE.to_string(),
        },
    ))
}

/// Form-encoded login body.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenResponseData {
    pub access_token: String,
    pub token_type: String,
}
