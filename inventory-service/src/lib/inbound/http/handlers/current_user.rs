use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedUser;

/// Return the verified claims of the caller's token.
pub async fn current_user(
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<auth::Claims>, ApiError> {
    tracing::debug!(username = %user.username(), "Current user requested");
    Ok(ApiSuccess::new(StatusCode::OK, user.claims))
}
