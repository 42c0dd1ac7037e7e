use axum::extract::rejection::FormRejection;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::user::errors::UserError;

pub mod current_user;
pub mod health;
pub mod login;
pub mod register;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Failure returned to HTTP clients.
///
/// Every variant carries a machine-readable code and a message safe to show
/// to the client. Internal details are logged, never returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest { code: &'static str, message: String },
    Unauthorized { code: &'static str, message: String },
}

impl ApiError {
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized {
            code: "invalid_credentials",
            message: "Invalid credentials".to_string(),
        }
    }

    pub fn unauthenticated(err: &auth::AuthenticationError) -> Self {
        let message = match err {
            auth::AuthenticationError::Token(_) => "Invalid or expired token",
            _ => "Not authenticated",
        };
        ApiError::Unauthorized {
            code: err.reason_code(),
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InternalServerError(detail) => {
                tracing::error!(error = %detail, "Request failed");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                (
                    status,
                    Json(ApiResponseBody::new_error(
                        status,
                        "internal_error",
                        INTERNAL_ERROR_MESSAGE.to_string(),
                    )),
                )
                    .into_response()
            }
            ApiError::BadRequest { code, message } => {
                let status = StatusCode::BAD_REQUEST;
                (
                    status,
                    Json(ApiResponseBody::new_error(status, code, message)),
                )
                    .into_response()
            }
            ApiError::Unauthorized { code, message } => {
                let status = StatusCode::UNAUTHORIZED;
                (
                    status,
                    [(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
                    Json(ApiResponseBody::new_error(status, code, message)),
                )
                    .into_response()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            code: "validation_failed",
            message: rejection.body_text(),
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::BadRequest {
            code: "validation_failed",
            message: rejection.body_text(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DuplicateUser(_) => ApiError::BadRequest {
                code: "duplicate_user",
                message: err.to_string(),
            },
            UserError::InvalidUsername(_) | UserError::InvalidEmail(_) => ApiError::BadRequest {
                code: "validation_failed",
                message: err.to_string(),
            },
            UserError::Password(auth::PasswordError::PasswordTooLong { .. }) => {
                ApiError::BadRequest {
                    code: "password_too_long",
                    message: err.to_string(),
                }
            }
            UserError::Password(_) | UserError::DatabaseError(_) | UserError::TaskFailed(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, code: &'static str, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData {
                code: code.to_string(),
                message,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::errors::DuplicateField;

    #[test]
    fn test_duplicate_user_maps_to_bad_request() {
        let err = ApiError::from(UserError::DuplicateUser(DuplicateField::Email));
        assert_eq!(
            err,
            ApiError::BadRequest {
                code: "duplicate_user",
                message: "Email already registered".to_string(),
            }
        );
    }

    #[test]
    fn test_password_too_long_maps_to_bad_request() {
        let err = ApiError::from(UserError::Password(
            auth::PasswordError::PasswordTooLong {
                max: 72,
                actual: 80,
            },
        ));
        assert!(matches!(
            err,
            ApiError::BadRequest {
                code: "password_too_long",
                ..
            }
        ));
    }

    #[test]
    fn test_database_error_is_internal() {
        let err = ApiError::from(UserError::DatabaseError("pool timed out".to_string()));
        assert!(matches!(err, ApiError::InternalServerError(_)));
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let response = ApiError::InternalServerError("pool timed out".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unauthorized_sets_bearer_challenge() {
        let response = ApiError::invalid_credentials().into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE),
            Some(&HeaderValue::from_static("Bearer"))
        );
    }

    #[test]
    fn test_unauthenticated_uses_reason_code() {
        let err = ApiError::unauthenticated(&auth::AuthenticationError::Token(
            auth::JwtError::TokenExpired,
        ));
        assert_eq!(
            err,
            ApiError::Unauthorized {
                code: "token_expired",
                message: "Invalid or expired token".to_string(),
            }
        );
    }
}
