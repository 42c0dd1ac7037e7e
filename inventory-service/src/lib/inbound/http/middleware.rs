use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type carrying the verified claims of the caller
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub claims: auth::Claims,
}

impl AuthenticatedUser {
    pub fn username(&self) -> &str {
        &self.claims.sub
    }
}

/// Middleware that validates bearer tokens and adds the claims to request extensions
///
/// Rejected requests never reach the handler; they get a 401 with a
/// `WWW-Authenticate: Bearer` challenge and a reason code.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let authorization = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| {
            reject(&auth::AuthenticationError::InvalidAuthorizationScheme)
        })?),
        None => None,
    };

    let claims = state
        .authenticator
        .authenticate_bearer(authorization)
        .map_err(|e| reject(&e))?;

    req.extensions_mut().insert(AuthenticatedUser { claims });

    Ok(next.run(req).await)
}

fn reject(err: &auth::AuthenticationError) -> Response {
    tracing::warn!(reason = err.reason_code(), "Request authentication failed");
    ApiError::unauthenticated(err).into_response()
}
