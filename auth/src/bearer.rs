use crate::authenticator::AuthenticationError;

const BEARER_SCHEME: &str = "bearer";

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme name is matched case-insensitively and surrounding whitespace
/// is ignored.
///
/// # Errors
/// * `MissingAuthorization` - No header was sent
/// * `InvalidAuthorizationScheme` - Scheme is not `Bearer` or the token is empty
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthenticationError> {
    let header = header.ok_or(AuthenticationError::MissingAuthorization)?.trim();

    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AuthenticationError::InvalidAuthorizationScheme)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) || token.is_empty() {
        return Err(AuthenticationError::InvalidAuthorizationScheme);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_token() {
        assert_eq!(extract_bearer_token(Some("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(extract_bearer_token(Some("bearer abc")), Ok("abc"));
        assert_eq!(extract_bearer_token(Some("  BEARER   abc  ")), Ok("abc"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            extract_bearer_token(None),
            Err(AuthenticationError::MissingAuthorization)
        );
    }

    #[test]
    fn test_wrong_scheme() {
        assert_eq!(
            extract_bearer_token(Some("Basic dXNlcjpwYXNz")),
            Err(AuthenticationError::InvalidAuthorizationScheme)
        );
        assert_eq!(
            extract_bearer_token(Some("abc.def.ghi")),
            Err(AuthenticationError::InvalidAuthorizationScheme)
        );
    }

    #[test]
    fn test_empty_token() {
        assert_eq!(
            extract_bearer_token(Some("Bearer ")),
            Err(AuthenticationError::InvalidAuthorizationScheme)
        );
        assert_eq!(
            extract_bearer_token(Some("")),
            Err(AuthenticationError::InvalidAuthorizationScheme)
        );
    }
}
