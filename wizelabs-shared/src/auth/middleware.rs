/// Request authentication
///
/// A request is authenticated by an access token taken from, in order:
///
/// 1. `Authorization: Bearer <token>`
/// 2. the `wizelabs_session` cookie set by the login callback
///
/// On success an [`AuthContext`] is stored in the request extensions, where
/// handlers read it with `Extension<AuthContext>`.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use wizelabs_shared::auth::middleware::{extract_token, SESSION_COOKIE};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::COOKIE, HeaderValue::from_static("wizelabs_session=abc"));
/// assert_eq!(extract_token(&headers).unwrap(), "abc");
/// # let _ = SESSION_COOKIE;
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, Claims, JwtError};
use crate::models::user::UserRole;

/// Cookie holding the access token for browser sessions
pub const SESSION_COOKIE: &str = "wizelabs_session";

/// Identity of the caller, attached to every authenticated request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub profile_id: Option<Uuid>,
}

impl AuthContext {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            profile_id: claims.profile_id,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[derive(Debug)]
pub enum AuthError {
    /// No bearer header and no session cookie
    MissingCredentials,

    /// Authorization header present but not a bearer token
    InvalidFormat(String),

    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
        }
    }
}

/// Reads a cookie value from the `Cookie` headers
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Finds the access token in a request's headers
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let value = auth_header
            .to_str()
            .map_err(|_| AuthError::InvalidFormat("Invalid authorization header".to_string()))?;

        return value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()));
    }

    cookie_value(headers, SESSION_COOKIE).ok_or(AuthError::MissingCredentials)
}

/// Validates the request's access token and builds its context
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = extract_token(headers)?;

    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    Ok(AuthContext::from_claims(claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, TokenType};
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn token(token_type: TokenType) -> String {
        let claims = Claims::new(
            Uuid::new_v4(),
            "ana@wizeline.com",
            UserRole::User,
            Some(Uuid::new_v4()),
            token_type,
        );
        create_token(&claims, SECRET).unwrap()
    }

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("wizelabs_session=xyz"));

        assert_eq!(extract_token(&headers).unwrap(), "abc");
    }

    #[test]
    fn test_session_cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; wizelabs_session=xyz; other=1"),
        );

        assert_eq!(extract_token(&headers).unwrap(), "xyz");
    }

    #[test]
    fn test_missing_and_malformed_credentials() {
        let headers = HeaderMap::new();
        assert!(matches!(extract_token(&headers), Err(AuthError::MissingCredentials)));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(matches!(extract_token(&headers), Err(AuthError::InvalidFormat(_))));

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("wizelabs_session="));
        assert!(matches!(extract_token(&headers), Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn test_authenticate_builds_context() {
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", token(TokenType::Access));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());

        let auth = authenticate(&headers, SECRET).unwrap();
        assert_eq!(auth.email, "ana@wizeline.com");
        assert_eq!(auth.role, UserRole::User);
        assert!(auth.profile_id.is_some());
        assert!(!auth.is_admin());
    }

    #[test]
    fn test_refresh_token_cannot_authenticate() {
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", token(TokenType::Refresh));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());

        assert!(matches!(
            authenticate(&headers, SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_auth_error_into_response() {
        assert_eq!(
            AuthError::MissingCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidFormat("x".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
