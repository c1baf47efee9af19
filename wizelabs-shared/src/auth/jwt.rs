/// Session tokens
///
/// Wizelabs issues its own HS256-signed JWTs once the identity provider has
/// verified a login. The access token carries everything a request handler
/// needs to authorize (user id, role and profile id) so most checks never
/// touch the database.
///
/// # Token Types
///
/// - **Access Token**: 24h, sent as `Authorization: Bearer` or in the
///   `wizelabs_session` cookie
/// - **Refresh Token**: 30d, exchanged at `/auth/refresh`
///
/// # Example
///
/// ```
/// use wizelabs_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
/// use wizelabs_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-secret-of-at-least-thirty-two-bytes!";
/// let claims = Claims::new(Uuid::new_v4(), "ana@wizeline.com", UserRole::User, None, TokenType::Access);
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_access_token(&token, secret)?;
/// assert_eq!(validated.role, UserRole::User);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

pub const ISSUER: &str = "wizelabs";

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    #[error("Expected {expected} token, got {actual}")]
    WrongType {
        expected: &'static str,
        actual: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,

    pub email: String,

    pub role: UserRole,

    /// Profile of the user, absent for applicants
    pub profile_id: Option<Uuid>,

    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,

    pub token_type: TokenType,
}

impl Claims {
    pub fn new(
        user_id: Uuid,
        email: &str,
        role: UserRole,
        profile_id: Option<Uuid>,
        token_type: TokenType,
    ) -> Self {
        Self::with_expiration(
            user_id,
            email,
            role,
            profile_id,
            token_type,
            token_type.default_expiration(),
        )
    }

    pub fn with_expiration(
        user_id: Uuid,
        email: &str,
        role: UserRole,
        profile_id: Option<Uuid>,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            email: email.to_string(),
            role,
            profile_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
            token_type,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Seconds until expiry, for `expires_in` in token responses
    pub fn expires_in(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}

pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::ValidationError(e.to_string()),
        })
}

fn validate_typed(token: &str, secret: &str, expected: TokenType) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != expected {
        return Err(JwtError::WrongType {
            expected: expected.as_str(),
            actual: claims.token_type.as_str(),
        });
    }

    Ok(claims)
}

pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_typed(token, secret, TokenType::Access)
}

pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_typed(token, secret, TokenType::Refresh)
}

/// Access and refresh token for one login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub fn issue_token_pair(
    user_id: Uuid,
    email: &str,
    role: UserRole,
    profile_id: Option<Uuid>,
    secret: &str,
) -> Result<TokenPair, JwtError> {
    let access = Claims::new(user_id, email, role, profile_id, TokenType::Access);
    let refresh = Claims::new(user_id, email, role, profile_id, TokenType::Refresh);

    Ok(TokenPair {
        access_token: create_token(&access, secret)?,
        refresh_token: create_token(&refresh, secret)?,
        token_type: "Bearer".to_string(),
        expires_in: access.expires_in(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn claims(token_type: TokenType) -> Claims {
        Claims::new(
            Uuid::new_v4(),
            "ana@wizeline.com",
            UserRole::Admin,
            Some(Uuid::new_v4()),
            token_type,
        )
    }

    #[test]
    fn test_round_trip_keeps_role_and_profile() {
        let original = claims(TokenType::Access);
        let token = create_token(&original, SECRET).unwrap();

        let validated = validate_access_token(&token, SECRET).unwrap();
        assert_eq!(validated.sub, original.sub);
        assert_eq!(validated.role, UserRole::Admin);
        assert_eq!(validated.profile_id, original.profile_id);
        assert_eq!(validated.email, "ana@wizeline.com");
        assert_eq!(validated.iss, ISSUER);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(&claims(TokenType::Access), SECRET).unwrap();
        assert!(validate_token(&token, "another-secret-that-is-long-enough!!").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let expired = Claims::with_expiration(
            Uuid::new_v4(),
            "ana@wizeline.com",
            UserRole::User,
            None,
            TokenType::Access,
            Duration::hours(-1),
        );
        let token = create_token(&expired, SECRET).unwrap();

        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_token_type_is_enforced() {
        let refresh = create_token(&claims(TokenType::Refresh), SECRET).unwrap();
        let access = create_token(&claims(TokenType::Access), SECRET).unwrap();

        assert!(matches!(
            validate_access_token(&refresh, SECRET),
            Err(JwtError::WrongType { expected: "access", .. })
        ));
        assert!(validate_refresh_token(&access, SECRET).is_err());
        assert!(validate_refresh_token(&refresh, SECRET).is_ok());
    }

    #[test]
    fn test_issue_token_pair() {
        let pair = issue_token_pair(Uuid::new_v4(), "x@wizeline.com", UserRole::Intern, None, SECRET)
            .unwrap();

        assert_eq!(pair.token_type, "Bearer");
        assert!(pair.expires_in > 0 && pair.expires_in <= 24 * 3600);
        assert!(validate_access_token(&pair.access_token, SECRET).is_ok());
        assert!(validate_refresh_token(&pair.refresh_token, SECRET).is_ok());
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            validate_token("not.a.jwt", SECRET),
            Err(JwtError::ValidationError(_))
        ));
    }
}
