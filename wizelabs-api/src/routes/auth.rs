/// Authentication endpoints
///
/// - `GET  /auth/login`: redirect to the identity provider
/// - `GET  /auth/callback`: finish the provider flow and open a session
/// - `POST /auth/refresh`: trade a refresh token for fresh tokens
/// - `POST /auth/logout`: clear the session cookie
///
/// The callback returns the tokens in the body for API clients and also sets
/// the access token as the `wizelabs_session` cookie for the browser app.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    oauth::generate_state,
};
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use wizelabs_shared::{
    auth::{
        jwt::{self, TokenPair, TokenType},
        login::complete_login,
        middleware::{cookie_value, SESSION_COOKIE},
    },
    models::{profile::Profile, user::User},
};

/// Cookie carrying the OAuth `state` between login and callback
pub const STATE_COOKIE: &str = "wizelabs_oauth_state";

const STATE_MAX_AGE_SECS: i64 = 600;

fn build_cookie(name: &str, value: &str, path: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite=Lax",
        name, value, path, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn session_cookie(state: &AppState, access_token: &str) -> String {
    build_cookie(
        SESSION_COOKIE,
        access_token,
        "/",
        TokenType::Access.default_expiration().num_seconds(),
        state.config.api.production,
    )
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,

    /// Set by the provider when the user denied consent
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub profile_id: Option<Uuid>,

    /// True on the user's first login
    pub created: bool,

    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Starts the authorization-code flow
///
/// Responds `303 See Other` to the provider's authorize URL and stores the
/// random `state` in a short-lived cookie scoped to `/auth`.
pub async fn login(State(state): State<AppState>) -> ApiResult<Response> {
    let oauth_state = generate_state();
    let url = state.oauth.authorize_url(&oauth_state)?;

    let cookie = build_cookie(
        STATE_COOKIE,
        &oauth_state,
        "/auth",
        STATE_MAX_AGE_SECS,
        state.config.api.production,
    );

    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Redirect::to(&url)).into_response())
}

/// Completes the flow started by [`login`]
///
/// # Errors
///
/// - `400 Bad Request`: missing code, or `state` does not match the cookie
/// - `401 Unauthorized`: provider refused the code or the email is unverified
/// - `503 Service Unavailable`: provider unreachable
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Response> {
    if let Some(error) = query.error {
        return Err(ApiError::Unauthorized(format!("Login was not completed: {}", error)));
    }

    let expected = cookie_value(&headers, STATE_COOKIE)
        .ok_or_else(|| ApiError::BadRequest("Missing login state".to_string()))?;
    if query.state.as_deref() != Some(expected) {
        tracing::warn!("OAuth state mismatch on callback");
        return Err(ApiError::BadRequest("Login state does not match".to_string()));
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing authorization code".to_string()))?;

    let token = state.oauth.exchange_code(&code).await?;
    let identity = state.oauth.user_info(&token.access_token).await?;

    let outcome = complete_login(&state.db, &identity, &state.config.role_policy()).await?;

    let tokens = jwt::issue_token_pair(
        outcome.user.id,
        &outcome.user.email,
        outcome.user.role,
        outcome.profile_id,
        state.jwt_secret(),
    )?;

    tracing::info!(
        user_id = %outcome.user.id,
        role = %outcome.user.role,
        created = outcome.created,
        "User logged in"
    );

    let cookies = AppendHeaders([
        (header::SET_COOKIE, session_cookie(&state, &tokens.access_token)),
        (
            header::SET_COOKIE,
            build_cookie(STATE_COOKIE, "", "/auth", 0, state.config.api.production),
        ),
    ]);

    let body = LoginResponse {
        user_id: outcome.user.id,
        email: outcome.user.email,
        role: outcome.user.role.to_string(),
        profile_id: outcome.profile_id,
        created: outcome.created,
        tokens,
    };

    Ok((cookies, Json(body)).into_response())
}

/// Issues new tokens from a refresh token
///
/// The user is re-read so that role changes (an admin grant or revoke) take
/// effect on the next refresh.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Response> {
    req.validate()?;

    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    let profile_id = if user.role.has_profile() {
        Profile::find_by_email(&state.db, &user.email)
            .await?
            .map(|p| p.id)
    } else {
        None
    };

    let tokens = jwt::issue_token_pair(user.id, &user.email, user.role, profile_id, state.jwt_secret())?;

    let cookie = session_cookie(&state, &tokens.access_token);
    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(tokens)).into_response())
}

pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = build_cookie(SESSION_COOKIE, "", "/", 0, state.config.api.production);
    (StatusCode::NO_CONTENT, AppendHeaders([(header::SET_COOKIE, cookie)])).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_attributes() {
        let cookie = build_cookie("wizelabs_session", "abc", "/", 86400, false);
        assert_eq!(cookie, "wizelabs_session=abc; Path=/; Max-Age=86400; HttpOnly; SameSite=Lax");

        let secure = build_cookie(STATE_COOKIE, "xyz", "/auth", 600, true);
        assert!(secure.ends_with("; Secure"));
        assert!(secure.contains("Path=/auth"));
    }

    #[test]
    fn test_cleared_cookie_expires_immediately() {
        let cookie = build_cookie(SESSION_COOKIE, "", "/", 0, false);
        assert!(cookie.starts_with("wizelabs_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
