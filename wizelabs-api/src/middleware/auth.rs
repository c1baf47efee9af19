/// Session authentication for the `/v1` routes
///
/// Accepts the access token from `Authorization: Bearer` or the
/// `wizelabs_session` cookie and injects an [`AuthContext`] into the request
/// extensions for handlers to extract.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use wizelabs_shared::auth::middleware::{authenticate, AuthContext};

use crate::{app::AppState, error::ApiError};

pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth: AuthContext = authenticate(req.headers(), state.jwt_secret())?;

    tracing::debug!(user_id = %auth.user_id, role = %auth.role, "Authenticated request");
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
