use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{bearer_token, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Verify the bearer token on the request and return its claims.
fn verified_claims(state: &AppState, headers: &HeaderMap) -> Result<Claims, ApiError> {
    let header = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
    let token = bearer_token(header)?;
    Ok(state.tokens.verify(token)?)
}

/// Gate for user-scoped routes. Inserts [`crate::auth::UserIdentity`].
pub async fn require_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = verified_claims(&state, &headers)?.user_identity()?;
    tracing::debug!("Authenticated user {}", identity.user_id);
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Gate for admin-scoped routes. Inserts [`crate::auth::AdminIdentity`].
pub async fn require_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = verified_claims(&state, &headers)?.admin_identity()?;
    tracing::debug!("Authenticated admin {} ({})", identity.email, identity.role);
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
