/// Bearer-token authentication
///
/// Validates the access token on every protected route and injects the
/// caller's [`AuthContext`] into request extensions. Handlers read the
/// caller's identity from there and nowhere else.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use eduai_shared::auth::middleware::{authenticate, AuthContext};
use tracing::debug;

use crate::{app::AppState, error::ApiError};

/// JWT authentication middleware layer
pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth: AuthContext = authenticate(req.headers(), state.jwt_secret()).map_err(|e| {
        debug!(error = %e, path = %req.uri().path(), "Rejected request");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
