/// User endpoints
///
/// - `GET /v1/users/me` - Current user and their courses by role
/// - `POST /v1/users/sync` - Identity-provider account sync
/// - `GET /v1/users/external/:external_id` - User and courses by identity-provider ID
///
/// The sync and lookup endpoints are called server-to-server by the identity
/// provider and are authenticated with the `X-Sync-Secret` header instead of
/// a bearer token. They are disabled (503) until `IDENTITY_SYNC_SECRET` is
/// configured.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use eduai_shared::{
    auth::middleware::AuthContext,
    classroom::{accounts::ExternalProfile, UserCourses},
    models::user::User,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Header carrying the identity-provider shared secret
pub const SYNC_SECRET_HEADER: &str = "x-sync-secret";

/// A user and the courses they teach, assist, or attend
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,

    #[serde(flatten)]
    pub courses: UserCourses,
}

/// Sync request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[validate(length(min = 1, max = 255, message = "External ID is required"))]
    pub external_id: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(
        url(message = "Invalid avatar URL"),
        length(max = 1024, message = "Avatar URL must be at most 1024 characters")
    )]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub user: User,
    pub created: bool,
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MeResponse>> {
    let user = state
        .store()
        .find_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let courses = state.classroom.user_courses(user.id).await?;

    Ok(Json(MeResponse { user, courses }))
}

/// Finds, links, or creates the account for an identity-provider profile
///
/// Returns `201 Created` when a new account was created, `200 OK` otherwise.
pub async fn sync(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SyncRequest>,
) -> ApiResult<(StatusCode, Json<SyncResponse>)> {
    require_sync_secret(&state, &headers)?;
    req.validate()?;

    let synced = state
        .classroom
        .sync_user(ExternalProfile {
            external_id: req.external_id,
            email: req.email,
            name: req.name,
            avatar_url: req.avatar_url,
        })
        .await?;

    let status = if synced.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(SyncResponse {
            user: synced.user,
            created: synced.created,
        }),
    ))
}

/// Looks up a user by identity-provider ID
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or wrong sync secret
/// - `404 Not Found`: No account carries that ID
pub async fn get_by_external_id(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(external_id): Path<String>,
) -> ApiResult<Json<MeResponse>> {
    require_sync_secret(&state, &headers)?;

    let user = state.classroom.external_user(&external_id).await?;
    let courses = state.classroom.user_courses(user.id).await?;

    Ok(Json(MeResponse { user, courses }))
}

fn require_sync_secret(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let expected = state
        .config
        .identity_sync_secret
        .as_deref()
        .ok_or_else(|| ApiError::ServiceUnavailable("User sync is not configured".to_string()))?;

    let provided = headers
        .get(SYNC_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !secrets_match(provided, expected) {
        return Err(ApiError::Unauthorized("Invalid sync secret".to_string()));
    }

    Ok(())
}

/// Compares without short-circuiting on the first differing byte
fn secrets_match(provided: &str, expected: &str) -> bool {
    let (a, b) = (provided.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
