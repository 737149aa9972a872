/// Course people endpoints (course teacher only)
///
/// - `POST /v1/courses/:id/people` - Add a student or TA by email
/// - `DELETE /v1/courses/:id/people/:user_id` - Remove a student or TA

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use eduai_shared::{
    auth::middleware::AuthContext,
    models::{course::CourseDetails, membership::CourseRole},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AddPersonRequest {
    pub email: String,

    /// `STUDENT` or `TA`
    pub role: CourseRole,
}

#[derive(Debug, Serialize)]
pub struct PeopleResponse {
    pub course: CourseDetails,
}

/// Adds an existing user to the course
///
/// # Endpoint
///
/// ```text
/// POST /v1/courses/:id/people
/// Authorization: Bearer <token>
///
/// { "email": "ta@example.com", "role": "TA" }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not the course teacher
/// - `422 Unprocessable Entity`: Role is `TEACHER`
/// - `404 Not Found`: Unknown course or email
/// - `409 Conflict`: User already has a role in the course
pub async fn add_person(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<AddPersonRequest>,
) -> ApiResult<Json<PeopleResponse>> {
    let course = state
        .classroom
        .add_person(course_id, auth.user_id, &req.email, req.role)
        .await?;

    Ok(Json(PeopleResponse { course }))
}

/// Removing someone who isn't in the course succeeds without change
pub async fn remove_person(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((course_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<PeopleResponse>> {
    let course = state
        .classroom
        .remove_person(course_id, auth.user_id, user_id)
        .await?;

    Ok(Json(PeopleResponse { course }))
}
