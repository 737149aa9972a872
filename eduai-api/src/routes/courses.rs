/// Course endpoints
///
/// - `POST /v1/courses` - Create a course owned by the caller
/// - `GET /v1/courses` - Courses the caller teaches, assists, or attends
/// - `POST /v1/courses/join` - Join a course by class code
/// - `GET /v1/courses/:id` - Course with its people (participants only)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use eduai_shared::{
    auth::middleware::AuthContext,
    classroom::CourseOverview,
    models::course::{CourseDetails, CourseSummary},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub course: CourseDetails,
}

#[derive(Debug, Serialize)]
pub struct CourseListResponse {
    pub courses: Vec<CourseSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinCourseRequest {
    #[serde(default)]
    pub class_code: String,
}

#[derive(Debug, Serialize)]
pub struct JoinCourseResponse {
    pub course: CourseDetails,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CourseOverviewResponse {
    pub course: CourseOverview,
}

/// Creates a course with a fresh class code
///
/// # Endpoint
///
/// ```text
/// POST /v1/courses
/// Authorization: Bearer <token>
///
/// { "name": "Algebra I", "description": "Linear equations" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Empty or overlong name/description
/// - `500 Internal Server Error`: No free class code found
pub async fn create_course(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCourseRequest>,
) -> ApiResult<(StatusCode, Json<CourseResponse>)> {
    let course = state
        .classroom
        .create_course(auth.user_id, &req.name, &req.description)
        .await?;

    Ok((StatusCode::CREATED, Json(CourseResponse { course })))
}

/// Newest first
pub async fn list_courses(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<CourseListResponse>> {
    let courses = state.classroom.list_courses(auth.user_id).await?;

    Ok(Json(CourseListResponse { courses }))
}

/// Enrolls the caller as a student
///
/// # Endpoint
///
/// ```text
/// POST /v1/courses/join
/// Authorization: Bearer <token>
///
/// { "classCode": "ABC123D" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Empty class code
/// - `404 Not Found`: No course with that code
/// - `400 Bad Request`: Already enrolled
/// - `409 Conflict`: Caller is the course's teacher or a TA
pub async fn join_course(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<JoinCourseRequest>,
) -> ApiResult<Json<JoinCourseResponse>> {
    let course = state
        .classroom
        .join_course(&req.class_code, auth.user_id)
        .await?;

    let message = format!("Successfully joined {}", course.course.name);
    Ok(Json(JoinCourseResponse { course, message }))
}

pub async fn get_course(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<CourseOverviewResponse>> {
    let course = state.classroom.get_course(course_id, auth.user_id).await?;

    Ok(Json(CourseOverviewResponse { course }))
}
