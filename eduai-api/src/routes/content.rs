/// Course content endpoints
///
/// | Method | Path                             | Who may call            |
/// |--------|----------------------------------|-------------------------|
/// | POST   | `/v1/courses/:id/announcements`  | teacher, TA             |
/// | POST   | `/v1/courses/:id/assignments`    | teacher, TA             |
/// | POST   | `/v1/courses/:id/lectures`       | teacher, TA             |
/// | POST   | `/v1/courses/:id/chat`           | teacher, TA, student    |
/// | GET    | any of the above                 | teacher, TA, student    |
///
/// POSTs return `201 Created` with the item and its author. The author is
/// always the caller.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use eduai_shared::{
    auth::middleware::AuthContext,
    classroom::content::{Authored, NewAnnouncement, NewAssignment, NewLecture},
    models::{
        announcement::Announcement, assignment::Assignment, chat_message::ChatMessage,
        lecture::Lecture,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

type Created<T> = (StatusCode, Json<T>);

#[derive(Debug, Serialize)]
pub struct AnnouncementResponse {
    pub announcement: Authored<Announcement>,
}

#[derive(Debug, Serialize)]
pub struct AnnouncementListResponse {
    pub announcements: Vec<Authored<Announcement>>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub assignment: Authored<Assignment>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentListResponse {
    pub assignments: Vec<Authored<Assignment>>,
}

#[derive(Debug, Serialize)]
pub struct LectureResponse {
    pub lecture: Authored<Lecture>,
}

#[derive(Debug, Serialize)]
pub struct LectureListResponse {
    pub lectures: Vec<Authored<Lecture>>,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessageRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatMessageResponse {
    pub message: Authored<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessageListResponse {
    pub messages: Vec<Authored<ChatMessage>>,
}

pub async fn post_announcement(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<NewAnnouncement>,
) -> ApiResult<Created<AnnouncementResponse>> {
    let announcement = state
        .classroom
        .post_announcement(course_id, auth.user_id, req)
        .await?;

    Ok((StatusCode::CREATED, Json(AnnouncementResponse { announcement })))
}

/// Newest first
pub async fn list_announcements(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<AnnouncementListResponse>> {
    let announcements = state
        .classroom
        .list_announcements(course_id, auth.user_id)
        .await?;

    Ok(Json(AnnouncementListResponse { announcements }))
}

/// `due_date` is RFC 3339; `max_score` must be positive
pub async fn post_assignment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<NewAssignment>,
) -> ApiResult<Created<AssignmentResponse>> {
    let assignment = state
        .classroom
        .post_assignment(course_id, auth.user_id, req)
        .await?;

    Ok((StatusCode::CREATED, Json(AssignmentResponse { assignment })))
}

/// Earliest due date first
pub async fn list_assignments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<AssignmentListResponse>> {
    let assignments = state
        .classroom
        .list_assignments(course_id, auth.user_id)
        .await?;

    Ok(Json(AssignmentListResponse { assignments }))
}

pub async fn post_lecture(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<NewLecture>,
) -> ApiResult<Created<LectureResponse>> {
    let lecture = state
        .classroom
        .post_lecture(course_id, auth.user_id, req)
        .await?;

    Ok((StatusCode::CREATED, Json(LectureResponse { lecture })))
}

pub async fn list_lectures(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<LectureListResponse>> {
    let lectures = state.classroom.list_lectures(course_id, auth.user_id).await?;

    Ok(Json(LectureListResponse { lectures }))
}

pub async fn post_chat_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<ChatMessageRequest>,
) -> ApiResult<Created<ChatMessageResponse>> {
    let message = state
        .classroom
        .post_chat_message(course_id, auth.user_id, &req.content)
        .await?;

    Ok((StatusCode::CREATED, Json(ChatMessageResponse { message })))
}

/// Oldest first
pub async fn list_chat_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<ChatMessageListResponse>> {
    let messages = state
        .classroom
        .list_chat_messages(course_id, auth.user_id)
        .await?;

    Ok(Json(ChatMessageListResponse { messages }))
}
