/// Announcement model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE announcements (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id),
///     title VARCHAR(200) NOT NULL,
///     content TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Course announcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: Uuid,
    pub course_id: Uuid,

    /// The teacher or TA who posted it
    pub author_id: Uuid,

    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Input for posting an announcement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAnnouncement {
    pub course_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
}

impl Announcement {
    pub async fn create(pool: &PgPool, data: CreateAnnouncement) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Announcement>(
            r#"
            INSERT INTO announcements (course_id, author_id, title, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, course_id, author_id, title, content, created_at
            "#,
        )
        .bind(data.course_id)
        .bind(data.author_id)
        .bind(data.title)
        .bind(data.content)
        .fetch_one(pool)
        .await
    }

    /// Lists a course's announcements, newest first
    pub async fn list_for_course(pool: &PgPool, course_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Announcement>(
            r#"
            SELECT id, course_id, author_id, title, content, created_at
            FROM announcements
            WHERE course_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }
}
