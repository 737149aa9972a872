/// Lecture model and database operations
///
/// Lecture materials are free-form JSON supplied by the client (slides,
/// links, transcripts); the server only requires an array.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE lectures (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id),
///     title VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL,
///     materials JSONB NOT NULL DEFAULT '[]',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Course lecture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub id: Uuid,
    pub course_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: String,

    /// JSON array of material descriptors
    pub materials: JsonValue,

    /// Upload date
    pub created_at: DateTime<Utc>,
}

/// Input for posting a lecture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLecture {
    pub course_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    pub materials: JsonValue,
}

impl Lecture {
    pub async fn create(pool: &PgPool, data: CreateLecture) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Lecture>(
            r#"
            INSERT INTO lectures (course_id, author_id, title, description, materials)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, course_id, author_id, title, description, materials, created_at
            "#,
        )
        .bind(data.course_id)
        .bind(data.author_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.materials)
        .fetch_one(pool)
        .await
    }

    /// Lists a course's lectures, newest first
    pub async fn list_for_course(pool: &PgPool, course_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lecture>(
            r#"
            SELECT id, course_id, author_id, title, description, materials, created_at
            FROM lectures
            WHERE course_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }
}
