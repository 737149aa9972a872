/// Chat message model and database operations
///
/// Course chat is append-only; messages are never edited or deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE chat_messages (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id),
///     content VARCHAR(4000) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Maximum chat message length (characters)
pub const MAX_CHAT_MESSAGE_LENGTH: usize = 4000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub course_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChatMessage {
    pub course_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
}

impl ChatMessage {
    pub async fn create(pool: &PgPool, data: CreateChatMessage) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (course_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, course_id, author_id, content, created_at
            "#,
        )
        .bind(data.course_id)
        .bind(data.author_id)
        .bind(data.content)
        .fetch_one(pool)
        .await
    }

    /// Lists a course's chat in posting order
    pub async fn list_for_course(pool: &PgPool, course_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, course_id, author_id, content, created_at
            FROM chat_messages
            WHERE course_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }
}
