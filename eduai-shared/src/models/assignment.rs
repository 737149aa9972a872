/// Assignment model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE assignments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id),
///     title VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL,
///     due_date TIMESTAMPTZ NOT NULL,
///     max_score INTEGER NOT NULL CHECK (max_score > 0),
///     materials TEXT[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Course assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub course_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,

    /// Maximum achievable score, always positive
    pub max_score: i32,

    /// Links or file references handed out with the assignment
    pub materials: Vec<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for posting an assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssignment {
    pub course_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub max_score: i32,
    #[serde(default)]
    pub materials: Vec<String>,
}

impl Assignment {
    pub async fn create(pool: &PgPool, data: CreateAssignment) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments
                (course_id, author_id, title, description, due_date, max_score, materials)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, course_id, author_id, title, description, due_date,
                      max_score, materials, created_at
            "#,
        )
        .bind(data.course_id)
        .bind(data.author_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.max_score)
        .bind(data.materials)
        .fetch_one(pool)
        .await
    }

    /// Lists a course's assignments, earliest due date first
    pub async fn list_for_course(pool: &PgPool, course_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Assignment>(
            r#"
            SELECT id, course_id, author_id, title, description, due_date,
                   max_score, materials, created_at
            FROM assignments
            WHERE course_id = $1
            ORDER BY due_date ASC, created_at ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }
}
