/// Course membership model and database operations
///
/// A membership is the single edge between a user and a course. A course's
/// TA and student lists and a user's enrolled-course lists are both derived
/// from this table, so the two sides can never disagree, and the primary key
/// guarantees a user holds at most one role per course.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE course_role AS ENUM ('owner', 'assistant', 'member');
///
/// CREATE TABLE memberships (
///     course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role course_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (course_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **owner** (`TEACHER` on the wire): the course's teacher, exactly one per
///   course, created together with the course and never removed
/// - **assistant** (`TA`): may post course content
/// - **member** (`STUDENT`): may read content and post chat messages
///
/// # Example
///
/// ```no_run
/// use eduai_shared::models::membership::{CourseRole, CreateMembership, Membership};
/// use eduai_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let course_id = Uuid::new_v4();
/// let user_id = Uuid::new_v4();
///
/// // None means the user already had a role in this course
/// let added = Membership::insert_if_absent(&pool, CreateMembership {
///     course_id,
///     user_id,
///     role: CourseRole::Member,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// A user's role within one course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "course_role", rename_all = "lowercase")]
pub enum CourseRole {
    /// The course teacher
    #[serde(rename = "TEACHER")]
    Owner,

    /// Teaching assistant
    #[serde(rename = "TA")]
    Assistant,

    /// Enrolled student
    #[serde(rename = "STUDENT")]
    Member,
}

impl CourseRole {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseRole::Owner => "TEACHER",
            CourseRole::Assistant => "TA",
            CourseRole::Member => "STUDENT",
        }
    }

    /// Whether this role may post announcements, assignments, and lectures
    pub fn can_manage_content(&self) -> bool {
        matches!(self, CourseRole::Owner | CourseRole::Assistant)
    }

    /// Whether this role can be granted through the people endpoints
    pub fn is_assignable(&self) -> bool {
        !matches!(self, CourseRole::Owner)
    }
}

/// Membership edge between a course and a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    pub course_id: Uuid,

    pub user_id: Uuid,

    /// Role within the course
    pub role: CourseRole,

    /// When the user joined or was added
    pub created_at: DateTime<Utc>,
}

/// Input for creating a membership edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub course_id: Uuid,

    pub user_id: Uuid,

    /// Role to assign (defaults to Member)
    #[serde(default = "default_role")]
    pub role: CourseRole,
}

fn default_role() -> CourseRole {
    CourseRole::Member
}

impl Membership {
    /// Inserts the edge unless the user already has one in this course
    ///
    /// The existence check and the insert are a single statement, so two
    /// concurrent calls for the same pair cannot both succeed.
    ///
    /// # Returns
    ///
    /// The new membership, or `None` if an edge (of any role) already exists
    ///
    /// # Errors
    ///
    /// Returns an error if the course or user doesn't exist (foreign key
    /// violation) or the database connection fails.
    pub async fn insert_if_absent<'e, E>(
        executor: E,
        data: CreateMembership,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (course_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (course_id, user_id) DO NOTHING
            RETURNING course_id, user_id, role, created_at
            "#,
        )
        .bind(data.course_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_optional(executor)
        .await
    }

    /// Finds the edge for a course and user
    pub async fn find(
        pool: &PgPool,
        course_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Membership>(
            r#"
            SELECT course_id, user_id, role, created_at
            FROM memberships
            WHERE course_id = $1 AND user_id = $2
            "#,
        )
        .bind(course_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Removes a TA or student from a course
    ///
    /// The owner edge is never deleted. Returns true if a row was removed.
    pub async fn delete_participant(
        pool: &PgPool,
        course_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM memberships
            WHERE course_id = $1 AND user_id = $2 AND role <> 'owner'
            "#,
        )
        .bind(course_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists every edge of a course, oldest first
    pub async fn list_for_course(pool: &PgPool, course_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Membership>(
            r#"
            SELECT course_id, user_id, role, created_at
            FROM memberships
            WHERE course_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    /// Lists every edge of a user, oldest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Membership>(
            r#"
            SELECT course_id, user_id, role, created_at
            FROM memberships
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
