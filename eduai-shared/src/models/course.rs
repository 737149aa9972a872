/// Course model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE courses (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL,
///     class_code VARCHAR(7) NOT NULL UNIQUE CHECK (class_code ~ '^[a-z0-9]{7}$'),
///     teacher_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `class_code` and `teacher_id` never change after creation. TA and student
/// lists are not stored on the course; they come from
/// [`Membership`](super::membership::Membership) edges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::class_code::ClassCode;
use crate::models::membership::{CourseRole, Membership};

/// Course record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,

    pub name: String,

    pub description: String,

    /// Public join code, unique, `[a-z0-9]{7}`
    pub class_code: String,

    /// The course owner
    pub teacher_id: Uuid,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a course
#[derive(Debug, Clone)]
pub struct CreateCourse {
    pub name: String,
    pub description: String,
    pub class_code: ClassCode,
    pub teacher_id: Uuid,
}

/// A course with its TA and student lists
///
/// The lists are derived from the course's membership edges; the owner
/// appears in neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetails {
    #[serde(flatten)]
    pub course: Course,

    pub ta_ids: Vec<Uuid>,

    pub student_ids: Vec<Uuid>,
}

impl CourseDetails {
    /// Builds the details from the course's membership edges
    ///
    /// Edges belonging to other courses are ignored.
    pub fn from_memberships(course: Course, memberships: &[Membership]) -> Self {
        let mut ta_ids = Vec::new();
        let mut student_ids = Vec::new();

        for membership in memberships.iter().filter(|m| m.course_id == course.id) {
            match membership.role {
                CourseRole::Owner => {}
                CourseRole::Assistant => ta_ids.push(membership.user_id),
                CourseRole::Member => student_ids.push(membership.user_id),
            }
        }

        Self {
            course,
            ta_ids,
            student_ids,
        }
    }

    /// The user's role in this course, if any
    pub fn role_of(&self, user_id: Uuid) -> Option<CourseRole> {
        if self.course.teacher_id == user_id {
            Some(CourseRole::Owner)
        } else if self.ta_ids.contains(&user_id) {
            Some(CourseRole::Assistant)
        } else if self.student_ids.contains(&user_id) {
            Some(CourseRole::Member)
        } else {
            None
        }
    }
}

/// A course as seen from one of its participants
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub class_code: String,
    pub teacher_id: Uuid,

    /// The viewing user's role in this course
    pub role: CourseRole,

    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Inserts the course unless its class code is already taken
    ///
    /// Uniqueness is enforced by the insert itself (`ON CONFLICT DO
    /// NOTHING`), so a code taken by a concurrent insert shows up here as
    /// `None` rather than as a constraint error.
    pub async fn insert_if_code_free<'e, E>(
        executor: E,
        data: &CreateCourse,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (name, description, class_code, teacher_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (class_code) DO NOTHING
            RETURNING id, name, description, class_code, teacher_id, created_at, updated_at
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.class_code.as_str())
        .bind(data.teacher_id)
        .fetch_optional(executor)
        .await
    }

    /// Finds a course by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Course>(
            r#"
            SELECT id, name, description, class_code, teacher_id, created_at, updated_at
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a course by its class code
    pub async fn find_by_code(
        pool: &PgPool,
        code: &ClassCode,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Course>(
            r#"
            SELECT id, name, description, class_code, teacher_id, created_at, updated_at
            FROM courses
            WHERE class_code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(pool)
        .await
    }

    /// Lists every course the user participates in, newest first
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<CourseSummary>, sqlx::Error> {
        sqlx::query_as::<_, CourseSummary>(
            r#"
            SELECT c.id, c.name, c.description, c.class_code, c.teacher_id,
                   m.role, c.created_at
            FROM courses c
            JOIN memberships m ON m.course_id = c.id
            WHERE m.user_id = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Builds the summary of this course for a participant with `role`
    pub fn summary_for(&self, role: CourseRole) -> CourseSummary {
        CourseSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            class_code: self.class_code.clone(),
            teacher_id: self.teacher_id,
            role,
            created_at: self.created_at,
        }
    }
}
