/// PostgreSQL store
///
/// Thin composition of the model queries in `crate::models`. Course creation
/// is the only multi-statement write and runs in a transaction.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::class_code::ClassCode;
use crate::db::pool::health_check;
use crate::models::announcement::{Announcement, CreateAnnouncement};
use crate::models::assignment::{Assignment, CreateAssignment};
use crate::models::chat_message::{ChatMessage, CreateChatMessage};
use crate::models::course::{Course, CourseSummary, CreateCourse};
use crate::models::lecture::{CreateLecture, Lecture};
use crate::models::membership::{CourseRole, CreateMembership, Membership};
use crate::models::user::{CreateUser, User};

/// PostgreSQL unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Turns a unique-constraint violation into `StoreError::Conflict`
fn conflict_on_unique(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::Conflict(format!("{} already exists", what));
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        User::create(&self.pool, data)
            .await
            .map_err(|e| conflict_on_unique(e, "user"))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_external_id(&self.pool, external_id).await?)
    }

    async fn link_external_id(
        &self,
        user_id: Uuid,
        external_id: &str,
    ) -> StoreResult<Option<User>> {
        User::set_external_id(&self.pool, user_id, external_id)
            .await
            .map_err(|e| conflict_on_unique(e, "external id"))
    }

    async fn find_users(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        Ok(User::find_many(&self.pool, ids).await?)
    }

    async fn create_course_if_code_free(&self, data: CreateCourse) -> StoreResult<Option<Course>> {
        let mut tx = self.pool.begin().await?;

        let Some(course) = Course::insert_if_code_free(&mut *tx, &data).await? else {
            tx.rollback().await?;
            debug!(class_code = %data.class_code, "Class code already taken");
            return Ok(None);
        };

        Membership::insert_if_absent(
            &mut *tx,
            CreateMembership {
                course_id: course.id,
                user_id: course.teacher_id,
                role: CourseRole::Owner,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(Some(course))
    }

    async fn find_course(&self, id: Uuid) -> StoreResult<Option<Course>> {
        Ok(Course::find_by_id(&self.pool, id).await?)
    }

    async fn find_course_by_code(&self, code: &ClassCode) -> StoreResult<Option<Course>> {
        Ok(Course::find_by_code(&self.pool, code).await?)
    }

    async fn list_courses_for_user(&self, user_id: Uuid) -> StoreResult<Vec<CourseSummary>> {
        Ok(Course::list_for_user(&self.pool, user_id).await?)
    }

    async fn add_member(&self, data: CreateMembership) -> StoreResult<Option<Membership>> {
        Ok(Membership::insert_if_absent(&self.pool, data).await?)
    }

    async fn find_membership(
        &self,
        course_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        Ok(Membership::find(&self.pool, course_id, user_id).await?)
    }

    async fn remove_member(&self, course_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(Membership::delete_participant(&self.pool, course_id, user_id).await?)
    }

    async fn list_members(&self, course_id: Uuid) -> StoreResult<Vec<Membership>> {
        Ok(Membership::list_for_course(&self.pool, course_id).await?)
    }

    async fn list_memberships_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Membership>> {
        Ok(Membership::list_for_user(&self.pool, user_id).await?)
    }

    async fn create_announcement(&self, data: CreateAnnouncement) -> StoreResult<Announcement> {
        Ok(Announcement::create(&self.pool, data).await?)
    }

    async fn list_announcements(&self, course_id: Uuid) -> StoreResult<Vec<Announcement>> {
        Ok(Announcement::list_for_course(&self.pool, course_id).await?)
    }

    async fn create_assignment(&self, data: CreateAssignment) -> StoreResult<Assignment> {
        Ok(Assignment::create(&self.pool, data).await?)
    }

    async fn list_assignments(&self, course_id: Uuid) -> StoreResult<Vec<Assignment>> {
        Ok(Assignment::list_for_course(&self.pool, course_id).await?)
    }

    async fn create_lecture(&self, data: CreateLecture) -> StoreResult<Lecture> {
        Ok(Lecture::create(&self.pool, data).await?)
    }

    async fn list_lectures(&self, course_id: Uuid) -> StoreResult<Vec<Lecture>> {
        Ok(Lecture::list_for_course(&self.pool, course_id).await?)
    }

    async fn create_chat_message(&self, data: CreateChatMessage) -> StoreResult<ChatMessage> {
        Ok(ChatMessage::create(&self.pool, data).await?)
    }

    async fn list_chat_messages(&self, course_id: Uuid) -> StoreResult<Vec<ChatMessage>> {
        Ok(ChatMessage::list_for_course(&self.pool, course_id).await?)
    }
}
