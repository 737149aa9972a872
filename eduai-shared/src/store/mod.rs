/// Record store abstraction
///
/// Every read and write the classroom needs goes through the [`Store`]
/// trait. Two implementations exist:
///
/// - [`PgStore`]: PostgreSQL via sqlx; multi-record writes run in one
///   transaction and uniqueness is re-checked inside the inserting statement
/// - [`MemoryStore`]: in-process maps behind one `RwLock`; each operation
///   holds the lock from check to write
///
/// Both give the same guarantees the coordinator relies on:
///
/// - `create_course_if_code_free` inserts the course together with its owner
///   membership, or nothing if the class code is taken
/// - `add_member` inserts an edge only if the user has none in that course
/// - `remove_member` never removes the owner edge
///
/// # Example
///
/// ```
/// use eduai_shared::store::{MemoryStore, Store};
/// use eduai_shared::models::user::{CreateUser, UserRole};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let user = store.create_user(CreateUser {
///     name: "Grace".to_string(),
///     email: "Grace@Example.com".to_string(),
///     password_hash: None,
///     external_id: None,
///     avatar_url: None,
///     role: UserRole::Teacher,
/// }).await?;
///
/// assert_eq!(user.email, "grace@example.com");
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::class_code::ClassCode;
use crate::models::announcement::{Announcement, CreateAnnouncement};
use crate::models::assignment::{Assignment, CreateAssignment};
use crate::models::chat_message::{ChatMessage, CreateChatMessage};
use crate::models::course::{Course, CourseSummary, CreateCourse};
use crate::models::lecture::{CreateLecture, Lecture};
use crate::models::membership::{CreateMembership, Membership};
use crate::models::user::{CreateUser, User};

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique field (email, external ID) is already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent records of users, courses, memberships, and course content
#[async_trait]
pub trait Store: Send + Sync {
    /// Verifies the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Creates a user; a taken email or external ID is a `Conflict`
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Case-insensitive email lookup
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_external_id(&self, external_id: &str) -> StoreResult<Option<User>>;

    /// Sets a user's identity-provider ID; `None` if the user doesn't exist
    async fn link_external_id(&self, user_id: Uuid, external_id: &str)
        -> StoreResult<Option<User>>;

    /// Loads the given users; unknown IDs are skipped
    async fn find_users(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;

    /// Inserts the course and its owner membership atomically
    ///
    /// Returns `None` (and writes nothing) if the class code is taken.
    async fn create_course_if_code_free(&self, data: CreateCourse) -> StoreResult<Option<Course>>;

    async fn find_course(&self, id: Uuid) -> StoreResult<Option<Course>>;

    async fn find_course_by_code(&self, code: &ClassCode) -> StoreResult<Option<Course>>;

    /// Courses the user participates in with the user's role, newest first
    async fn list_courses_for_user(&self, user_id: Uuid) -> StoreResult<Vec<CourseSummary>>;

    /// Inserts a membership edge unless the user already has one
    ///
    /// Returns `None` if an edge of any role exists.
    async fn add_member(&self, data: CreateMembership) -> StoreResult<Option<Membership>>;

    async fn find_membership(&self, course_id: Uuid, user_id: Uuid)
        -> StoreResult<Option<Membership>>;

    /// Removes a TA or student edge; returns whether anything was removed
    async fn remove_member(&self, course_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    /// All edges of a course (owner included), oldest first
    async fn list_members(&self, course_id: Uuid) -> StoreResult<Vec<Membership>>;

    /// All edges of a user, oldest first
    async fn list_memberships_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Membership>>;

    async fn create_announcement(&self, data: CreateAnnouncement) -> StoreResult<Announcement>;

    /// Newest first
    async fn list_announcements(&self, course_id: Uuid) -> StoreResult<Vec<Announcement>>;

    async fn create_assignment(&self, data: CreateAssignment) -> StoreResult<Assignment>;

    /// Earliest due date first
    async fn list_assignments(&self, course_id: Uuid) -> StoreResult<Vec<Assignment>>;

    async fn create_lecture(&self, data: CreateLecture) -> StoreResult<Lecture>;

    /// Newest first
    async fn list_lectures(&self, course_id: Uuid) -> StoreResult<Vec<Lecture>>;

    async fn create_chat_message(&self, data: CreateChatMessage) -> StoreResult<ChatMessage>;

    /// Oldest first
    async fn list_chat_messages(&self, course_id: Uuid) -> StoreResult<Vec<ChatMessage>>;
}
