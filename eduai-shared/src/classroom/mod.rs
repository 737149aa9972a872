/// Course membership coordinator
///
/// [`Classroom`] owns every operation that changes who belongs to a course
/// and every content operation that depends on it. It validates input, looks
/// records up through the [`Store`], consults the authorization gate, and
/// performs the write.
///
/// # Class code issuance
///
/// Course creation draws candidate codes from the configured
/// [`CodeGenerator`] and asks the store to insert the course only if the code
/// is free. A taken code is a collision and the next candidate is tried, up
/// to `max_code_attempts` candidates in total; after that the operation
/// fails with [`ClassroomError::CodeExhaustion`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use eduai_shared::class_code::FriendlyCodes;
/// use eduai_shared::classroom::{Classroom, ClassroomConfig};
/// use eduai_shared::models::user::{CreateUser, UserRole};
/// use eduai_shared::store::{MemoryStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let classroom = Classroom::new(store.clone(), Arc::new(FriendlyCodes), ClassroomConfig::default());
///
/// let teacher = store.create_user(CreateUser {
///     name: "Ms. Frizzle".to_string(),
///     email: "frizzle@example.com".to_string(),
///     password_hash: None,
///     external_id: None,
///     avatar_url: None,
///     role: UserRole::Teacher,
/// }).await?;
///
/// let course = classroom.create_course(teacher.id, "Science", "Field trips").await?;
/// assert!(course.student_ids.is_empty());
/// # Ok(())
/// # }
/// ```

pub mod accounts;
pub mod content;
pub mod membership;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::authorization::{require_participant, AuthzError};
use crate::class_code::CodeGenerator;
use crate::models::course::{Course, CourseDetails, CourseSummary, CreateCourse};
use crate::models::membership::CourseRole;
use crate::models::user::{User, UserSummary};
use crate::store::{Store, StoreError};

/// Longest accepted course name or content title (characters)
pub const MAX_NAME_LENGTH: usize = 200;

/// Longest accepted description or content body (characters)
pub const MAX_TEXT_LENGTH: usize = 5000;

/// Default number of class code candidates tried per course creation
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 10;

/// Error type for classroom operations
#[derive(Debug, thiserror::Error)]
pub enum ClassroomError {
    /// Input failed validation
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Course not found")]
    CourseNotFound,

    #[error("User not found")]
    UserNotFound,

    /// The student is already enrolled in the course
    #[error("You are already enrolled in this course")]
    AlreadyEnrolled,

    /// The user already has a role in the course
    #[error("User is already in this course")]
    AlreadyMember,

    #[error("{0}")]
    Forbidden(String),

    /// Every class code candidate collided
    #[error("Could not generate a unique class code after {attempts} attempts")]
    CodeExhaustion { attempts: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ClassroomError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ClassroomError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<AuthzError> for ClassroomError {
    fn from(err: AuthzError) -> Self {
        ClassroomError::Forbidden(err.to_string())
    }
}

pub type ClassroomResult<T> = Result<T, ClassroomError>;

/// Tunables for the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassroomConfig {
    /// Class code candidates tried before giving up (at least 1)
    pub max_code_attempts: u32,
}

impl Default for ClassroomConfig {
    fn default() -> Self {
        Self {
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }
}

/// Everyone in a course, with display fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct People {
    pub teacher: Option<UserSummary>,
    pub tas: Vec<UserSummary>,
    pub students: Vec<UserSummary>,
}

/// A course as returned to one of its participants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseOverview {
    #[serde(flatten)]
    pub details: CourseDetails,

    pub people: People,

    /// The caller's role in this course
    pub your_role: CourseRole,
}

/// A user's courses split by role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCourses {
    pub taught_course_ids: Vec<Uuid>,
    pub ta_course_ids: Vec<Uuid>,
    pub student_course_ids: Vec<Uuid>,
}

/// The course membership coordinator
#[derive(Clone)]
pub struct Classroom {
    store: Arc<dyn Store>,
    codes: Arc<dyn CodeGenerator>,
    config: ClassroomConfig,
}

impl Classroom {
    pub fn new(
        store: Arc<dyn Store>,
        codes: Arc<dyn CodeGenerator>,
        config: ClassroomConfig,
    ) -> Self {
        Self {
            store,
            codes,
            config,
        }
    }

    /// The record store behind this coordinator
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn config(&self) -> ClassroomConfig {
        self.config
    }

    /// Creates a course owned by `teacher_id` with a fresh class code
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty or overlong name or description
    /// - `UserNotFound` if the teacher doesn't exist
    /// - `CodeExhaustion` if every candidate code was already taken
    pub async fn create_course(
        &self,
        teacher_id: Uuid,
        name: &str,
        description: &str,
    ) -> ClassroomResult<CourseDetails> {
        let name = required_text("name", name, MAX_NAME_LENGTH)?;
        let description = required_text("description", description, MAX_TEXT_LENGTH)?;

        self.require_user(teacher_id).await?;

        let attempts = self.config.max_code_attempts;
        for attempt in 1..=attempts {
            let class_code = self.codes.generate();
            let data = CreateCourse {
                name: name.clone(),
                description: description.clone(),
                class_code: class_code.clone(),
                teacher_id,
            };

            if let Some(course) = self.store.create_course_if_code_free(data).await? {
                info!(
                    course_id = %course.id,
                    class_code = %course.class_code,
                    teacher_id = %teacher_id,
                    attempt,
                    "Course created"
                );
                return Ok(CourseDetails::from_memberships(course, &[]));
            }

            warn!(attempt, class_code = %class_code, "Class code collision");
        }

        Err(ClassroomError::CodeExhaustion { attempts })
    }

    /// Loads a course with its participants; callers must be participants
    pub async fn get_course(&self, course_id: Uuid, caller_id: Uuid) -> ClassroomResult<CourseOverview> {
        let details = self.course_details(course_id).await?;
        require_participant(&details, caller_id)?;

        let your_role = details
            .role_of(caller_id)
            .ok_or(AuthzError::NotParticipant)?;
        let people = self.people_of(&details).await?;

        Ok(CourseOverview {
            details,
            people,
            your_role,
        })
    }

    /// Every course the user teaches, assists, or attends
    pub async fn list_courses(&self, user_id: Uuid) -> ClassroomResult<Vec<CourseSummary>> {
        Ok(self.store.list_courses_for_user(user_id).await?)
    }

    /// The user's course IDs split by role
    pub async fn user_courses(&self, user_id: Uuid) -> ClassroomResult<UserCourses> {
        let mut courses = UserCourses::default();

        for membership in self.store.list_memberships_for_user(user_id).await? {
            match membership.role {
                CourseRole::Owner => courses.taught_course_ids.push(membership.course_id),
                CourseRole::Assistant => courses.ta_course_ids.push(membership.course_id),
                CourseRole::Member => courses.student_course_ids.push(membership.course_id),
            }
        }

        Ok(courses)
    }

    /// Loads the course and derives its TA and student lists
    pub async fn course_details(&self, course_id: Uuid) -> ClassroomResult<CourseDetails> {
        let course = self
            .store
            .find_course(course_id)
            .await?
            .ok_or(ClassroomError::CourseNotFound)?;

        self.details_of(course).await
    }

    async fn details_of(&self, course: Course) -> ClassroomResult<CourseDetails> {
        let members = self.store.list_members(course.id).await?;
        Ok(CourseDetails::from_memberships(course, &members))
    }

    async fn require_user(&self, user_id: Uuid) -> ClassroomResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or(ClassroomError::UserNotFound)
    }

    /// Loads the given users keyed by ID
    async fn users_by_id(&self, ids: &[Uuid]) -> ClassroomResult<HashMap<Uuid, User>> {
        let users = self.store.find_users(ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    async fn people_of(&self, details: &CourseDetails) -> ClassroomResult<People> {
        let mut ids = vec![details.course.teacher_id];
        ids.extend(&details.ta_ids);
        ids.extend(&details.student_ids);

        let users = self.users_by_id(&ids).await?;
        let summaries = |ids: &[Uuid]| -> Vec<UserSummary> {
            ids.iter()
                .filter_map(|id| users.get(id))
                .map(UserSummary::from)
                .collect()
        };

        Ok(People {
            teacher: users.get(&details.course.teacher_id).map(UserSummary::from),
            tas: summaries(&details.ta_ids),
            students: summaries(&details.student_ids),
        })
    }
}

/// Trims `value` and checks it is non-empty and at most `max` characters
pub(crate) fn required_text(field: &'static str, value: &str, max: usize) -> ClassroomResult<String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ClassroomError::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > max {
        return Err(ClassroomError::validation(
            field,
            format!("must be at most {} characters", max),
        ));
    }

    Ok(trimmed.to_string())
}
