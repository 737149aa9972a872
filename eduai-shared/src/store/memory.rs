/// In-memory store
///
/// Used by the test suites and by the `memory` storage backend for local
/// runs. All state sits behind a single `RwLock`; every write takes the write
/// lock once and performs its checks and inserts under it, which gives the
/// same atomicity as the transactional PostgreSQL store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::class_code::ClassCode;
use crate::models::announcement::{Announcement, CreateAnnouncement};
use crate::models::assignment::{Assignment, CreateAssignment};
use crate::models::chat_message::{ChatMessage, CreateChatMessage};
use crate::models::course::{Course, CourseSummary, CreateCourse};
use crate::models::lecture::{CreateLecture, Lecture};
use crate::models::membership::{CourseRole, CreateMembership, Membership};
use crate::models::user::{normalize_email, CreateUser, User};

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    courses: HashMap<Uuid, Course>,
    /// class code -> course ID
    codes: HashMap<String, Uuid>,
    /// Insertion order doubles as join order
    memberships: Vec<Membership>,
    announcements: Vec<Announcement>,
    assignments: Vec<Assignment>,
    lectures: Vec<Lecture>,
    chat_messages: Vec<ChatMessage>,
}

impl State {
    fn membership(&self, course_id: Uuid, user_id: Uuid) -> Option<&Membership> {
        self.memberships
            .iter()
            .find(|m| m.course_id == course_id && m.user_id == user_id)
    }
}

/// Store keeping every record in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut state = self.state.write().await;
        let email = normalize_email(&data.email);

        if state.users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict("user already exists".to_string()));
        }
        if let Some(external_id) = &data.external_id {
            if state
                .users
                .values()
                .any(|u| u.external_id.as_ref() == Some(external_id))
            {
                return Err(StoreError::Conflict("external id already exists".to_string()));
            }
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email,
            password_hash: data.password_hash,
            external_id: data.external_id,
            avatar_url: data.avatar_url,
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = normalize_email(email);
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.external_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn link_external_id(
        &self,
        user_id: Uuid,
        external_id: &str,
    ) -> StoreResult<Option<User>> {
        let mut state = self.state.write().await;

        if state
            .users
            .values()
            .any(|u| u.id != user_id && u.external_id.as_deref() == Some(external_id))
        {
            return Err(StoreError::Conflict("external id already exists".to_string()));
        }

        Ok(state.users.get_mut(&user_id).map(|user| {
            user.external_id = Some(external_id.to_string());
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn find_users(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }

    async fn create_course_if_code_free(&self, data: CreateCourse) -> StoreResult<Option<Course>> {
        let mut state = self.state.write().await;

        if state.codes.contains_key(data.class_code.as_str()) {
            return Ok(None);
        }

        let now = Utc::now();
        let course = Course {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            class_code: data.class_code.to_string(),
            teacher_id: data.teacher_id,
            created_at: now,
            updated_at: now,
        };

        state.codes.insert(course.class_code.clone(), course.id);
        state.courses.insert(course.id, course.clone());
        state.memberships.push(Membership {
            course_id: course.id,
            user_id: course.teacher_id,
            role: CourseRole::Owner,
            created_at: now,
        });

        Ok(Some(course))
    }

    async fn find_course(&self, id: Uuid) -> StoreResult<Option<Course>> {
        Ok(self.state.read().await.courses.get(&id).cloned())
    }

    async fn find_course_by_code(&self, code: &ClassCode) -> StoreResult<Option<Course>> {
        let state = self.state.read().await;
        Ok(state
            .codes
            .get(code.as_str())
            .and_then(|id| state.courses.get(id))
            .cloned())
    }

    async fn list_courses_for_user(&self, user_id: Uuid) -> StoreResult<Vec<CourseSummary>> {
        let state = self.state.read().await;

        let mut courses: Vec<CourseSummary> = state
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| {
                state
                    .courses
                    .get(&m.course_id)
                    .map(|course| course.summary_for(m.role))
            })
            .collect();

        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(courses)
    }

    async fn add_member(&self, data: CreateMembership) -> StoreResult<Option<Membership>> {
        let mut state = self.state.write().await;

        if state.membership(data.course_id, data.user_id).is_some() {
            return Ok(None);
        }

        let membership = Membership {
            course_id: data.course_id,
            user_id: data.user_id,
            role: data.role,
            created_at: Utc::now(),
        };
        state.memberships.push(membership.clone());
        Ok(Some(membership))
    }

    async fn find_membership(
        &self,
        course_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        Ok(self.state.read().await.membership(course_id, user_id).cloned())
    }

    async fn remove_member(&self, course_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;

        let before = state.memberships.len();
        state.memberships.retain(|m| {
            !(m.course_id == course_id && m.user_id == user_id && m.role != CourseRole::Owner)
        });

        Ok(state.memberships.len() < before)
    }

    async fn list_members(&self, course_id: Uuid) -> StoreResult<Vec<Membership>> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .iter()
            .filter(|m| m.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn list_memberships_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Membership>> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_announcement(&self, data: CreateAnnouncement) -> StoreResult<Announcement> {
        let announcement = Announcement {
            id: Uuid::new_v4(),
            course_id: data.course_id,
            author_id: data.author_id,
            title: data.title,
            content: data.content,
            created_at: Utc::now(),
        };
        self.state
            .write()
            .await
            .announcements
            .push(announcement.clone());
        Ok(announcement)
    }

    async fn list_announcements(&self, course_id: Uuid) -> StoreResult<Vec<Announcement>> {
        let state = self.state.read().await;
        Ok(state
            .announcements
            .iter()
            .rev()
            .filter(|a| a.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn create_assignment(&self, data: CreateAssignment) -> StoreResult<Assignment> {
        let assignment = Assignment {
            id: Uuid::new_v4(),
            course_id: data.course_id,
            author_id: data.author_id,
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            max_score: data.max_score,
            materials: data.materials,
            created_at: Utc::now(),
        };
        self.state.write().await.assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn list_assignments(&self, course_id: Uuid) -> StoreResult<Vec<Assignment>> {
        let state = self.state.read().await;
        let mut assignments: Vec<Assignment> = state
            .assignments
            .iter()
            .filter(|a| a.course_id == course_id)
            .cloned()
            .collect();

        // stable: equal due dates keep posting order
        assignments.sort_by_key(|a| a.due_date);
        Ok(assignments)
    }

    async fn create_lecture(&self, data: CreateLecture) -> StoreResult<Lecture> {
        let lecture = Lecture {
            id: Uuid::new_v4(),
            course_id: data.course_id,
            author_id: data.author_id,
            title: data.title,
            description: data.description,
            materials: data.materials,
            created_at: Utc::now(),
        };
        self.state.write().await.lectures.push(lecture.clone());
        Ok(lecture)
    }

    async fn list_lectures(&self, course_id: Uuid) -> StoreResult<Vec<Lecture>> {
        let state = self.state.read().await;
        Ok(state
            .lectures
            .iter()
            .rev()
            .filter(|l| l.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn create_chat_message(&self, data: CreateChatMessage) -> StoreResult<ChatMessage> {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            course_id: data.course_id,
            author_id: data.author_id,
            content: data.content,
            created_at: Utc::now(),
        };
        self.state.write().await.chat_messages.push(message.clone());
        Ok(message)
    }

    async fn list_chat_messages(&self, course_id: Uuid) -> StoreResult<Vec<ChatMessage>> {
        let state = self.state.read().await;
        Ok(state
            .chat_messages
            .iter()
            .filter(|m| m.course_id == course_id)
            .cloned()
            .collect())
    }
}
