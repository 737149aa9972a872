/// Announcements, assignments, lectures, and chat
///
/// Posting announcements, assignments, and lectures requires the teacher or a
/// TA; posting chat requires any participant. Reading any of them requires
/// being a participant. Items are returned with their author's display
/// fields and current course role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::info;
use uuid::Uuid;

use super::{required_text, Classroom, ClassroomError, ClassroomResult, MAX_NAME_LENGTH, MAX_TEXT_LENGTH};
use crate::auth::authorization::{require_manage_content, require_participant};
use crate::models::announcement::{Announcement, CreateAnnouncement};
use crate::models::assignment::{Assignment, CreateAssignment};
use crate::models::chat_message::{ChatMessage, CreateChatMessage, MAX_CHAT_MESSAGE_LENGTH};
use crate::models::course::CourseDetails;
use crate::models::lecture::{CreateLecture, Lecture};
use crate::models::membership::CourseRole;

/// Author fields attached to content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,

    /// Role in the course now; `None` once the author has left
    pub course_role: Option<CourseRole>,
}

/// A content item together with its author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authored<T> {
    #[serde(flatten)]
    pub item: T,

    /// `None` if the author account no longer exists
    pub author: Option<Author>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub max_score: i32,
    #[serde(default)]
    pub materials: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLecture {
    pub title: String,
    pub description: String,

    /// JSON array; defaults to `[]`
    #[serde(default)]
    pub materials: Option<JsonValue>,
}

/// Content rows that carry an author
trait HasAuthor {
    fn author_id(&self) -> Uuid;
}

impl HasAuthor for Announcement {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

impl HasAuthor for Assignment {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

impl HasAuthor for Lecture {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

impl HasAuthor for ChatMessage {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

impl Classroom {
    pub async fn post_announcement(
        &self,
        course_id: Uuid,
        author_id: Uuid,
        input: NewAnnouncement,
    ) -> ClassroomResult<Authored<Announcement>> {
        let details = self.course_details(course_id).await?;
        require_manage_content(&details, author_id)?;

        let title = required_text("title", &input.title, MAX_NAME_LENGTH)?;
        let content = required_text("content", &input.content, MAX_TEXT_LENGTH)?;

        let announcement = self
            .store
            .create_announcement(CreateAnnouncement {
                course_id,
                author_id,
                title,
                content,
            })
            .await?;

        info!(course_id = %course_id, announcement_id = %announcement.id, "Announcement posted");
        self.with_single_author(&details, announcement).await
    }

    /// Newest first
    pub async fn list_announcements(
        &self,
        course_id: Uuid,
        caller_id: Uuid,
    ) -> ClassroomResult<Vec<Authored<Announcement>>> {
        let details = self.course_details(course_id).await?;
        require_participant(&details, caller_id)?;

        let items = self.store.list_announcements(course_id).await?;
        self.with_authors(&details, items).await
    }

    pub async fn post_assignment(
        &self,
        course_id: Uuid,
        author_id: Uuid,
        input: NewAssignment,
    ) -> ClassroomResult<Authored<Assignment>> {
        let details = self.course_details(course_id).await?;
        require_manage_content(&details, author_id)?;

        let title = required_text("title", &input.title, MAX_NAME_LENGTH)?;
        let description = required_text("description", &input.description, MAX_TEXT_LENGTH)?;
        if input.max_score <= 0 {
            return Err(ClassroomError::validation("maxScore", "must be greater than 0"));
        }

        let assignment = self
            .store
            .create_assignment(CreateAssignment {
                course_id,
                author_id,
                title,
                description,
                due_date: input.due_date,
                max_score: input.max_score,
                materials: input.materials,
            })
            .await?;

        info!(course_id = %course_id, assignment_id = %assignment.id, "Assignment posted");
        self.with_single_author(&details, assignment).await
    }

    /// Earliest due date first
    pub async fn list_assignments(
        &self,
        course_id: Uuid,
        caller_id: Uuid,
    ) -> ClassroomResult<Vec<Authored<Assignment>>> {
        let details = self.course_details(course_id).await?;
        require_participant(&details, caller_id)?;

        let items = self.store.list_assignments(course_id).await?;
        self.with_authors(&details, items).await
    }

    pub async fn post_lecture(
        &self,
        course_id: Uuid,
        author_id: Uuid,
        input: NewLecture,
    ) -> ClassroomResult<Authored<Lecture>> {
        let details = self.course_details(course_id).await?;
        require_manage_content(&details, author_id)?;

        let title = required_text("title", &input.title, MAX_NAME_LENGTH)?;
        let description = required_text("description", &input.description, MAX_TEXT_LENGTH)?;
        let materials = match input.materials {
            None | Some(JsonValue::Null) => JsonValue::Array(Vec::new()),
            Some(materials @ JsonValue::Array(_)) => materials,
            Some(_) => {
                return Err(ClassroomError::validation("materials", "must be an array"));
            }
        };

        let lecture = self
            .store
            .create_lecture(CreateLecture {
                course_id,
                author_id,
                title,
                description,
                materials,
            })
            .await?;

        info!(course_id = %course_id, lecture_id = %lecture.id, "Lecture posted");
        self.with_single_author(&details, lecture).await
    }

    /// Newest first
    pub async fn list_lectures(
        &self,
        course_id: Uuid,
        caller_id: Uuid,
    ) -> ClassroomResult<Vec<Authored<Lecture>>> {
        let details = self.course_details(course_id).await?;
        require_participant(&details, caller_id)?;

        let items = self.store.list_lectures(course_id).await?;
        self.with_authors(&details, items).await
    }

    pub async fn post_chat_message(
        &self,
        course_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> ClassroomResult<Authored<ChatMessage>> {
        let details = self.course_details(course_id).await?;
        require_participant(&details, author_id)?;

        let content = required_text("content", content, MAX_CHAT_MESSAGE_LENGTH)?;

        let message = self
            .store
            .create_chat_message(CreateChatMessage {
                course_id,
                author_id,
                content,
            })
            .await?;

        self.with_single_author(&details, message).await
    }

    /// Oldest first
    pub async fn list_chat_messages(
        &self,
        course_id: Uuid,
        caller_id: Uuid,
    ) -> ClassroomResult<Vec<Authored<ChatMessage>>> {
        let details = self.course_details(course_id).await?;
        require_participant(&details, caller_id)?;

        let items = self.store.list_chat_messages(course_id).await?;
        self.with_authors(&details, items).await
    }

    async fn with_single_author<T: HasAuthor>(
        &self,
        details: &CourseDetails,
        item: T,
    ) -> ClassroomResult<Authored<T>> {
        let mut authored = self.with_authors(details, vec![item]).await?;
        authored
            .pop()
            .ok_or(ClassroomError::UserNotFound)
    }

    async fn with_authors<T: HasAuthor>(
        &self,
        details: &CourseDetails,
        items: Vec<T>,
    ) -> ClassroomResult<Vec<Authored<T>>> {
        let mut author_ids: Vec<Uuid> = items.iter().map(HasAuthor::author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let users = self.users_by_id(&author_ids).await?;

        Ok(items
            .into_iter()
            .map(|item| {
                let author = users.get(&item.author_id()).map(|user| Author {
                    id: user.id,
                    name: user.name.clone(),
                    email: user.email.clone(),
                    avatar_url: user.avatar_url.clone(),
                    course_role: details.role_of(user.id),
                });
                Authored { item, author }
            })
            .collect())
    }
}
