/// Joining, adding, and removing course participants
///
/// Every change is a single insert-if-absent or delete of one membership
/// edge, so the course's lists and the user's lists change together.

use tracing::{debug, info};
use uuid::Uuid;

use super::{Classroom, ClassroomError, ClassroomResult};
use crate::auth::authorization::require_course_owner;
use crate::class_code::ClassCode;
use crate::models::course::CourseDetails;
use crate::models::membership::{CourseRole, CreateMembership};

impl Classroom {
    /// Enrolls `student_id` in the course with the given class code
    ///
    /// The code is matched case-insensitively.
    ///
    /// # Errors
    ///
    /// - `Validation` if the code is empty
    /// - `CourseNotFound` if the code is malformed or matches no course
    /// - `UserNotFound` if the student doesn't exist
    /// - `AlreadyEnrolled` if the student is already a student of the course
    /// - `AlreadyMember` if the user is the course's teacher or a TA
    pub async fn join_course(
        &self,
        class_code: &str,
        student_id: Uuid,
    ) -> ClassroomResult<CourseDetails> {
        if class_code.trim().is_empty() {
            return Err(ClassroomError::validation("classCode", "Class code is required"));
        }

        let code = ClassCode::parse(class_code).ok_or(ClassroomError::CourseNotFound)?;
        let course = self
            .store
            .find_course_by_code(&code)
            .await?
            .ok_or(ClassroomError::CourseNotFound)?;

        self.require_user(student_id).await?;

        let added = self
            .store
            .add_member(CreateMembership {
                course_id: course.id,
                user_id: student_id,
                role: CourseRole::Member,
            })
            .await?;

        if added.is_none() {
            let existing = self.store.find_membership(course.id, student_id).await?;
            return Err(match existing.map(|m| m.role) {
                Some(CourseRole::Member) => ClassroomError::AlreadyEnrolled,
                _ => ClassroomError::AlreadyMember,
            });
        }

        info!(course_id = %course.id, student_id = %student_id, "Student joined course");
        self.details_of(course).await
    }

    /// Adds the user with `email` to the course as a student or TA
    ///
    /// Only the course teacher may add people.
    ///
    /// # Errors
    ///
    /// - `CourseNotFound`, then `Forbidden` for a requester who isn't the
    ///   teacher
    /// - `Validation` if `role` is `Owner`
    /// - `UserNotFound` if no user has that email
    /// - `AlreadyMember` if the user already has any role in the course
    pub async fn add_person(
        &self,
        course_id: Uuid,
        requester_id: Uuid,
        email: &str,
        role: CourseRole,
    ) -> ClassroomResult<CourseDetails> {
        let details = self.course_details(course_id).await?;
        require_course_owner(&details, requester_id)?;

        if !role.is_assignable() {
            return Err(ClassroomError::validation("role", "Role must be STUDENT or TA"));
        }

        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or(ClassroomError::UserNotFound)?;

        let added = self
            .store
            .add_member(CreateMembership {
                course_id,
                user_id: user.id,
                role,
            })
            .await?;

        if added.is_none() {
            return Err(ClassroomError::AlreadyMember);
        }

        info!(
            course_id = %course_id,
            user_id = %user.id,
            role = role.as_str(),
            "Person added to course"
        );
        self.details_of(details.course).await
    }

    /// Removes a TA or student from the course
    ///
    /// Only the course teacher may remove people. Removing someone who isn't
    /// in the course is not an error, and the teacher can never be removed.
    pub async fn remove_person(
        &self,
        course_id: Uuid,
        requester_id: Uuid,
        target_user_id: Uuid,
    ) -> ClassroomResult<CourseDetails> {
        let details = self.course_details(course_id).await?;
        require_course_owner(&details, requester_id)?;

        let removed = self.store.remove_member(course_id, target_user_id).await?;
        if removed {
            info!(course_id = %course_id, user_id = %target_user_id, "Person removed from course");
        } else {
            debug!(course_id = %course_id, user_id = %target_user_id, "Nothing to remove");
        }

        self.details_of(details.course).await
    }
}
