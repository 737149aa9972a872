/// Content authorization gate
///
/// Pure predicates deciding who may post in a course. They only look at the
/// course's teacher and its TA/student lists; the account-level
/// [`UserRole`](crate::models::user::UserRole) is never consulted.
///
/// | Caller          | manage content | post chat | owner |
/// |-----------------|----------------|-----------|-------|
/// | course teacher  | yes            | yes       | yes   |
/// | TA              | yes            | yes       | no    |
/// | student         | no             | yes       | no    |
/// | anyone else     | no             | no        | no    |
///
/// A missing course is the caller's concern: look the course up first and
/// report `CourseNotFound` before consulting the gate.
///
/// # Example
///
/// ```
/// use eduai_shared::auth::authorization::{can_manage_content, can_post_chat, require_manage_content};
/// use eduai_shared::models::course::{Course, CourseDetails};
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// let teacher = Uuid::new_v4();
/// let student = Uuid::new_v4();
/// let course = CourseDetails {
///     course: Course {
///         id: Uuid::new_v4(),
///         name: "Chemistry".into(),
///         description: "Intro".into(),
///         class_code: "che123m".into(),
///         teacher_id: teacher,
///         created_at: Utc::now(),
///         updated_at: Utc::now(),
///     },
///     ta_ids: vec![],
///     student_ids: vec![student],
/// };
///
/// assert!(can_manage_content(&course, teacher));
/// assert!(!can_manage_content(&course, student));
/// assert!(can_post_chat(&course, student));
/// assert!(require_manage_content(&course, student).is_err());
/// ```

use uuid::Uuid;

use crate::models::course::CourseDetails;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller is neither the teacher nor a TA
    #[error("Only the course teacher or a TA can do this")]
    NotCourseStaff,

    /// Caller has no role in the course
    #[error("You are not a participant of this course")]
    NotParticipant,

    /// Caller is not the course teacher
    #[error("Only the course teacher can do this")]
    NotCourseOwner,
}

/// Teacher or TA
pub fn can_manage_content(course: &CourseDetails, user_id: Uuid) -> bool {
    course.course.teacher_id == user_id || course.ta_ids.contains(&user_id)
}

/// Teacher, TA, or student
pub fn can_post_chat(course: &CourseDetails, user_id: Uuid) -> bool {
    can_manage_content(course, user_id) || course.student_ids.contains(&user_id)
}

pub fn is_course_owner(course: &CourseDetails, user_id: Uuid) -> bool {
    course.course.teacher_id == user_id
}

pub fn require_manage_content(course: &CourseDetails, user_id: Uuid) -> Result<(), AuthzError> {
    if can_manage_content(course, user_id) {
        Ok(())
    } else {
        Err(AuthzError::NotCourseStaff)
    }
}

/// Also the read check: whoever may post chat may read the course
pub fn require_participant(course: &CourseDetails, user_id: Uuid) -> Result<(), AuthzError> {
    if can_post_chat(course, user_id) {
        Ok(())
    } else {
        Err(AuthzError::NotParticipant)
    }
}

pub fn require_course_owner(course: &CourseDetails, user_id: Uuid) -> Result<(), AuthzError> {
    if is_course_owner(course, user_id) {
        Ok(())
    } else {
        Err(AuthzError::NotCourseOwner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course::Course;
    use chrono::Utc;

    struct Fixture {
        course: CourseDetails,
        teacher: Uuid,
        ta: Uuid,
        student: Uuid,
        outsider: Uuid,
    }

    fn fixture() -> Fixture {
        let (teacher, ta, student) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let course = CourseDetails {
            course: Course {
                id: Uuid::new_v4(),
                name: "Biology".to_string(),
                description: "Cells".to_string(),
                class_code: "bio200x".to_string(),
                teacher_id: teacher,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            ta_ids: vec![ta],
            student_ids: vec![student],
        };

        Fixture {
            course,
            teacher,
            ta,
            student,
            outsider: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_gate_truth_table() {
        let f = fixture();
        let cases = [
            (f.teacher, true, true, true),
            (f.ta, true, true, false),
            (f.student, false, true, false),
            (f.outsider, false, false, false),
        ];

        for (user, manage, chat, owner) in cases {
            assert_eq!(can_manage_content(&f.course, user), manage);
            assert_eq!(can_post_chat(&f.course, user), chat);
            assert_eq!(is_course_owner(&f.course, user), owner);
        }
    }

    #[test]
    fn test_require_wrappers() {
        let f = fixture();

        assert!(require_manage_content(&f.course, f.ta).is_ok());
        assert_eq!(
            require_manage_content(&f.course, f.student),
            Err(AuthzError::NotCourseStaff)
        );

        assert!(require_participant(&f.course, f.student).is_ok());
        assert_eq!(
            require_participant(&f.course, f.outsider),
            Err(AuthzError::NotParticipant)
        );

        assert!(require_course_owner(&f.course, f.teacher).is_ok());
        assert_eq!(
            require_course_owner(&f.course, f.ta),
            Err(AuthzError::NotCourseOwner)
        );
    }
}
