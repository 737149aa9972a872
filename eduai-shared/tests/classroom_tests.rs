/// Coordinator tests against the in-memory store
///
/// These run without external services.
/// Run with: cargo test -p eduai-shared --test classroom_tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use eduai_shared::class_code::{is_valid_code, ClassCode, CodeGenerator, FriendlyCodes};
use eduai_shared::classroom::accounts::ExternalProfile;
use eduai_shared::classroom::content::{NewAnnouncement, NewAssignment, NewLecture};
use eduai_shared::classroom::{Classroom, ClassroomConfig, ClassroomError};
use eduai_shared::models::course::CourseDetails;
use eduai_shared::models::membership::CourseRole;
use eduai_shared::models::user::{CreateUser, User, UserRole};
use eduai_shared::store::{MemoryStore, Store};
use serde_json::json;
use uuid::Uuid;

/// Always returns the same code and counts how often it was asked
struct FixedCodes {
    code: ClassCode,
    calls: AtomicUsize,
}

impl FixedCodes {
    fn new(code: &str) -> Arc<Self> {
        Arc::new(Self {
            code: ClassCode::parse(code).unwrap(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CodeGenerator for FixedCodes {
    fn generate(&self) -> ClassCode {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.code.clone()
    }
}

/// Hands out a scripted sequence of codes
struct ScriptedCodes {
    codes: Mutex<Vec<ClassCode>>,
}

impl ScriptedCodes {
    fn new(codes: &[&str]) -> Arc<Self> {
        let mut codes: Vec<ClassCode> = codes.iter().map(|c| ClassCode::parse(c).unwrap()).collect();
        codes.reverse();
        Arc::new(Self {
            codes: Mutex::new(codes),
        })
    }
}

impl CodeGenerator for ScriptedCodes {
    fn generate(&self) -> ClassCode {
        self.codes.lock().unwrap().pop().expect("script exhausted")
    }
}

fn classroom_with(store: Arc<MemoryStore>, codes: Arc<dyn CodeGenerator>) -> Classroom {
    Classroom::new(store, codes, ClassroomConfig::default())
}

fn setup() -> (Classroom, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (classroom_with(store.clone(), Arc::new(FriendlyCodes)), store)
}

async fn user(store: &MemoryStore, name: &str, role: UserRole) -> User {
    store
        .create_user(CreateUser {
            name: name.to_string(),
            email: format!("{}@school.test", name.to_lowercase()),
            password_hash: None,
            external_id: None,
            avatar_url: None,
            role,
        })
        .await
        .unwrap()
}

/// Asserts the course's lists and every user's lists agree
async fn assert_symmetric(classroom: &Classroom, course_id: Uuid, users: &[Uuid]) {
    let details = classroom.course_details(course_id).await.unwrap();

    for &user_id in users {
        let courses = classroom.user_courses(user_id).await.unwrap();
        assert_eq!(
            details.student_ids.contains(&user_id),
            courses.student_course_ids.contains(&course_id),
            "student lists disagree for {}",
            user_id
        );
        assert_eq!(
            details.ta_ids.contains(&user_id),
            courses.ta_course_ids.contains(&course_id),
            "TA lists disagree for {}",
            user_id
        );
        assert!(
            !(details.student_ids.contains(&user_id) && details.ta_ids.contains(&user_id)),
            "user {} is both TA and student",
            user_id
        );
    }

    assert!(!details.ta_ids.contains(&details.course.teacher_id));
    assert!(!details.student_ids.contains(&details.course.teacher_id));
}

async fn course_of(classroom: &Classroom, teacher: &User) -> CourseDetails {
    classroom
        .create_course(teacher.id, "Algebra I", "Linear equations and functions")
        .await
        .unwrap()
}

// --- course creation -------------------------------------------------------

#[tokio::test]
async fn test_create_course() {
    let (classroom, store) = setup();
    let teacher = user(&store, "Turing", UserRole::Teacher).await;

    let course = course_of(&classroom, &teacher).await;

    assert!(is_valid_code(&course.course.class_code));
    assert_eq!(course.course.teacher_id, teacher.id);
    assert_eq!(course.course.name, "Algebra I");
    assert!(course.ta_ids.is_empty());
    assert!(course.student_ids.is_empty());

    let courses = classroom.user_courses(teacher.id).await.unwrap();
    assert_eq!(courses.taught_course_ids, vec![course.course.id]);
}

#[tokio::test]
async fn test_create_course_trims_and_validates_input() {
    let (classroom, store) = setup();
    let teacher = user(&store, "Hopper", UserRole::Teacher).await;

    let course = classroom
        .create_course(teacher.id, "  Compilers  ", " Parsing ")
        .await
        .unwrap();
    assert_eq!(course.course.name, "Compilers");
    assert_eq!(course.course.description, "Parsing");

    let err = classroom.create_course(teacher.id, "   ", "x").await.unwrap_err();
    assert!(matches!(err, ClassroomError::Validation { field: "name", .. }));

    let err = classroom
        .create_course(teacher.id, &"n".repeat(201), "x")
        .await
        .unwrap_err();
    assert!(matches!(err, ClassroomError::Validation { field: "name", .. }));

    let err = classroom.create_course(teacher.id, "Name", "").await.unwrap_err();
    assert!(matches!(err, ClassroomError::Validation { field: "description", .. }));
}

#[tokio::test]
async fn test_create_course_unknown_teacher() {
    let (classroom, _store) = setup();

    let err = classroom
        .create_course(Uuid::new_v4(), "Orphan", "No teacher")
        .await
        .unwrap_err();
    assert!(matches!(err, ClassroomError::UserNotFound));
}

#[tokio::test]
async fn test_code_collision_exhausts_after_max_attempts() {
    let store = Arc::new(MemoryStore::new());
    let teacher = user(&store, "Knuth", UserRole::Teacher).await;

    let seeded = classroom_with(store.clone(), FixedCodes::new("aaa111a"));
    seeded.create_course(teacher.id, "First", "Takes the code").await.unwrap();

    let codes = FixedCodes::new("aaa111a");
    let classroom = classroom_with(store.clone(), codes.clone());

    let err = classroom
        .create_course(teacher.id, "Second", "Never gets a code")
        .await
        .unwrap_err();

    assert!(matches!(err, ClassroomError::CodeExhaustion { attempts: 10 }));
    assert_eq!(codes.calls(), 10);
    assert_eq!(classroom.list_courses(teacher.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_code_attempts_are_configurable() {
    let store = Arc::new(MemoryStore::new());
    let teacher = user(&store, "Liskov", UserRole::Teacher).await;

    let codes = FixedCodes::new("zzz999z");
    let first = Classroom::new(store.clone(), codes.clone(), ClassroomConfig { max_code_attempts: 3 });
    first.create_course(teacher.id, "One", "ok").await.unwrap();

    let err = first.create_course(teacher.id, "Two", "collides").await.unwrap_err();
    assert!(matches!(err, ClassroomError::CodeExhaustion { attempts: 3 }));
    assert_eq!(codes.calls(), 1 + 3);
}

#[tokio::test]
async fn test_collision_retries_with_next_candidate() {
    let store = Arc::new(MemoryStore::new());
    let teacher = user(&store, "Dijkstra", UserRole::Teacher).await;

    let classroom = classroom_with(
        store.clone(),
        ScriptedCodes::new(&["abc123d", "abc123d", "abc123d", "xyz789q"]),
    );

    let first = classroom.create_course(teacher.id, "First", "a").await.unwrap();
    let second = classroom.create_course(teacher.id, "Second", "b").await.unwrap();

    assert_eq!(first.course.class_code, "abc123d");
    assert_eq!(second.course.class_code, "xyz789q");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creations_never_share_a_code() {
    let store = Arc::new(MemoryStore::new());
    let teacher = user(&store, "Lamport", UserRole::Teacher).await;
    let classroom = Classroom::new(
        store.clone(),
        FixedCodes::new("lam000p"),
        ClassroomConfig { max_code_attempts: 1 },
    );

    let mut handles = Vec::new();
    for i in 0..8 {
        let classroom = classroom.clone();
        let teacher_id = teacher.id;
        handles.push(tokio::spawn(async move {
            classroom
                .create_course(teacher_id, &format!("Course {}", i), "race")
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(ClassroomError::CodeExhaustion { attempts: 1 }) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(created, 1);
}

// --- joining ---------------------------------------------------------------

#[tokio::test]
async fn test_join_course_and_rejoin() {
    let (classroom, store) = setup();
    let teacher = user(&store, "Noether", UserRole::Teacher).await;
    let student = user(&store, "Gauss", UserRole::Student).await;
    let course = course_of(&classroom, &teacher).await;

    let joined = classroom
        .join_course(&course.course.class_code, student.id)
        .await
        .unwrap();
    assert_eq!(joined.student_ids, vec![student.id]);
    assert_symmetric(&classroom, course.course.id, &[teacher.id, student.id]).await;

    let err = classroom
        .join_course(&course.course.class_code, student.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ClassroomError::AlreadyEnrolled));

    let details = classroom.course_details(course.course.id).await.unwrap();
    assert_eq!(details.student_ids, vec![student.id]);
}

#[tokio::test]
async fn test_join_is_case_insensitive() {
    let (classroom, store) = setup();
    let teacher = user(&store, "Euler", UserRole::Teacher).await;
    let student = user(&store, "Bernoulli", UserRole::Student).await;
    let course = course_of(&classroom, &teacher).await;

    let shouted = format!("  {}  ", course.course.class_code.to_uppercase());
    let joined = classroom.join_course(&shouted, student.id).await.unwrap();

    assert_eq!(joined.course.id, course.course.id);
}

#[tokio::test]
async fn test_join_errors() {
    let (classroom, store) = setup();
    let teacher = user(&store, "Ramanujan", UserRole::Teacher).await;
    let ta = user(&store, "Hardy", UserRole::Ta).await;
    let course = course_of(&classroom, &teacher).await;
    let code = course.course.class_code.clone();
    classroom
        .add_person(course.course.id, teacher.id, &ta.email, CourseRole::Assistant)
        .await
        .unwrap();

    assert!(matches!(
        classroom.join_course("", ta.id).await,
        Err(ClassroomError::Validation { field: "classCode", .. })
    ));
    assert!(matches!(
        classroom.join_course("abc", ta.id).await,
        Err(ClassroomError::CourseNotFound)
    ));

    let unused = if code == "qqq000q" { "qqq000r" } else { "qqq000q" };
    assert!(matches!(
        classroom.join_course(unused, ta.id).await,
        Err(ClassroomError::CourseNotFound)
    ));
    assert!(matches!(
        classroom.join_course(&code, Uuid::new_v4()).await,
        Err(ClassroomError::UserNotFound)
    ));
    assert!(matches!(
        classroom.join_course(&code, teacher.id).await,
        Err(ClassroomError::AlreadyMember)
    ));
    assert!(matches!(
        classroom.join_course(&code, ta.id).await,
        Err(ClassroomError::AlreadyMember)
    ));

    assert_symmetric(&classroom, course.course.id, &[teacher.id, ta.id]).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_enroll_once() {
    let (classroom, store) = setup();
    let teacher = user(&store, "Shannon", UserRole::Teacher).await;
    let student = user(&store, "Nyquist", UserRole::Student).await;
    let course = course_of(&classroom, &teacher).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let classroom = classroom.clone();
        let code = course.course.class_code.clone();
        let student_id = student.id;
        handles.push(tokio::spawn(async move {
            classroom.join_course(&code, student_id).await
        }));
    }

    let mut joined = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => joined += 1,
            Err(ClassroomError::AlreadyEnrolled) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(joined, 1);
    let details = classroom.course_details(course.course.id).await.unwrap();
    assert_eq!(details.student_ids, vec![student.id]);
}

// --- adding and removing people -------------------------------------------

#[tokio::test]
async fn test_add_ta_then_remove() {
    let (classroom, store) = setup();
    let teacher = user(&store, "Curie", UserRole::Teacher).await;
    let ta = user(&store, "Meitner", UserRole::Student).await;
    let course = course_of(&classroom, &teacher).await;
    let course_id = course.course.id;

    let added = classroom
        .add_person(course_id, teacher.id, &ta.email.to_uppercase(), CourseRole::Assistant)
        .await
        .unwrap();
    assert_eq!(added.ta_ids, vec![ta.id]);
    assert!(added.student_ids.is_empty());
    assert_symmetric(&classroom, course_id, &[teacher.id, ta.id]).await;
    assert_eq!(
        classroom.user_courses(ta.id).await.unwrap().ta_course_ids,
        vec![course_id]
    );

    let removed = classroom.remove_person(course_id, teacher.id, ta.id).await.unwrap();
    assert!(removed.ta_ids.is_empty());
    assert!(removed.student_ids.is_empty());
    assert_symmetric(&classroom, course_id, &[teacher.id, ta.id]).await;

    let courses = classroom.user_courses(ta.id).await.unwrap();
    assert!(courses.ta_course_ids.is_empty());
    assert!(courses.student_course_ids.is_empty());
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let (classroom, store) = setup();
    let teacher = user(&store, "Franklin", UserRole::Teacher).await;
    let student = user(&store, "Watson", UserRole::Student).await;
    let outsider = user(&store, "Crick", UserRole::Student).await;
    let course = course_of(&classroom, &teacher).await;
    let course_id = course.course.id;

    classroom.join_course(&course.course.class_code, student.id).await.unwrap();

    let once = classroom.remove_person(course_id, teacher.id, student.id).await.unwrap();
    let twice = classroom.remove_person(course_id, teacher.id, student.id).await.unwrap();
    assert_eq!(once, twice);
    assert!(twice.student_ids.is_empty());

    // never a member
    classroom.remove_person(course_id, teacher.id, outsider.id).await.unwrap();
    assert_symmetric(&classroom, course_id, &[teacher.id, student.id, outsider.id]).await;
}

#[tokio::test]
async fn test_teacher_cannot_be_removed() {
    let (classroom, store) = setup();
    let teacher = user(&store, "Babbage", UserRole::Teacher).await;
    let course = course_of(&classroom, &teacher).await;

    classroom
        .remove_person(course.course.id, teacher.id, teacher.id)
        .await
        .unwrap();

    let courses = classroom.user_courses(teacher.id).await.unwrap();
    assert_eq!(courses.taught_course_ids, vec![course.course.id]);
}

#[tokio::test]
async fn test_add_person_errors() {
    let (classroom, store) = setup();
    let teacher = user(&store, "Pascal", UserRole::Teacher).await;
    let ta = user(&store, "Fermat", UserRole::Ta).await;
    let student = user(&store, "Leibniz", UserRole::Student).await;
    let course = course_of(&classroom, &teacher).await;
    let course_id = course.course.id;

    classroom
        .add_person(course_id, teacher.id, &ta.email, CourseRole::Assistant)
        .await
        .unwrap();
    classroom
        .add_person(course_id, teacher.id, &student.email, CourseRole::Member)
        .await
        .unwrap();

    assert!(matches!(
        classroom
            .add_person(Uuid::new_v4(), teacher.id, &student.email, CourseRole::Member)
            .await,
        Err(ClassroomError::CourseNotFound)
    ));
    assert!(matches!(
        classroom
            .add_person(course_id, ta.id, "new@school.test", CourseRole::Member)
            .await,
        Err(ClassroomError::Forbidden(_))
    ));
    assert!(matches!(
        classroom
            .add_person(course_id, teacher.id, &student.email, CourseRole::Owner)
            .await,
        Err(ClassroomError::Validation { field: "role", .. })
    ));
    assert!(matches!(
        classroom
            .add_person(course_id, teacher.id, "nobody@school.test", CourseRole::Member)
            .await,
        Err(ClassroomError::UserNotFound)
    ));
    assert!(matches!(
        classroom
            .add_person(course_id, teacher.id, &student.email, CourseRole::Assistant)
            .await,
        Err(ClassroomError::AlreadyMember)
    ));
    assert!(matches!(
        classroom
            .add_person(course_id, teacher.id, &teacher.email, CourseRole::Member)
            .await,
        Err(ClassroomError::AlreadyMember)
    ));

    assert_symmetric(&classroom, course_id, &[teacher.id, ta.id, student.id]).await;
}

#[tokio::test]
async fn test_only_teacher_removes_people() {
    let (classroom, store) = setup();
    let teacher = user(&store, "Boole", UserRole::Teacher).await;
    let ta = user(&store, "De Morgan", UserRole::Ta).await;
    let student = user(&store, "Venn", UserRole::Student).await;
    let course = course_of(&classroom, &teacher).await;
    let course_id = course.course.id;

    classroom
        .add_person(course_id, teacher.id, &ta.email, CourseRole::Assistant)
        .await
        .unwrap();
    classroom.join_course(&course.course.class_code, student.id).await.unwrap();

    assert!(matches!(
        classroom.remove_person(course_id, ta.id, student.id).await,
        Err(ClassroomError::Forbidden(_))
    ));
    assert!(matches!(
        classroom.remove_person(Uuid::new_v4(), teacher.id, student.id).await,
        Err(ClassroomError::CourseNotFound)
    ));

    let details = classroom.course_details(course_id).await.unwrap();
    assert_eq!(details.student_ids, vec![student.id]);
}

// --- reads -----------------------------------------------------------------

#[tokio::test]
async fn test_get_course_lists_people_for_participants_only() {
    let (classroom, store) = setup();
    let teacher = user(&store, "Fibonacci", UserRole::Teacher).await;
    let student = user(&store, "Pisano", UserRole::Student).await;
    let outsider = user(&store, "Stranger", UserRole::Student).await;
    let course = course_of(&classroom, &teacher).await;
    classroom.join_course(&course.course.class_code, student.id).await.unwrap();

    let overview = classroom.get_course(course.course.id, student.id).await.unwrap();
    assert_eq!(overview.your_role, CourseRole::Member);
    assert_eq!(overview.people.teacher.as_ref().map(|t| t.id), Some(teacher.id));
    assert_eq!(overview.people.students.len(), 1);
    assert_eq!(overview.people.students[0].email, student.email);
    assert!(overview.people.tas.is_empty());

    assert!(matches!(
        classroom.get_course(course.course.id, outsider.id).await,
        Err(ClassroomError::Forbidden(_))
    ));
    assert!(matches!(
        classroom.get_course(Uuid::new_v4(), student.id).await,
        Err(ClassroomError::CourseNotFound)
    ));
}

#[tokio::test]
async fn test_list_courses_reports_role() {
    let (classroom, store) = setup();
    let teacher = user(&store, "Kepler", UserRole::Teacher).await;
    let other = user(&store, "Brahe", UserRole::Teacher).await;
    let mine = course_of(&classroom, &teacher).await;
    let theirs = course_of(&classroom, &other).await;

    classroom
        .add_person(theirs.course.id, other.id, &teacher.email, CourseRole::Assistant)
        .await
        .unwrap();

    let courses = classroom.list_courses(teacher.id).await.unwrap();
    assert_eq!(courses.len(), 2);

    let role_in = |id: Uuid| courses.iter().find(|c| c.id == id).map(|c| c.role);
    assert_eq!(role_in(mine.course.id), Some(CourseRole::Owner));
    assert_eq!(role_in(theirs.course.id), Some(CourseRole::Assistant));
}

// --- content ---------------------------------------------------------------

struct ContentFixture {
    classroom: Classroom,
    course_id: Uuid,
    teacher: User,
    ta: User,
    student: User,
    outsider: User,
}

async fn content_fixture() -> ContentFixture {
    let (classroom, store) = setup();
    let teacher = user(&store, "Feynman", UserRole::Teacher).await;
    let ta = user(&store, "Dyson", UserRole::Ta).await;
    let student = user(&store, "Wheeler", UserRole::Student).await;
    let outsider = user(&store, "Outsider", UserRole::Student).await;

    let course = course_of(&classroom, &teacher).await;
    classroom
        .add_person(course.course.id, teacher.id, &ta.email, CourseRole::Assistant)
        .await
        .unwrap();
    classroom.join_course(&course.course.class_code, student.id).await.unwrap();

    ContentFixture {
        classroom,
        course_id: course.course.id,
        teacher,
        ta,
        student,
        outsider,
    }
}

fn announcement(title: &str) -> NewAnnouncement {
    NewAnnouncement {
        title: title.to_string(),
        content: "Bring a calculator".to_string(),
    }
}

#[tokio::test]
async fn test_announcements_gate() {
    let f = content_fixture().await;

    let err = f
        .classroom
        .post_announcement(f.course_id, f.student.id, announcement("Nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClassroomError::Forbidden(_)));

    let by_teacher = f
        .classroom
        .post_announcement(f.course_id, f.teacher.id, announcement("Quiz Friday"))
        .await
        .unwrap();
    let author = by_teacher.author.unwrap();
    assert_eq!(author.id, f.teacher.id);
    assert_eq!(author.course_role, Some(CourseRole::Owner));

    let by_ta = f
        .classroom
        .post_announcement(f.course_id, f.ta.id, announcement("Office hours"))
        .await
        .unwrap();
    assert_eq!(by_ta.item.author_id, f.ta.id);

    let listed = f
        .classroom
        .list_announcements(f.course_id, f.student.id)
        .await
        .unwrap();
    let titles: Vec<&str> = listed.iter().map(|a| a.item.title.as_str()).collect();
    assert_eq!(titles, vec!["Office hours", "Quiz Friday"]);

    assert!(matches!(
        f.classroom.list_announcements(f.course_id, f.outsider.id).await,
        Err(ClassroomError::Forbidden(_))
    ));
    assert!(matches!(
        f.classroom
            .post_announcement(Uuid::new_v4(), f.teacher.id, announcement("Lost"))
            .await,
        Err(ClassroomError::CourseNotFound)
    ));
}

#[tokio::test]
async fn test_assignments_validate_and_sort_by_due_date() {
    let f = content_fixture().await;
    let now = Utc::now();

    let assignment = |title: &str, due_in_days: i64, max_score: i32| NewAssignment {
        title: title.to_string(),
        description: "Problems 1-10".to_string(),
        due_date: now + Duration::days(due_in_days),
        max_score,
        materials: vec!["https://example.com/sheet.pdf".to_string()],
    };

    let err = f
        .classroom
        .post_assignment(f.course_id, f.teacher.id, assignment("Zero", 3, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, ClassroomError::Validation { field: "maxScore", .. }));

    assert!(matches!(
        f.classroom
            .post_assignment(f.course_id, f.student.id, assignment("Mine", 3, 10))
            .await,
        Err(ClassroomError::Forbidden(_))
    ));

    f.classroom
        .post_assignment(f.course_id, f.teacher.id, assignment("Later", 7, 100))
        .await
        .unwrap();
    f.classroom
        .post_assignment(f.course_id, f.ta.id, assignment("Sooner", 1, 20))
        .await
        .unwrap();

    let listed = f.classroom.list_assignments(f.course_id, f.student.id).await.unwrap();
    let titles: Vec<&str> = listed.iter().map(|a| a.item.title.as_str()).collect();
    assert_eq!(titles, vec!["Sooner", "Later"]);
    assert_eq!(listed[0].item.materials.len(), 1);
}

#[tokio::test]
async fn test_lecture_materials() {
    let f = content_fixture().await;

    let lecture = f
        .classroom
        .post_lecture(
            f.course_id,
            f.teacher.id,
            NewLecture {
                title: "Week 1".to_string(),
                description: "Intro".to_string(),
                materials: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(lecture.item.materials, json!([]));

    let err = f
        .classroom
        .post_lecture(
            f.course_id,
            f.ta.id,
            NewLecture {
                title: "Week 2".to_string(),
                description: "Vectors".to_string(),
                materials: Some(json!({"slides": "deck.pdf"})),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClassroomError::Validation { field: "materials", .. }));

    f.classroom
        .post_lecture(
            f.course_id,
            f.ta.id,
            NewLecture {
                title: "Week 2".to_string(),
                description: "Vectors".to_string(),
                materials: Some(json!([{"type": "slides", "url": "deck.pdf"}])),
            },
        )
        .await
        .unwrap();

    let listed = f.classroom.list_lectures(f.course_id, f.student.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].item.title, "Week 2");
}

#[tokio::test]
async fn test_chat() {
    let f = content_fixture().await;

    for (author, text) in [
        (&f.student, "Is the quiz open book?"),
        (&f.ta, "Yes"),
        (&f.teacher, "One page of notes"),
    ] {
        f.classroom
            .post_chat_message(f.course_id, author.id, text)
            .await
            .unwrap();
    }

    assert!(matches!(
        f.classroom.post_chat_message(f.course_id, f.outsider.id, "hi").await,
        Err(ClassroomError::Forbidden(_))
    ));
    assert!(matches!(
        f.classroom.post_chat_message(f.course_id, f.student.id, "   ").await,
        Err(ClassroomError::Validation { field: "content", .. })
    ));
    assert!(matches!(
        f.classroom
            .post_chat_message(f.course_id, f.student.id, &"x".repeat(4001))
            .await,
        Err(ClassroomError::Validation { field: "content", .. })
    ));

    let messages = f.classroom.list_chat_messages(f.course_id, f.ta.id).await.unwrap();
    let contents: Vec<&str> = messages.iter().map(|m| m.item.content.as_str()).collect();
    assert_eq!(contents, vec!["Is the quiz open book?", "Yes", "One page of notes"]);

    let first_author = messages[0].author.as_ref().unwrap();
    assert_eq!(first_author.email, f.student.email);
    assert_eq!(first_author.course_role, Some(CourseRole::Member));
}

#[tokio::test]
async fn test_removed_student_loses_access() {
    let f = content_fixture().await;

    f.classroom
        .post_chat_message(f.course_id, f.student.id, "bye")
        .await
        .unwrap();
    f.classroom
        .remove_person(f.course_id, f.teacher.id, f.student.id)
        .await
        .unwrap();

    assert!(matches!(
        f.classroom.list_chat_messages(f.course_id, f.student.id).await,
        Err(ClassroomError::Forbidden(_))
    ));

    let messages = f.classroom.list_chat_messages(f.course_id, f.teacher.id).await.unwrap();
    assert_eq!(messages[0].author.as_ref().unwrap().course_role, None);
}

// --- identity sync ---------------------------------------------------------

#[tokio::test]
async fn test_sync_user_creates_then_finds() {
    let (classroom, _store) = setup();
    let profile = ExternalProfile {
        external_id: "user_2abc".to_string(),
        email: "New.Student@School.test".to_string(),
        name: None,
        avatar_url: Some("https://img.example.com/a.png".to_string()),
    };

    let first = classroom.sync_user(profile.clone()).await.unwrap();
    assert!(first.created);
    assert_eq!(first.user.email, "new.student@school.test");
    assert_eq!(first.user.name, "new.student");
    assert_eq!(first.user.role, UserRole::Student);
    assert!(first.user.password_hash.is_none());

    let second = classroom.sync_user(profile).await.unwrap();
    assert!(!second.created);
    assert_eq!(second.user.id, first.user.id);
}

#[tokio::test]
async fn test_sync_user_links_existing_email() {
    let (classroom, store) = setup();
    let existing = user(&store, "Lovelace", UserRole::Teacher).await;

    let synced = classroom
        .sync_user(ExternalProfile {
            external_id: "user_ada".to_string(),
            email: existing.email.clone(),
            name: Some("Ada".to_string()),
            avatar_url: None,
        })
        .await
        .unwrap();

    assert!(!synced.created);
    assert_eq!(synced.user.id, existing.id);
    assert_eq!(synced.user.external_id.as_deref(), Some("user_ada"));
    assert_eq!(synced.user.role, UserRole::Teacher);
}

#[tokio::test]
async fn test_sync_user_requires_external_id() {
    let (classroom, _store) = setup();

    let err = classroom
        .sync_user(ExternalProfile {
            external_id: " ".to_string(),
            email: "x@school.test".to_string(),
            name: None,
            avatar_url: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClassroomError::Validation { field: "externalId", .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_syncs_of_new_profile_agree() {
    let (classroom, store) = setup();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let classroom = classroom.clone();
            tokio::spawn(async move {
                classroom
                    .sync_user(ExternalProfile {
                        external_id: "user_race".to_string(),
                        email: "race@school.test".to_string(),
                        name: None,
                        avatar_url: None,
                    })
                    .await
            })
        })
        .collect();

    let mut synced = Vec::new();
    for handle in handles {
        synced.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(synced.iter().filter(|s| s.created).count(), 1);
    let id = synced[0].user.id;
    assert!(synced.iter().all(|s| s.user.id == id));
    assert_eq!(store.find_user_by_external_id("user_race").await.unwrap().unwrap().id, id);
}

#[tokio::test]
async fn test_external_user_lookup() {
    let (classroom, _store) = setup();

    let synced = classroom
        .sync_user(ExternalProfile {
            external_id: "user_lookup".to_string(),
            email: "lookup@school.test".to_string(),
            name: Some("Lookup".to_string()),
            avatar_url: None,
        })
        .await
        .unwrap();

    let found = classroom.external_user("user_lookup").await.unwrap();
    assert_eq!(found.id, synced.user.id);

    assert!(matches!(
        classroom.external_user("user_missing").await,
        Err(ClassroomError::UserNotFound)
    ));
}
