/// Database models for EduAI
///
/// This module contains all database models and their queries.
///
/// # Models
///
/// - `user`: User accounts, password or externally authenticated
/// - `course`: Courses with their unique class codes
/// - `membership`: User-course edges carrying the course role
/// - `announcement`, `assignment`, `lecture`, `chat_message`: course content
///
/// # Example
///
/// ```no_run
/// use eduai_shared::models::user::{CreateUser, User, UserRole};
/// use eduai_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     name: "Ada Lovelace".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: Some("$argon2id$...".to_string()),
///     external_id: None,
///     avatar_url: None,
///     role: UserRole::Teacher,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod announcement;
pub mod assignment;
pub mod chat_message;
pub mod course;
pub mod lecture;
pub mod membership;
pub mod user;
