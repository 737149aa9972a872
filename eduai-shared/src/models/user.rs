/// User model and database operations
///
/// Users are either registered with a password or synced from an external
/// identity provider (in which case `password_hash` is NULL and `external_id`
/// is set). Course roles live in the memberships table; the `role` column
/// here is only the user's default shown by clients.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('teacher', 'student', 'ta');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(320) NOT NULL UNIQUE,
///     password_hash VARCHAR(255),
///     external_id VARCHAR(255) UNIQUE,
///     avatar_url VARCHAR(1024),
///     role user_role NOT NULL DEFAULT 'student',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Account-level role
///
/// A display default for clients. Authorization never reads it: what a user
/// may do in a course is decided by their membership in that course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Teacher,
    #[default]
    Student,
    Ta,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Teacher => "TEACHER",
            UserRole::Student => "STUDENT",
            UserRole::Ta => "TA",
        }
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, stored lowercase
    pub email: String,

    /// Argon2id hash; `None` for externally authenticated accounts
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    /// Identity-provider user ID
    pub external_id: Option<String>,

    pub avatar_url: Option<String>,

    pub role: UserRole,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,

    /// Email address (lowercased before storage)
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: Option<String>,

    pub external_id: Option<String>,

    pub avatar_url: Option<String>,

    pub role: UserRole,
}

/// Public projection of a user used in rosters and author fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Normalizes an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, external_id, avatar_url, role, created_at, updated_at";

impl User {
    /// Returns true if the account can log in with a password
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the email or external ID is already taken
    /// (unique constraint violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO users (name, email, password_hash, external_id, avatar_url, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.name)
            .bind(normalize_email(&data.email))
            .bind(data.password_hash)
            .bind(data.external_id)
            .bind(data.avatar_url)
            .bind(data.role)
            .fetch_one(pool)
            .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(normalize_email(email))
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by identity-provider ID
    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE external_id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Loads several users at once, in no particular order
    ///
    /// Missing IDs are skipped.
    pub async fn find_many(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");

        sqlx::query_as::<_, User>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Links an identity-provider ID to an existing account
    ///
    /// Returns the updated user, or `None` if the user doesn't exist.
    pub async fn set_external_id(
        pool: &PgPool,
        id: Uuid,
        external_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE users
            SET external_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }
}
