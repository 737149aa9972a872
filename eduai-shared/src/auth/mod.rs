/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`jwt`]: HS256 access and refresh tokens
/// - [`middleware`]: bearer-token authentication yielding an `AuthContext`
/// - [`authorization`]: the course content gate
///
/// # Example
///
/// ```
/// use eduai_shared::auth::password::{hash_password, verify_password};
/// use eduai_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
/// use eduai_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Us3r_password!")?;
/// assert!(verify_password("Us3r_password!", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), UserRole::Student, TokenType::Access);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
