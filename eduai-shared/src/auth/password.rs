/// Password hashing and strength rules
///
/// Hashes are Argon2id PHC strings with a random 16-byte salt. Parameters
/// follow the OWASP baseline for Argon2id (19 MiB memory, 2 passes, 1 lane)
/// and are embedded in each hash, so raising them later does not invalidate
/// existing accounts.
///
/// # Example
///
/// ```
/// use eduai_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Sup3r$ecret")?;
///
/// assert!(verify_password("Sup3r$ecret", &hash)?);
/// assert!(!verify_password("wrong", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};
use std::fmt;

/// Argon2id memory cost in KiB
const MEMORY_COST_KIB: u32 = 19 * 1024;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

/// Minimum password length (characters)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Stored hash is not a PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// A strength rule the password failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeakPassword {
    TooShort,
    NoUppercase,
    NoLowercase,
    NoDigit,
    NoSpecial,
}

impl fmt::Display for WeakPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            WeakPassword::TooShort => "Password must be at least 8 characters long",
            WeakPassword::NoUppercase => "Password must contain at least one uppercase letter",
            WeakPassword::NoLowercase => "Password must contain at least one lowercase letter",
            WeakPassword::NoDigit => "Password must contain at least one digit",
            WeakPassword::NoSpecial => "Password must contain at least one special character",
        };
        f.write_str(message)
    }
}

fn argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(MEMORY_COST_KIB)
        .t_cost(TIME_COST)
        .p_cost(PARALLELISM)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password, returning a PHC string
/// (`$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash
///
/// Returns `Ok(false)` for a wrong password and an error only when the
/// stored hash itself is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // parameters come from the hash itself
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Checks the password against the strength rules, reporting the first
/// rule it fails
///
/// # Example
///
/// ```
/// use eduai_shared::auth::password::{validate_password_strength, WeakPassword};
///
/// assert!(validate_password_strength("MyP@ssw0rd!").is_ok());
/// assert_eq!(validate_password_strength("Sh0rt!"), Err(WeakPassword::TooShort));
/// assert_eq!(validate_password_strength("Password123"), Err(WeakPassword::NoSpecial));
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), WeakPassword> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(WeakPassword::TooShort);
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(WeakPassword::NoUppercase);
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(WeakPassword::NoLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(WeakPassword::NoDigit);
    }
    if password.chars().all(char::is_alphanumeric) {
        return Err(WeakPassword::NoSpecial);
    }

    Ok(())
}
