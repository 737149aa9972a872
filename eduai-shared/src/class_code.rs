/// Class code generation and validation
///
/// Class codes are short public tokens students type in to join a course.
/// Every code is exactly 7 characters from `[a-z0-9]`.
///
/// # Variants
///
/// - **Friendly**: `abc123d` shape (3 letters, 3 digits, 1 letter), drawn
///   from `rand::thread_rng()`. About 1.19 × 10^8 combinations.
/// - **Secure**: 7 bytes from the OS CSPRNG, each mapped modulo 36 into
///   `[a-z0-9]`. The modulo bias is accepted; codes are obfuscated
///   identifiers, not secrets.
///
/// # Example
///
/// ```
/// use eduai_shared::class_code::{generate_code, generate_secure_code, is_valid_code};
///
/// let code = generate_code();
/// assert!(is_valid_code(code.as_str()));
///
/// let secure = generate_secure_code();
/// assert!(is_valid_code(secure.as_str()));
/// ```

use rand::{rngs::OsRng, Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of every class code (characters)
pub const CLASS_CODE_LENGTH: usize = 7;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// A syntactically valid, lowercase class code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClassCode(String);

impl ClassCode {
    /// Parses user input into a class code
    ///
    /// Input is trimmed and lowercased first, so `" ABC123D "` parses to
    /// `abc123d`. Returns `None` if the normalized input is not a valid code.
    ///
    /// # Example
    ///
    /// ```
    /// use eduai_shared::class_code::ClassCode;
    ///
    /// let code = ClassCode::parse(" ABC123D ").unwrap();
    /// assert_eq!(code.as_str(), "abc123d");
    ///
    /// assert!(ClassCode::parse("abc-12").is_none());
    /// ```
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = input.trim().to_ascii_lowercase();
        if is_valid_code(&normalized) {
            Some(Self(normalized))
        } else {
            None
        }
    }

    /// Returns the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ClassCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ClassCode::parse(&value).ok_or_else(|| format!("invalid class code: {}", value))
    }
}

impl From<ClassCode> for String {
    fn from(code: ClassCode) -> Self {
        code.0
    }
}

/// Generates a human-friendly class code (`[a-z]{3}[0-9]{3}[a-z]`)
pub fn generate_code() -> ClassCode {
    let mut rng = rand::thread_rng();
    let mut pick = |charset: &[u8]| charset[rng.gen_range(0..charset.len())] as char;

    let mut code = String::with_capacity(CLASS_CODE_LENGTH);
    for _ in 0..3 {
        code.push(pick(LETTERS));
    }
    for _ in 0..3 {
        code.push(pick(DIGITS));
    }
    code.push(pick(LETTERS));

    ClassCode(code)
}

/// Generates a class code from the operating system's CSPRNG
pub fn generate_secure_code() -> ClassCode {
    let mut bytes = [0u8; CLASS_CODE_LENGTH];
    OsRng.fill_bytes(&mut bytes);

    let code = bytes
        .iter()
        .map(|byte| ALPHABET[*byte as usize % ALPHABET.len()] as char)
        .collect();

    ClassCode(code)
}

/// Returns true iff `code` is exactly 7 characters from `[a-z0-9]`
///
/// No normalization happens here: `"ABC123D"` is not valid.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CLASS_CODE_LENGTH
        && code
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// Source of candidate class codes
///
/// The classroom coordinator draws candidates from this trait so that the
/// style can be configured and tests can force collisions.
pub trait CodeGenerator: Send + Sync {
    /// Produces the next candidate code
    fn generate(&self) -> ClassCode;
}

/// Generator for [`generate_code`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FriendlyCodes;

impl CodeGenerator for FriendlyCodes {
    fn generate(&self) -> ClassCode {
        generate_code()
    }
}

/// Generator for [`generate_secure_code`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureCodes;

impl CodeGenerator for SecureCodes {
    fn generate(&self) -> ClassCode {
        generate_secure_code()
    }
}

/// Configurable code style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeStyle {
    /// Letters-digits-letter, easy to read aloud
    #[default]
    Friendly,

    /// Uniform over the whole alphabet, from the OS CSPRNG
    Secure,
}

impl CodeStyle {
    /// Parses a style name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "friendly" => Some(CodeStyle::Friendly),
            "secure" => Some(CodeStyle::Secure),
            _ => None,
        }
    }

    /// Returns the generator for this style
    pub fn generator(self) -> Box<dyn CodeGenerator> {
        match self {
            CodeStyle::Friendly => Box::new(FriendlyCodes),
            CodeStyle::Secure => Box::new(SecureCodes),
        }
    }
}
