/// Configuration management for the API server
///
/// Configuration is loaded from environment variables (and a `.env` file if
/// present).
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `API_PRODUCTION`: Enables HSTS (default: false)
/// - `STORAGE_BACKEND`: `postgres` or `memory` (default: postgres)
/// - `DATABASE_URL`: PostgreSQL connection string (required for postgres)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for JWT signing (required, 32+ characters)
/// - `CLASS_CODE_MAX_ATTEMPTS`: Code candidates per course creation (default: 10)
/// - `CLASS_CODE_STYLE`: `friendly` or `secure` (default: friendly)
/// - `IDENTITY_SYNC_SECRET`: Enables the identity-provider sync and lookup endpoints
/// - `RUST_LOG`, `LOG_FORMAT`: Logging, read by the binary
///
/// # Example
///
/// ```no_run
/// use eduai_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use eduai_shared::class_code::CodeStyle;
use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,

    pub storage: StorageBackend,

    /// Present when `storage` is `Postgres`
    pub database: Option<DatabaseConfig>,

    pub jwt: JwtConfig,

    pub class_code: ClassCodeConfig,

    /// Shared secret for the identity-provider sync endpoint
    #[serde(skip_serializing)]
    pub identity_sync_secret: Option<String>,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,

    /// Production mode adds HSTS
    pub production: bool,
}

/// Where records live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,

    /// Process-local, lost on restart
    Memory,
}

impl StorageBackend {
    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Some(StorageBackend::Postgres),
            "memory" => Some(StorageBackend::Memory),
            _ => None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[serde(skip_serializing)]
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,
}

/// Class code issuance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassCodeConfig {
    pub max_attempts: u32,
    pub style: CodeStyle,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "*")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let production = parse_bool(&var("API_PRODUCTION", "false"))
            .ok_or_else(|| anyhow::anyhow!("API_PRODUCTION must be true or false"))?;

        let storage = StorageBackend::from_name(&var("STORAGE_BACKEND", "postgres"))
            .ok_or_else(|| anyhow::anyhow!("STORAGE_BACKEND must be postgres or memory"))?;

        let database = match storage {
            StorageBackend::Postgres => {
                let url = lookup("DATABASE_URL").ok_or_else(|| {
                    anyhow::anyhow!("DATABASE_URL environment variable is required")
                })?;
                let max_connections = var("DATABASE_MAX_CONNECTIONS", "10")
                    .parse::<u32>()
                    .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;
                Some(DatabaseConfig {
                    url,
                    max_connections,
                })
            }
            StorageBackend::Memory => None,
        };

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let max_attempts = var("CLASS_CODE_MAX_ATTEMPTS", "10")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("CLASS_CODE_MAX_ATTEMPTS is invalid: {}", e))?;
        if max_attempts == 0 {
            anyhow::bail!("CLASS_CODE_MAX_ATTEMPTS must be at least 1");
        }

        let style = CodeStyle::from_name(&var("CLASS_CODE_STYLE", "friendly"))
            .ok_or_else(|| anyhow::anyhow!("CLASS_CODE_STYLE must be friendly or secure"))?;

        let identity_sync_secret = lookup("IDENTITY_SYNC_SECRET").filter(|s| !s.is_empty());

        Ok(Self {
            api: ApiConfig {
                host: var("API_HOST", "0.0.0.0"),
                port,
                cors_origins,
                production,
            },
            storage,
            database,
            jwt: JwtConfig { secret: jwt_secret },
            class_code: ClassCodeConfig {
                max_attempts,
                style,
            },
            identity_sync_secret,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
