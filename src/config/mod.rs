use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Secret used when SESSION_SECRET is not set. Refused in production.
pub const DEFAULT_SESSION_SECRET: &str = "SecretKey";

/// Longest accepted SESSION_TTL_HOURS (one year)
pub const MAX_SESSION_TTL_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://...` or `memory://` for the in-process store
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(skip_serializing)]
    pub secret: String,
    pub cookie_name: String,
    pub ttl_hours: u64,
    pub secure_cookie: bool,
}

impl SessionConfig {
    /// Session lifetime, capped at `MAX_SESSION_TTL_HOURS`
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours.min(MAX_SESSION_TTL_HOURS) as i64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    /// When false, registering a user requires an admin session
    pub open_registration: bool,
    pub min_password_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    /// Base URL stored images are resolved against, e.g. http://localhost:5000/uploads/
    pub public_base_url: String,
    pub max_image_bytes: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SESSION_SECRET must be set in production")]
    DefaultSessionSecret,
    #[error("Invalid PUBLIC_BASE_URL '{0}'")]
    InvalidPublicBaseUrl(String),
    #[error("PORT must be non-zero")]
    InvalidPort,
    #[error("SESSION_TTL_HOURS must be between 1 and {max}, got {0}", max = MAX_SESSION_TTL_HOURS)]
    InvalidSessionTtl(u64),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout =
                v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging =
                v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes =
                v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_SECRET") {
            self.session.secret = v;
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.session.cookie_name = v;
        }
        if let Ok(v) = env::var("SESSION_TTL_HOURS") {
            self.session.ttl_hours = v.parse().unwrap_or(self.session.ttl_hours);
        }
        if let Ok(v) = env::var("SESSION_SECURE_COOKIE") {
            self.session.secure_cookie = v.parse().unwrap_or(self.session.secure_cookie);
        }

        // Security overrides
        if let Ok(v) = env::var("CORS_ORIGIN") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("OPEN_REGISTRATION") {
            self.security.open_registration = v.parse().unwrap_or(self.security.open_registration);
        }
        if let Ok(v) = env::var("MIN_PASSWORD_LENGTH") {
            self.security.min_password_length =
                v.parse().unwrap_or(self.security.min_password_length);
        }

        // Storage overrides
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.storage.upload_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("PUBLIC_BASE_URL") {
            self.storage.public_base_url = v;
        }
        if let Ok(v) = env::var("MAX_IMAGE_BYTES") {
            self.storage.max_image_bytes = v.parse().unwrap_or(self.storage.max_image_bytes);
        }

        self
    }

    /// Reject settings the server must not start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment == Environment::Production
            && self.session.secret == DEFAULT_SESSION_SECRET
        {
            return Err(ConfigError::DefaultSessionSecret);
        }
        if url::Url::parse(&self.storage.public_base_url).is_err() {
            return Err(ConfigError::InvalidPublicBaseUrl(
                self.storage.public_base_url.clone(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session.ttl_hours) {
            return Err(ConfigError::InvalidSessionTtl(self.session.ttl_hours));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: "postgres://localhost:5432/sitecms".to_string(),
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            session: SessionConfig {
                secret: DEFAULT_SESSION_SECRET.to_string(),
                cookie_name: "sitecms.sid".to_string(),
                ttl_hours: 24,
                secure_cookie: false,
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:5173".to_string()],
                open_registration: true,
                min_password_length: 8,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("uploads"),
                public_base_url: "http://localhost:5000/uploads/".to_string(),
                max_image_bytes: 8 * 1024 * 1024,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.session.secure_cookie = true;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config.security.open_registration = false;
        config.storage.public_base_url = "https://staging.example.com/uploads/".to_string();
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.api.enable_request_logging = false;
        config.api.max_request_size_bytes = 10 * 1024 * 1024;
        config.session.secure_cookie = true;
        config.security.cors_origins = vec!["https://www.example.com".to_string()];
        config.security.open_registration = false;
        config.security.min_password_length = 12;
        config.storage.public_base_url = "https://www.example.com/uploads/".to_string();
        config.storage.max_image_bytes = 5 * 1024 * 1024;
        config
    }
}
