use serde::{Deserialize, Serialize};
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub views: ViewsConfig,
    pub security: SecurityConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    /// Reads `ENV`, falling back to `ENVIRONMENT`.
    pub fn from_env() -> Self {
        env::var("ENV")
            .or_else(|_| env::var("ENVIRONMENT"))
            .map(|v| Environment::parse(&v))
            .unwrap_or(Environment::Development)
    }

    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewsConfig {
    pub dir: PathBuf,
    pub static_dir: PathBuf,
    /// Rebuild every template bundle before each render.
    pub compile_on_render: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub session_secret: String,
    pub session_ttl_days: i64,
    pub session_store: SessionStoreKind,
    pub cookie_secure: bool,
    pub require_login: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub cognito_client_id: String,
    pub cognito_region: String,
    pub cognito_endpoint: Option<String>,
}

const DEV_SESSION_SECRET: &str =
    "htmxtodo-development-session-secret-not-for-production-use-0123456789abcdef";

/// Longest session lifetime accepted, in days
pub const MAX_SESSION_TTL_DAYS: i64 = 3650;

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Set defaults based on environment, then override with specific env vars
        match Environment::from_env() {
            Environment::Production => Self::production(),
            Environment::Test => Self::test(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?
        .validated()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Some(host) = env_value("HOST")? {
            self.server.host = host;
        }
        if let Some(port) = env_value("PORT")? {
            self.server.port = port;
        }

        // Database overrides
        let url_key = match self.environment {
            Environment::Test => "TEST_DATABASE_URL",
            _ => "DATABASE_URL",
        };
        if let Ok(v) = env::var(url_key) {
            self.database.url = v;
        }
        if let Some(max) = env_value("DATABASE_MAX_CONNECTIONS")? {
            self.database.max_connections = max;
        }
        if let Some(flag) = env_flag("DATABASE_AUTO_MIGRATE")? {
            self.database.auto_migrate = flag;
        }

        // View overrides
        if let Ok(v) = env::var("VIEWS_DIR") {
            self.views.dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("STATIC_DIR") {
            self.views.static_dir = PathBuf::from(v);
        }
        if let Some(flag) = env_flag("VIEWS_COMPILE_ON_RENDER")? {
            self.views.compile_on_render = flag;
        }

        // Security overrides
        if let Ok(v) = env::var("SESSION_SECRET") {
            if !v.is_empty() {
                self.security.session_secret = v;
            }
        }
        if let Some(days) = env_value("SESSION_TTL_DAYS")? {
            self.security.session_ttl_days = days;
        }
        if let Ok(v) = env::var("SESSION_STORE") {
            self.security.session_store = match v.to_ascii_lowercase().as_str() {
                "memory" => SessionStoreKind::Memory,
                "postgres" => SessionStoreKind::Postgres,
                _ => return Err(ConfigError::Invalid { name: "SESSION_STORE", value: v }),
            };
        }
        if let Some(flag) = env_flag("COOKIE_SECURE")? {
            self.security.cookie_secure = flag;
        }
        if let Some(flag) = env_flag("REQUIRE_LOGIN")? {
            self.security.require_login = flag;
        }

        // Identity provider overrides
        if let Ok(v) = env::var("COGNITO_CLIENT_ID") {
            self.identity.cognito_client_id = v;
        }
        if let Ok(v) = env::var("COGNITO_REGION").or_else(|_| env::var("AWS_REGION")) {
            if !v.is_empty() {
                self.identity.cognito_region = v;
            }
        }
        if let Ok(v) = env::var("COGNITO_ENDPOINT") {
            self.identity.cognito_endpoint = Some(v).filter(|s| !s.is_empty());
        }

        Ok(self)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.database.url.is_empty() {
            return Err(ConfigError::Missing(match self.environment {
                Environment::Test => "TEST_DATABASE_URL",
                _ => "DATABASE_URL",
            }));
        }
        if self.environment == Environment::Production && self.security.session_secret.is_empty() {
            return Err(ConfigError::Missing("SESSION_SECRET"));
        }
        if self.security.session_secret.len() < crate::auth::MIN_SECRET_BYTES {
            return Err(ConfigError::Invalid {
                name: "SESSION_SECRET",
                value: format!("must be at least {} bytes", crate::auth::MIN_SECRET_BYTES),
            });
        }
        if !(1..=MAX_SESSION_TTL_DAYS).contains(&self.security.session_ttl_days) {
            return Err(ConfigError::Invalid {
                name: "SESSION_TTL_DAYS",
                value: self.security.session_ttl_days.to_string(),
            });
        }
        if self.security.session_secret == DEV_SESSION_SECRET {
            tracing::warn!("SESSION_SECRET not set, using the development secret");
        }
        Ok(self)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Database URL with the password replaced, for logging.
    pub fn redacted_database_url(&self) -> String {
        match url::Url::parse(&self.database.url) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("***"));
                }
                url.into()
            }
            Err(_) => "<unparseable>".to_string(),
        }
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: IpAddr::from([0, 0, 0, 0]),
                port: 8080,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 5,
                auto_migrate: true,
            },
            views: ViewsConfig {
                dir: PathBuf::from("views"),
                static_dir: PathBuf::from("static"),
                compile_on_render: true,
            },
            security: SecurityConfig {
                session_secret: DEV_SESSION_SECRET.to_string(),
                session_ttl_days: 30,
                session_store: SessionStoreKind::Postgres,
                cookie_secure: false,
                require_login: true,
            },
            identity: IdentityConfig {
                cognito_client_id: String::new(),
                cognito_region: "us-east-1".to_string(),
                cognito_endpoint: None,
            },
        }
    }

    pub fn test() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Test;
        config.views.compile_on_render = false;
        config
    }

    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 10;
        config.database.auto_migrate = false;
        config.views.compile_on_render = false;
        config.security.session_secret = String::new();
        config.security.cookie_secure = true;
        config
    }
}

/// Parsed value of a set, non-blank variable
fn env_value<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => parse_value(name, &v).map(Some),
        _ => Ok(None),
    }
}

fn env_flag(name: &'static str) -> Result<Option<bool>, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => parse_flag(name, &v).map(Some),
        _ => Ok(None),
    }
}

fn parse_value<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}
