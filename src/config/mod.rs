use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Secret used when `JWT_SECRET` is unset. Only tolerated in development.
const DEV_FALLBACK_JWT_SECRET: &str = "portfolio-dev-secret-change-me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set outside development")]
    MissingJwtSecret,

    #[error("Invalid ADMIN_SEED_POLICY '{0}' (expected 'reconcile' or 'replace')")]
    InvalidSeedPolicy(String),

    #[error("Failed to read admin seed file {path}: {source}")]
    SeedFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse admin seed file {path}: {source}")]
    SeedFileParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub seed: AdminSeedConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// When unset the service runs on the in-memory store (development only).
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// True when `jwt_secret` came from the built-in development fallback.
    pub jwt_secret_is_default: bool,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
}

/// Startup admin list and how to reconcile it against the stored admins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminSeedConfig {
    pub policy: SeedPolicy,
    pub admins: Vec<SeedAdmin>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedPolicy {
    /// Insert configured admins that are missing; never delete.
    #[default]
    Reconcile,
    /// Drop every stored admin and recreate the configured list.
    Replace,
}

impl std::str::FromStr for SeedPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reconcile" => Ok(SeedPolicy::Reconcile),
            "replace" => Ok(SeedPolicy::Replace),
            other => Err(ConfigError::InvalidSeedPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAdmin {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(default = "default_seed_role")]
    pub role: String,
}

fn default_seed_role() -> String {
    "superadmin".to_string()
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
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        match env::var("JWT_SECRET") {
            Ok(v) if !v.is_empty() => {
                self.security.jwt_secret = v;
                self.security.jwt_secret_is_default = false;
            }
            _ => {}
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Seed list from the ADMIN_* variables; the seed file is merged in `load_seed_file`
        if let Ok(v) = env::var("ADMIN_SEED_POLICY") {
            match v.parse() {
                Ok(policy) => self.seed.policy = policy,
                Err(e) => tracing::warn!("{}; keeping {:?}", e, self.seed.policy),
            }
        }
        let email = env::var("ADMIN_EMAIL").unwrap_or_default();
        let password = env::var("ADMIN_PASSWORD").unwrap_or_default();
        if !email.trim().is_empty() || !password.is_empty() {
            self.seed.admins.push(SeedAdmin {
                name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
                email: email.trim().to_string(),
                password,
                role: env::var("ADMIN_ROLE").unwrap_or_else(|_| default_seed_role()),
            });
        }

        self
    }

    /// Append admins listed in the YAML file named by `ADMIN_SEED_FILE`, if any.
    pub fn load_seed_file(&mut self) -> Result<(), ConfigError> {
        let Ok(path) = env::var("ADMIN_SEED_FILE") else {
            return Ok(());
        };
        let path = PathBuf::from(path);
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::SeedFileRead {
            path: path.clone(),
            source,
        })?;
        let admins: Vec<SeedAdmin> = serde_yaml::from_str(&raw)
            .map_err(|source| ConfigError::SeedFileParse { path, source })?;
        self.seed.admins.extend(admins);
        Ok(())
    }

    /// Startup checks that cannot be expressed as defaults.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret_is_default && self.environment != Environment::Development {
            return Err(ConfigError::MissingJwtSecret);
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: DEV_FALLBACK_JWT_SECRET.to_string(),
                jwt_secret_is_default: true,
                jwt_expiry_hours: 24 * 7, // 1 week
                bcrypt_cost: 10,
                cors_origins: Vec::new(),
            },
            seed: AdminSeedConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: DEV_FALLBACK_JWT_SECRET.to_string(),
                jwt_secret_is_default: true,
                jwt_expiry_hours: 24 * 7,
                bcrypt_cost: 10,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            seed: AdminSeedConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: DEV_FALLBACK_JWT_SECRET.to_string(),
                jwt_secret_is_default: true,
                jwt_expiry_hours: 24 * 7,
                bcrypt_cost: 12,
                cors_origins: Vec::new(),
            },
            seed: AdminSeedConfig::default(),
        }
    }

    /// Development defaults with a fixed secret and the cheapest bcrypt cost.
    pub fn for_tests() -> Self {
        let mut config = Self::development();
        config.security.jwt_secret = "test-secret".to_string();
        config.security.jwt_secret_is_default = false;
        config.security.bcrypt_cost = 4;
        config
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        $crate::config::CONFIG.is_production()
    };
}
