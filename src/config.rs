use anyhow::{bail, Result};
use std::env;

use crate::validation::is_email;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    /// Explicit `LOG_FORMAT` value, otherwise JSON in production and pretty elsewhere.
    pub fn resolve(value: Option<&str>, env: &Environment) -> Self {
        match value.map(|s| s.to_lowercase()).as_deref() {
            Some("json") => Self::Json,
            Some("compact") => Self::Compact,
            Some("pretty") => Self::Pretty,
            _ if env.is_prod() => Self::Json,
            _ => Self::Pretty,
        }
    }
}

const DEV_JWT_SECRET: &str = "dev-only-jwt-secret-change-me";
const DEV_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_ADMIN_EMAIL: &str = "admin@sudanese-house.local";

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub log_format: LogFormat,
    pub server_addr: String,

    // Database (absent => in-memory storage)
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub database_connect_retry_seconds: u64,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Auth
    pub jwt_secret: String,
    pub jwt_ttl_seconds: i64,
    pub admin_username: String,
    pub admin_password: String,
    pub admin_email: String,

    // Moderation
    pub auto_approve_listings: bool,

    // HTTP
    pub request_body_limit_bytes: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let log_format = LogFormat::resolve(env::var("LOG_FORMAT").ok().as_deref(), &env);
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // Database
        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty());
        let database_max_connections = parse_var("DATABASE_MAX_CONNECTIONS").unwrap_or(10);
        let database_connect_retry_seconds =
            parse_var("DATABASE_CONNECT_RETRY_SECONDS").unwrap_or(30);

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Auth
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if env.is_prod() => bail!("JWT_SECRET must be set in production"),
            Err(_) => DEV_JWT_SECRET.to_string(),
        };
        let jwt_ttl_seconds = parse_var("JWT_TTL_SECONDS").unwrap_or(86400); // 24 hours
        let admin_username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let admin_password = match env::var("ADMIN_PASSWORD") {
            Ok(password) => password,
            Err(_) if env.is_prod() => bail!("ADMIN_PASSWORD must be set in production"),
            Err(_) => DEV_ADMIN_PASSWORD.to_string(),
        };
        let admin_email = env::var("ADMIN_EMAIL")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());

        let auto_approve_listings = env::var("AUTO_APPROVE_LISTINGS")
            .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let request_body_limit_bytes =
            parse_var("REQUEST_BODY_LIMIT_BYTES").unwrap_or(1024 * 1024);

        let settings = Settings {
            env,
            log_format,
            server_addr,
            database_url,
            database_max_connections,
            database_connect_retry_seconds,
            cors_allow_origins,
            jwt_secret,
            jwt_ttl_seconds,
            admin_username,
            admin_password,
            admin_email,
            auto_approve_listings,
            request_body_limit_bytes,
        };
        settings.check()?;
        Ok(settings)
    }

    fn check(&self) -> Result<()> {
        if self.jwt_secret.len() < 16 {
            bail!("JWT_SECRET must be at least 16 characters");
        }
        if self.admin_username.trim().len() < 3 {
            bail!("ADMIN_USERNAME must be at least 3 characters");
        }
        if self.admin_password.len() < 6 {
            bail!("ADMIN_PASSWORD must be at least 6 characters");
        }
        if !is_email(&self.admin_email) {
            bail!("ADMIN_EMAIL must be a valid email address");
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parsing_defaults_to_dev() {
        assert_eq!(Environment::from_str("production"), Environment::Prod);
        assert_eq!(Environment::from_str("PROD"), Environment::Prod);
        assert_eq!(Environment::from_str("staging"), Environment::Staging);
        assert_eq!(Environment::from_str("anything"), Environment::Dev);
    }

    #[test]
    fn log_format_follows_environment_unless_overridden() {
        assert_eq!(LogFormat::resolve(None, &Environment::Prod), LogFormat::Json);
        assert_eq!(LogFormat::resolve(None, &Environment::Dev), LogFormat::Pretty);
        assert_eq!(
            LogFormat::resolve(Some("COMPACT"), &Environment::Prod),
            LogFormat::Compact
        );
    }

    #[test]
    fn short_secret_is_rejected() {
        let settings = Settings {
            env: Environment::Dev,
            log_format: LogFormat::Compact,
            server_addr: "127.0.0.1:0".to_string(),
            database_url: None,
            database_max_connections: 1,
            database_connect_retry_seconds: 1,
            cors_allow_origins: vec![],
            jwt_secret: "short".to_string(),
            jwt_ttl_seconds: 60,
            admin_username: "admin".to_string(),
            admin_password: "secret123".to_string(),
            admin_email: "admin@example.com".to_string(),
            auto_approve_listings: false,
            request_body_limit_bytes: 1024,
        };
        assert!(settings.check().is_err());
    }

    #[test]
    fn default_admin_email_passes_email_rule() {
        assert!(is_email(DEFAULT_ADMIN_EMAIL));

        let settings = Settings {
            env: Environment::Dev,
            log_format: LogFormat::Compact,
            server_addr: "127.0.0.1:0".to_string(),
            database_url: None,
            database_max_connections: 1,
            database_connect_retry_seconds: 1,
            cors_allow_origins: vec![],
            jwt_secret: "long-enough-secret-value".to_string(),
            jwt_ttl_seconds: 60,
            admin_username: "admin".to_string(),
            admin_password: "secret123".to_string(),
            admin_email: "admin@localhost".to_string(),
            auto_approve_listings: false,
            request_body_limit_bytes: 1024,
        };
        assert!(settings.check().is_err());
    }
}
