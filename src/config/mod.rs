use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

/// Identity-provider settings. The issuer URL and JWKS endpoint are derived
/// from the tenant domain the same way the original Auth0 deployment did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub domain: String,
    pub audience: String,
    pub jwks_ttl_secs: u64,
}

impl AuthConfig {
    pub fn issuer_url(&self) -> String {
        format!("https://{}/", self.domain)
    }

    pub fn jwks_url(&self) -> String {
        format!("{}.well-known/jwks.json", self.issuer_url())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_max_age_secs: u64,
    pub hsts_max_age_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment presets first, then specific env vars win
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH_DOMAIN") {
            self.auth.domain = v;
        }
        if let Ok(v) = env::var("AUTH_AUDIENCE") {
            self.auth.audience = v;
        }
        if let Ok(v) = env::var("AUTH_JWKS_TTL_SECS") {
            self.auth.jwks_ttl_secs = v.parse().unwrap_or(self.auth.jwks_ttl_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_MAX_AGE_SECS") {
            self.security.cors_max_age_secs = v.parse().unwrap_or(self.security.cors_max_age_secs);
        }
        if let Ok(v) = env::var("SECURITY_HSTS_MAX_AGE_SECS") {
            self.security.hsts_max_age_secs = v.parse().unwrap_or(self.security.hsts_max_age_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
            },
            auth: AuthConfig {
                domain: String::new(),
                audience: String::new(),
                jwks_ttl_secs: 600,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_max_age_secs: 86400,
                hsts_max_age_secs: 31536000,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
            },
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
            },
            ..Self::development()
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.auth.jwks_ttl_secs, 600);
        assert!(config.security.enable_cors);
    }

    #[test]
    fn issuer_and_jwks_urls_derive_from_domain() {
        let auth = AuthConfig {
            domain: "tenant.eu.auth0.com".to_string(),
            audience: "https://gutachten.example/api".to_string(),
            jwks_ttl_secs: 600,
        };
        assert_eq!(auth.issuer_url(), "https://tenant.eu.auth0.com/");
        assert_eq!(
            auth.jwks_url(),
            "https://tenant.eu.auth0.com/.well-known/jwks.json"
        );
    }
}
