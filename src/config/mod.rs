use std::env;

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_access_token_expiry_secs: i64,
    pub jwt_refresh_token_expiry_secs: i64,
    pub frontend_url: String,
    /// Offset of the clinic's local time from UTC, in minutes.
    pub clinic_utc_offset_minutes: i32,
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_access_token_expiry_secs: env::var("JWT_ACCESS_TOKEN_EXPIRY_SECS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()
                .unwrap_or(900),
            jwt_refresh_token_expiry_secs: env::var("JWT_REFRESH_TOKEN_EXPIRY_SECS")
                .unwrap_or_else(|_| "604800".to_string())
                .parse()
                .unwrap_or(604800),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            clinic_utc_offset_minutes: env::var("CLINIC_UTC_OFFSET_MINUTES")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .unwrap_or(0),
            tls_cert_path: env::var("TLS_CERT_PATH").ok().filter(|v| !v.is_empty()),
            tls_key_path: env::var("TLS_KEY_PATH").ok().filter(|v| !v.is_empty()),
        })
    }

    /// The clinic's local time zone. Out-of-range offsets fall back to UTC.
    pub fn clinic_offset(&self) -> FixedOffset {
        self.clinic_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Current instant in the clinic's local time zone.
    pub fn clinic_now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.clinic_offset())
    }

    /// TLS certificate and key paths, when both are configured.
    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        match (&self.tls_cert_path, &self.tls_key_path) {
            (Some(cert), Some(key)) => Some((cert.as_str(), key.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_offset(minutes: i32) -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/test".to_string(),
            database_max_connections: 1,
            redis_url: "redis://localhost:6379".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: "secret".to_string(),
            jwt_access_token_expiry_secs: 900,
            jwt_refresh_token_expiry_secs: 604800,
            frontend_url: "http://localhost:3001".to_string(),
            clinic_utc_offset_minutes: minutes,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }

    #[test]
    fn clinic_offset_from_minutes() {
        let config = config_with_offset(120);
        assert_eq!(config.clinic_offset().local_minus_utc(), 7200);
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let config = config_with_offset(60 * 30);
        assert_eq!(config.clinic_offset().local_minus_utc(), 0);
    }

    #[test]
    fn tls_requires_both_paths() {
        let mut config = config_with_offset(0);
        config.tls_cert_path = Some("cert.pem".to_string());
        assert!(config.tls_paths().is_none());
        config.tls_key_path = Some("key.pem".to_string());
        assert_eq!(config.tls_paths(), Some(("cert.pem", "key.pem")));
    }
}
