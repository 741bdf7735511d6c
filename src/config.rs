use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment};
use serde::Deserialize;

use crate::error::AppError;

/// Database file used when the server runs with `--debug`.
pub const DEBUG_DATABASE_PATH: &str = "chirps_debug.json";

/// Runtime settings.
///
/// Sources, lowest precedence first: built-in defaults, then environment
/// variables (`BIND_ADDR`, `DATABASE_PATH`, `STATIC_DIR`, `JWT_SECRET`,
/// `POLKA_API_KEY`).
#[derive(Clone, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub database_path: PathBuf,
    /// Root of the `/app` static file server.
    pub static_dir: PathBuf,
    /// HS256 secret for every issued token. Must not be empty.
    pub jwt_secret: String,
    /// Key the payment provider presents on webhooks.
    pub polka_api_key: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("bind_addr", &self.bind_addr)
            .field("database_path", &self.database_path)
            .field("static_dir", &self.static_dir)
            .finish_non_exhaustive()
    }
}

fn config_error(err: config::ConfigError) -> AppError {
    AppError::Internal(format!("Invalid configuration: {err}"))
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::build(Self::defaults()?.add_source(Environment::default()))
    }

    /// The built-in defaults, ready for further sources or overrides.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, AppError> {
        Config::builder()
            .set_default("bind_addr", "0.0.0.0:8080")
            .and_then(|b| b.set_default("database_path", "chirps.json"))
            .and_then(|b| b.set_default("static_dir", "./public"))
            .and_then(|b| b.set_default("jwt_secret", ""))
            .and_then(|b| b.set_default("polka_api_key", ""))
            .map_err(config_error)
    }

    /// Resolve a builder into validated settings.
    pub fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppError> {
        let settings: Settings = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error)?;

        if settings.jwt_secret.is_empty() {
            return Err(AppError::Internal("JWT_SECRET must be set".into()));
        }
        if settings.polka_api_key.is_empty() {
            tracing::warn!("POLKA_API_KEY is not set; payment webhooks will be rejected");
        }

        Ok(settings)
    }

    /// Switch to the throwaway debug database.
    pub fn into_debug(mut self) -> Self {
        self.database_path = PathBuf::from(DEBUG_DATABASE_PATH);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_with_secret() {
        let builder = Settings::defaults()
            .unwrap()
            .set_override("jwt_secret", "s3cret")
            .unwrap();
        let settings = Settings::build(builder).unwrap();

        assert_eq!(settings.bind_addr, "0.0.0.0:8080");
        assert_eq!(settings.database_path, PathBuf::from("chirps.json"));
        assert_eq!(settings.static_dir, PathBuf::from("./public"));
        assert_eq!(settings.jwt_secret, "s3cret");
        assert!(settings.polka_api_key.is_empty());
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let result = Settings::build(Settings::defaults().unwrap());
        match result {
            Err(AppError::Internal(msg)) => assert!(msg.contains("JWT_SECRET")),
            other => panic!("Expected Internal error, got: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_overrides() {
        let builder = Settings::defaults()
            .unwrap()
            .set_override("jwt_secret", "s3cret")
            .unwrap()
            .set_override("bind_addr", "127.0.0.1:9999")
            .unwrap()
            .set_override("polka_api_key", "polka")
            .unwrap();
        let settings = Settings::build(builder).unwrap();

        assert_eq!(settings.bind_addr, "127.0.0.1:9999");
        assert_eq!(settings.polka_api_key, "polka");
    }

    #[test]
    fn test_debug_database() {
        let builder = Settings::defaults()
            .unwrap()
            .set_override("jwt_secret", "s3cret")
            .unwrap();
        let settings = Settings::build(builder).unwrap().into_debug();
        assert_eq!(settings.database_path, PathBuf::from(DEBUG_DATABASE_PATH));
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        let builder = Settings::defaults()
            .unwrap()
            .set_override("jwt_secret", "s3cret")
            .unwrap();
        let settings = Settings::build(builder).unwrap();
        assert!(!format!("{settings:?}").contains("s3cret"));
    }
}
