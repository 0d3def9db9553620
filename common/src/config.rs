//! Global configuration for the gradebook services.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton holding
//! values loaded from environment variables (and a `.env` file when present).
//! Setters exist so tests can override individual fields and `reset()` them.

use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock, RwLockReadGuard};

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    /// Page size used when a listing request does not name one.
    pub default_page_size: u64,
    /// Upper bound accepted for an explicit page size.
    pub max_page_size: u64,
}

static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Loads the configuration from `.env` and the process environment.
    ///
    /// Missing or malformed values fall back to development defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: var_or("APP_ENV", "development"),
            project_name: var_or("PROJECT_NAME", "gradebook"),
            log_level: var_or("LOG_LEVEL", "info"),
            log_file: var_or("LOG_FILE", "logs/gradebook.log"),
            log_to_stdout: var_or("LOG_TO_STDOUT", "false") == "true",
            database_path: var_or("DATABASE_PATH", "data/gradebook.db"),
            default_page_size: parsed_or("DEFAULT_PAGE_SIZE", 20),
            max_page_size: parsed_or("MAX_PAGE_SIZE", 100),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn global() -> RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Reloads the configuration from the environment, dropping overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            if let Ok(mut guard) = lock.write() {
                *guard = AppConfig::from_env();
            }
        }
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_default_page_size(value: u64) {
        AppConfig::set_field(|cfg| cfg.default_page_size = value);
    }

    pub fn set_max_page_size(value: u64) {
        AppConfig::set_field(|cfg| cfg.max_page_size = value);
    }
}

/// Convenience accessor used by the `db` crate when opening a connection.
pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

/// Whether `DATABASE_PATH` holds a full connection URL rather than a file.
pub fn is_dsn(path_or_url: &str) -> bool {
    ["sqlite:", "postgres://", "mysql://"]
        .iter()
        .any(|scheme| path_or_url.starts_with(scheme))
}

/// Connection URL for a `DATABASE_PATH` value.
///
/// A DSN is used as is. A plain SQLite file path gets its parent directory
/// created and is opened in read-write-create mode.
pub fn database_url(path_or_url: &str) -> io::Result<String> {
    if is_dsn(path_or_url) {
        return Ok(path_or_url.to_owned());
    }
    if let Some(parent) = Path::new(path_or_url).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(format!("sqlite://{path_or_url}?mode=rwc"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn setters_override_and_reset_restores_env() {
        unsafe {
            env::set_var("MAX_PAGE_SIZE", "250");
        }
        AppConfig::reset();
        assert_eq!(AppConfig::global().max_page_size, 250);

        AppConfig::set_max_page_size(10);
        assert_eq!(AppConfig::global().max_page_size, 10);

        AppConfig::reset();
        assert_eq!(AppConfig::global().max_page_size, 250);

        unsafe {
            env::remove_var("MAX_PAGE_SIZE");
        }
        AppConfig::reset();
    }

    #[test]
    #[serial]
    fn malformed_numbers_fall_back_to_defaults() {
        unsafe {
            env::set_var("DEFAULT_PAGE_SIZE", "twenty");
        }
        let cfg = AppConfig::from_env();
        assert_eq!(cfg.default_page_size, 20);
        unsafe {
            env::remove_var("DEFAULT_PAGE_SIZE");
        }
    }

    #[test]
    fn dsn_is_passed_through() {
        assert_eq!(database_url("sqlite::memory:").unwrap(), "sqlite::memory:");
        assert!(is_dsn("postgres://localhost/gradebook"));
        assert!(!is_dsn("data/gradebook.db"));
    }

    #[test]
    fn file_path_gets_its_directory() {
        let dir = env::temp_dir().join(format!("gradebook-url-{}", std::process::id()));
        let file = dir.join("nested").join("gradebook.db");
        let path = file.to_string_lossy().into_owned();

        let url = database_url(&path).unwrap();
        assert_eq!(url, format!("sqlite://{path}?mode=rwc"));
        assert!(file.parent().unwrap().is_dir());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unusable_directory_is_an_error() {
        let blocker = env::temp_dir().join(format!("gradebook-blocker-{}", std::process::id()));
        fs::write(&blocker, b"").unwrap();
        let path = blocker.join("gradebook.db").to_string_lossy().into_owned();

        assert!(database_url(&path).is_err());

        fs::remove_file(&blocker).unwrap();
    }
}
