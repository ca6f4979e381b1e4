//! Secret configuration file storage.
//!
//! Loads API keys from `~/.config/tortabot/secret.json`, with environment
//! variables as a fallback.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::paths::TortabotPaths;

const API_KEY_ENV: &str = "GEMINI_API_KEY";
const MODEL_NAME_ENV: &str = "GEMINI_MODEL_NAME";

/// Contents of `secret.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiSecret>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiSecret {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Errors that can occur during secret storage operations.
#[derive(Debug)]
pub enum SecretStorageError {
    /// Configuration file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
    /// Config directory not found.
    ConfigDirNotFound,
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStorageError::NotFound(path) => {
                write!(f, "Secret file not found at: {}", path.display())
            }
            SecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            SecretStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            SecretStorageError::ConfigDirNotFound => {
                write!(f, "Could not determine config directory")
            }
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        SecretStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for SecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        SecretStorageError::ParseError(e)
    }
}

/// Read-only storage for `secret.json`.
///
/// The file is plaintext JSON and should be readable only by its owner.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a SecretStorage at the default path.
    ///
    /// # Returns
    ///
    /// - `Ok(SecretStorage)`: Successfully determined config path
    /// - `Err(SecretStorageError::ConfigDirNotFound)`: Could not find config directory
    pub fn new() -> Result<Self, SecretStorageError> {
        let path = TortabotPaths::secret_file().map_err(|_| SecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a SecretStorage with a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the secret configuration from the JSON file.
    ///
    /// # Returns
    ///
    /// - `Ok(SecretConfig)`: Successfully loaded and parsed
    /// - `Err(SecretStorageError::NotFound)`: File doesn't exist
    /// - `Err(SecretStorageError::IoError)`: Failed to read file
    /// - `Err(SecretStorageError::ParseError)`: Invalid JSON format
    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        if !self.path.exists() {
            return Err(SecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// Gemini credentials from the file, or from `GEMINI_API_KEY` /
    /// `GEMINI_MODEL_NAME` when the file is missing or has no key.
    ///
    /// A malformed file is still an error.
    pub fn gemini(&self) -> Result<Option<GeminiSecret>, SecretStorageError> {
        self.gemini_with_env(|name| std::env::var(name).ok())
    }

    fn gemini_with_env(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<GeminiSecret>, SecretStorageError> {
        let from_file = match self.load() {
            Ok(config) => config.gemini,
            Err(SecretStorageError::NotFound(path)) => {
                tracing::debug!(path = %path.display(), "No secret file, checking environment");
                None
            }
            Err(e) => return Err(e),
        };

        if let Some(secret) = from_file.filter(|s| !s.api_key.trim().is_empty()) {
            return Ok(Some(secret));
        }

        Ok(env(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .map(|api_key| GeminiSecret {
                api_key,
                model_name: env(MODEL_NAME_ENV).filter(|m| !m.trim().is_empty()),
            }))
    }

    /// Returns the path to the secret file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("secret.json");
        let storage = SecretStorage::with_path(file_path.clone());

        match storage.load() {
            Err(SecretStorageError::NotFound(path)) => assert_eq!(path, file_path),
            other => panic!("Expected NotFound error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_valid_json() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("secret.json");
        fs::write(
            &file_path,
            r#"{"gemini": {"api_key": "test-key-123", "model_name": "gemini-2.5-flash"}}"#,
        )
        .unwrap();

        let storage = SecretStorage::with_path(file_path);
        let gemini = storage.gemini_with_env(no_env).unwrap().unwrap();
        assert_eq!(gemini.api_key, "test-key-123");
        assert_eq!(gemini.model_name.as_deref(), Some("gemini-2.5-flash"));
    }

    #[test]
    fn test_missing_file_falls_back_to_env() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SecretStorage::with_path(temp_dir.path().join("secret.json"));

        let gemini = storage
            .gemini_with_env(|name| (name == API_KEY_ENV).then(|| "env-key".to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(gemini.api_key, "env-key");
        assert_eq!(gemini.model_name, None);

        assert!(storage.gemini_with_env(no_env).unwrap().is_none());
    }

    #[test]
    fn test_empty_config_has_no_gemini() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("secret.json");
        fs::write(&file_path, "{}").unwrap();

        let storage = SecretStorage::with_path(file_path);
        assert!(storage.load().unwrap().gemini.is_none());
        assert!(storage.gemini_with_env(no_env).unwrap().is_none());
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("secret.json");
        fs::write(&file_path, "{ invalid json").unwrap();

        let storage = SecretStorage::with_path(file_path);
        assert!(matches!(storage.load(), Err(SecretStorageError::ParseError(_))));
        assert!(storage.gemini_with_env(no_env).is_err());
    }
}
