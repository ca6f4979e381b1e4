//! File-backed loaders for settings, secrets and the product catalog.

mod catalog_storage;
mod secret_storage;
mod settings_storage;

pub use catalog_storage::CatalogStorage;
pub use secret_storage::{GeminiSecret, SecretConfig, SecretStorage, SecretStorageError};
pub use settings_storage::SettingsStorage;
