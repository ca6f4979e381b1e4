//! Product catalog loading: bundled data or an override file.

use std::fs;
use std::path::PathBuf;

use tortabot_core::Result;
use tortabot_core::catalog::Catalog;

/// Source of the product catalog.
///
/// Without an override path the catalog compiled into the binary is used.
#[derive(Debug, Clone, Default)]
pub struct CatalogStorage {
    override_path: Option<PathBuf>,
}

impl CatalogStorage {
    pub fn bundled() -> Self {
        Self::default()
    }

    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self {
            override_path: Some(path.into()),
        }
    }

    /// Reads and parses the catalog. Unavailable products are dropped.
    pub fn load(&self) -> Result<Catalog> {
        let Some(path) = &self.override_path else {
            return Catalog::bundled();
        };
        let content = fs::read_to_string(path)?;
        let catalog = Catalog::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            products = catalog.len(),
            "Loaded catalog override"
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bundled_catalog() {
        let catalog = CatalogStorage::bundled().load().unwrap();
        assert_eq!(catalog.len(), 18);
    }

    #[test]
    fn test_override_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"[
                {"id":"x1","slug":"torta-lucuma","name":"Torta Lúcuma","description":"Bizcocho con crema de lúcuma.","category":"Temporada","price":21000,"servings":12},
                {"id":"x2","slug":"torta-vieja","name":"Torta Vieja","description":"Descontinuada.","category":"Bizcocho","price":1,"available":false}
            ]"#,
        )
        .unwrap();

        let catalog = CatalogStorage::with_override(&path).load().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.match_text("lucuma").unwrap().id, "x1");
    }

    #[test]
    fn test_missing_override_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = CatalogStorage::with_override(temp_dir.path().join("nope.json"))
            .load()
            .unwrap_err();
        assert!(matches!(err, tortabot_core::BotError::Io { .. }));
    }
}
