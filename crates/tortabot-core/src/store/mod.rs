//! Store branches and nearest-branch resolution.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

const BUNDLED_STORES: &str = include_str!("../../data/stores.json");

/// A pickup branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub name: String,
    pub address: String,
}

/// The fixed, non-empty list of branches.
#[derive(Debug, Clone)]
pub struct StoreDirectory {
    stores: Vec<Store>,
}

impl StoreDirectory {
    /// Builds a directory. At least one store is required so that the
    /// locator always has a fallback.
    pub fn new(stores: Vec<Store>) -> Result<Self> {
        if stores.is_empty() {
            return Err(BotError::config("store directory must not be empty"));
        }
        Ok(Self { stores })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    /// The branches compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_STORES)
    }

    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    /// The deterministic fallback branch.
    pub fn first(&self) -> &Store {
        &self.stores[0]
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Store> {
        self.stores.iter().find(|s| s.id == id)
    }

    /// The first store whose id appears as a whole token in free text, so
    /// that `s10` never resolves to `s1`.
    pub fn find_in_text(&self, text: &str) -> Option<&Store> {
        text.split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
            .filter(|token| !token.is_empty())
            .find_map(|token| self.find_by_id(token))
    }
}

/// External reasoning service that picks the branch closest to an address.
#[async_trait]
pub trait StoreLocatorOracle: Send + Sync {
    /// Asks for the id of the store closest to `address`.
    ///
    /// # Arguments
    ///
    /// * `address` - Free-text address or sector given by the customer
    /// * `stores` - Candidate branches (id and address are what matter)
    ///
    /// # Returns
    ///
    /// The raw oracle answer. It is expected to contain a store id but may
    /// contain anything; callers must validate it.
    async fn closest_store_id(&self, address: &str, stores: &[Store]) -> Result<String>;
}

/// Resolves addresses to branches. Never fails.
#[derive(Clone)]
pub struct StoreLocator {
    directory: Arc<StoreDirectory>,
    oracle: Option<Arc<dyn StoreLocatorOracle>>,
}

impl StoreLocator {
    pub fn new(directory: Arc<StoreDirectory>, oracle: Option<Arc<dyn StoreLocatorOracle>>) -> Self {
        Self { directory, oracle }
    }

    pub fn directory(&self) -> &StoreDirectory {
        &self.directory
    }

    /// Returns the branch nearest to `address`.
    ///
    /// Falls back to the first branch when the address is blank, no oracle is
    /// configured, the oracle fails, or its answer names no known store.
    pub async fn nearest_store(&self, address: &str) -> Store {
        let fallback = self.directory.first().clone();
        let address = address.trim();
        if address.is_empty() {
            return fallback;
        }
        let Some(oracle) = &self.oracle else {
            return fallback;
        };

        match oracle.closest_store_id(address, self.directory.stores()).await {
            Ok(answer) => match self.directory.find_in_text(&answer) {
                Some(store) => {
                    tracing::debug!(address, store_id = %store.id, "Store resolved by locator");
                    store.clone()
                }
                None => {
                    tracing::warn!(address, answer = %answer, "Locator answered an unknown store id");
                    fallback
                }
            },
            Err(e) => {
                tracing::warn!(address, error = %e, "Store locator failed, using first store");
                fallback
            }
        }
    }
}
