//! Integration tests for Pocket Shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pocket-shop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - browse, fill the cart, check out, read history
//! - `cross_context` - several sessions sharing one backend
//! - `file_persistence` - sessions surviving a restart on the file store

use std::sync::Arc;

use pocket_shop_storefront::Storefront;
use pocket_shop_storefront::config::ShopConfig;
use pocket_shop_storefront::store::{KeyValueStore, MemoryStore};

/// A shared backend that several sessions can open, like browser tabs on
/// one local storage.
pub struct TestContext {
    pub backend: Arc<dyn KeyValueStore>,
    pub config: ShopConfig,
}

impl TestContext {
    /// Fresh in-memory backend with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_backend(Arc::new(MemoryStore::new()))
    }

    /// Wrap an existing backend.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            config: ShopConfig::default(),
        }
    }

    /// Open a new session on the shared backend.
    #[must_use]
    pub fn session(&self) -> Storefront {
        Storefront::with_backend(self.config.clone(), Arc::clone(&self.backend))
    }

    /// Raw stored value under `key`, parsed as JSON.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<serde_json::Value> {
        self.backend
            .get(key)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
