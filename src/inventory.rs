//! Application-facing inventory layer.
//!
//! [`Inventory`] owns the database connection and session tracker and keeps
//! a per-user cache of list results. Reads resolve the acting user from the
//! current session; mutations require one and invalidate that user's cached
//! pages on success. Signed-out reads return an empty page instead of an
//! error so a caller can render an empty state without special-casing auth.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio::sync::watch;
use tracing::debug;

use crate::cache::ListCache;
use crate::core::{self, NewProduct, Page, ProductPatch, ProductQuery};
use crate::entities::ProductModel;
use crate::errors::{Error, Result};
use crate::session::{Session, SessionTracker};

/// One user-facing inventory over a database and an auth session.
pub struct Inventory {
    db: DatabaseConnection,
    sessions: SessionTracker,
    cache: ListCache,
}

impl Inventory {
    /// Builds the layer over an already-connected database and a running
    /// session tracker.
    #[must_use]
    pub fn new(db: DatabaseConnection, sessions: SessionTracker) -> Self {
        Self {
            db,
            sessions,
            cache: ListCache::new(),
        }
    }

    fn require_user(&self) -> Result<String> {
        self.sessions.user_id().ok_or_else(|| Error::Auth {
            message: "not signed in".to_string(),
        })
    }

    /// Lists the signed-in user's products for this query.
    ///
    /// Cached pages are shared; a repeat of the same query between mutations
    /// returns the same handle without touching the database. While signed
    /// out this yields an empty page, not an error.
    pub async fn list(&self, query: &ProductQuery) -> Result<Arc<Page<ProductModel>>> {
        let Some(user_id) = self.sessions.user_id() else {
            debug!("List requested while signed out");
            return Ok(Arc::new(Page::empty(query)));
        };

        if let Some(page) = self.cache.get(&user_id, query).await {
            return Ok(page);
        }

        // Capture the generation before the read; a mutation committing in
        // between bumps it and the put below is dropped.
        let generation = self.cache.generation(&user_id).await;
        let page = core::list_products(&self.db, &user_id, query).await?;
        Ok(self.cache.put(&user_id, query, page, generation).await)
    }

    /// Creates a product owned by the signed-in user.
    pub async fn create(&self, new: NewProduct) -> Result<ProductModel> {
        let user_id = self.require_user()?;
        let product = core::create_product(&self.db, &user_id, new).await?;
        self.cache.invalidate_user(&user_id).await;
        Ok(product)
    }

    /// Applies a partial update to one of the signed-in user's products.
    pub async fn update(&self, id: i64, patch: ProductPatch) -> Result<ProductModel> {
        let user_id = self.require_user()?;
        let product = core::update_product(&self.db, &user_id, id, patch).await?;
        self.cache.invalidate_user(&user_id).await;
        Ok(product)
    }

    /// Deletes one of the signed-in user's products.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let user_id = self.require_user()?;
        core::delete_product(&self.db, &user_id, id).await?;
        self.cache.invalidate_user(&user_id).await;
        Ok(())
    }

    /// Signs in and makes the session current.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.sessions.sign_in(email, password).await
    }

    /// Registers a new account and makes its session current.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        self.sessions.sign_up(email, password).await
    }

    /// Signs out and drops the departing user's cached listings.
    pub async fn sign_out(&self) -> Result<()> {
        let user_id = self.sessions.user_id();
        self.sessions.sign_out().await?;
        if let Some(user_id) = user_id {
            self.cache.invalidate_user(&user_id).await;
        }
        Ok(())
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.sessions.current()
    }

    /// Follows session changes.
    #[must_use]
    pub fn session_changes(&self) -> watch::Receiver<Option<Session>> {
        self.sessions.subscribe()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::test_utils::*;

    async fn inventory_with(auth: Arc<FakeAuth>) -> Result<Inventory> {
        let db = setup_test_db().await?;
        let sessions = SessionTracker::new(auth).await?;
        Ok(Inventory::new(db, sessions))
    }

    async fn signed_in_inventory(user_id: &str) -> Result<Inventory> {
        let auth = FakeAuth::new();
        auth.push(Some(test_session(user_id)));
        inventory_with(auth).await
    }

    #[tokio::test]
    async fn test_signed_out_behavior() -> Result<()> {
        let inventory = inventory_with(FakeAuth::new()).await?;

        let page = inventory.list(&ProductQuery::default()).await?;
        assert!(page.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.page, 1);

        let result = inventory.create(draft("Desk")).await;
        assert!(matches!(result.unwrap_err(), Error::Auth { .. }));
        let result = inventory.update(1, ProductPatch::default()).await;
        assert!(matches!(result.unwrap_err(), Error::Auth { .. }));
        let result = inventory.delete(1).await;
        assert!(matches!(result.unwrap_err(), Error::Auth { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_cache_hits_until_mutation() -> Result<()> {
        let inventory = signed_in_inventory("alice").await?;
        inventory.create(draft("Desk")).await?;

        let query = ProductQuery::default();
        let first = inventory.list(&query).await?;
        assert_eq!(first.total, 1);

        // Same handle back, no second fetch
        let second = inventory.list(&query).await?;
        assert!(Arc::ptr_eq(&first, &second));

        inventory.create(draft("Chair")).await?;
        let third = inventory.list(&query).await?;
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.total, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_cache() -> Result<()> {
        let inventory = signed_in_inventory("alice").await?;
        inventory.create(draft("Desk")).await?;

        let query = ProductQuery::default();
        let cached = inventory.list(&query).await?;

        let patch = ProductPatch {
            price: Some(1.0),
            ..ProductPatch::default()
        };
        let result = inventory.update(9999, patch).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { .. }));

        let after = inventory.list(&query).await?;
        assert!(Arc::ptr_eq(&cached, &after));
        Ok(())
    }

    #[tokio::test]
    async fn test_mutations_refresh_listing() -> Result<()> {
        let inventory = signed_in_inventory("alice").await?;
        let desk = inventory.create(draft("Desk")).await?;
        let query = ProductQuery::default();

        let patch = ProductPatch {
            name: Some("Walnut Desk".to_string()),
            ..ProductPatch::default()
        };
        inventory.update(desk.id, patch).await?;
        let page = inventory.list(&query).await?;
        assert_eq!(page.items[0].name, "Walnut Desk");

        inventory.delete(desk.id).await?;
        let page = inventory.list(&query).await?;
        assert_eq!(page.total, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_out_drops_cache() -> Result<()> {
        let auth = FakeAuth::new();
        auth.push(Some(test_session("alice")));
        let inventory = inventory_with(auth).await?;
        inventory.create(draft("Desk")).await?;
        inventory.list(&ProductQuery::default()).await?;
        assert_eq!(inventory.cache.len().await, 1);

        inventory.sign_out().await?;
        assert_eq!(inventory.session(), None);
        assert!(inventory.cache.is_empty().await);

        let page = inventory.list(&ProductQuery::default()).await?;
        assert!(page.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_user_switching() -> Result<()> {
        let inventory = inventory_with(FakeAuth::new()).await?;

        inventory.sign_in("alice@example.com", "correct horse").await?;
        inventory.create(draft("Desk")).await?;
        inventory.create(draft("Chair")).await?;
        assert_eq!(inventory.list(&ProductQuery::default()).await?.total, 2);

        inventory.sign_out().await?;
        inventory.sign_in("bob@example.com", "correct horse").await?;

        let page = inventory.list(&ProductQuery::default()).await?;
        assert_eq!(page.total, 0);

        inventory.create(draft("Lamp")).await?;
        let page = inventory.list(&ProductQuery::default()).await?;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].user_id, "bob");
        Ok(())
    }
}
