//! Result cache for product listings.
//!
//! Listing the same window twice in a row is common (paging back, a view
//! re-rendering), so fetched pages are kept per user and normalized query.
//! Any successful mutation invalidates every cached page for that user,
//! which keeps totals and windows coherent without tracking which pages a
//! change touched. A page is stored together with the generation captured
//! before its database read; an invalidation landing in between bumps the
//! generation and the late put is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::core::query::{Page, ProductQuery};
use crate::entities::ProductModel;

type CacheKey = (String, ProductQuery);

#[derive(Debug, Default)]
struct CacheState {
    pages: HashMap<CacheKey, Arc<Page<ProductModel>>>,
    /// Bumped on every invalidation. A put carries the generation its read
    /// started under and is dropped once the two disagree.
    generations: HashMap<String, u64>,
}

/// Cached listing pages, keyed by user id and normalized query.
#[derive(Debug, Default)]
pub struct ListCache {
    state: RwLock<CacheState>,
}

impl ListCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the cached page for this user and query.
    ///
    /// The query is normalized first, so requests differing only in clamped
    /// paging values or search-term whitespace share one entry.
    pub async fn get(
        &self,
        user_id: &str,
        query: &ProductQuery,
    ) -> Option<Arc<Page<ProductModel>>> {
        let key = (user_id.to_string(), query.normalized());
        let found = self.state.read().await.pages.get(&key).cloned();
        trace!(
            "List cache {} for user {}",
            if found.is_some() { "hit" } else { "miss" },
            user_id
        );
        found
    }

    /// Current invalidation generation for `user_id`.
    ///
    /// Capture this before reading the database and hand it back to
    /// [`ListCache::put`]; a mutation committing in between bumps the
    /// generation and the out-of-date page is not stored.
    pub async fn generation(&self, user_id: &str) -> u64 {
        let state = self.state.read().await;
        state.generations.get(user_id).copied().unwrap_or(0)
    }

    /// Stores a page for this user and query, returning the shared handle.
    ///
    /// The page is only cached while `generation` still matches the user's
    /// current one; either way the caller gets its page back.
    pub async fn put(
        &self,
        user_id: &str,
        query: &ProductQuery,
        page: Page<ProductModel>,
        generation: u64,
    ) -> Arc<Page<ProductModel>> {
        let page = Arc::new(page);
        let mut state = self.state.write().await;
        if state.generations.get(user_id).copied().unwrap_or(0) == generation {
            let key = (user_id.to_string(), query.normalized());
            state.pages.insert(key, Arc::clone(&page));
        } else {
            debug!("Dropping superseded listing for user {}", user_id);
        }
        page
    }

    /// Drops every cached page belonging to `user_id` and bumps their
    /// generation, fencing off in-flight reads.
    pub async fn invalidate_user(&self, user_id: &str) {
        let mut state = self.state.write().await;
        *state.generations.entry(user_id.to_string()).or_default() += 1;
        let before = state.pages.len();
        state.pages.retain(|(owner, _), _| owner != user_id);
        debug!(
            "Dropped {} cached listing(s) for user {}",
            before - state.pages.len(),
            user_id
        );
    }

    /// Drops every cached page, bumping the generation of every owner.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        let CacheState { pages, generations } = &mut *state;
        for (owner, _) in pages.keys() {
            *generations.entry(owner.clone()).or_default() += 1;
        }
        pages.clear();
    }

    /// Number of cached pages.
    pub async fn len(&self) -> usize {
        self.state.read().await.pages.len()
    }

    /// Whether nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.pages.is_empty()
    }
}
