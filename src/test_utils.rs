//! Shared test utilities.
//!
//! Helpers for setting up in-memory test databases, building products with
//! sensible defaults, and faking the auth backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::core::{Category, NewProduct};
use crate::entities::{ProductModel, product};
use crate::errors::{Error, Result};
use crate::session::{AuthClient, Session};

/// Routes tracing output through the test harness so events show up under
/// `--nocapture`. Safe to call from every test; only the first call wins.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with the schema initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A draft product with sensible defaults; override fields with struct
/// update syntax where a test needs specific values.
///
/// # Defaults
/// * `description`: `"{name} description"`
/// * `price`: 9.99
/// * `category`: `Electronics`
/// * `in_stock`: true
#[must_use]
pub fn draft(name: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: format!("{name} description"),
        price: 9.99,
        category: Category::Electronics,
        in_stock: true,
    }
}

/// Inserts a product row directly with a deterministic creation time,
/// `age_minutes` before a fixed base instant. Use this when a test depends
/// on creation order; rows created through the normal path can share a
/// timestamp when inserted back to back.
pub async fn seed_product(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    price: f64,
    age_minutes: i64,
) -> Result<ProductModel> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

    product::ActiveModel {
        name: Set(name.to_string()),
        description: Set(format!("{name} description")),
        price: Set(price),
        category: Set(Category::Electronics.as_str().to_string()),
        in_stock: Set(true),
        created_at: Set(base - Duration::minutes(age_minutes)),
        user_id: Set(user_id.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// A session for `user_id` with a matching example email.
#[must_use]
pub fn test_session(user_id: &str) -> Session {
    Session {
        user_id: user_id.to_string(),
        email: format!("{user_id}@example.com"),
    }
}

/// In-memory auth backend for tests.
///
/// Accepts any email; the user id is the email's local part, so
/// `alice@example.com` signs in as `alice`. The password `"wrong"` fails
/// sign-in, and sign-up requires at least six characters. [`FakeAuth::push`]
/// injects backend-originated session changes.
pub struct FakeAuth {
    sessions: watch::Sender<Option<Session>>,
}

impl FakeAuth {
    /// A fresh backend with nobody signed in.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sessions: watch::channel(None).0,
        })
    }

    /// Pushes a session change as the backend would, e.g. a token refresh
    /// or a sign-out from another device.
    pub fn push(&self, session: Option<Session>) {
        self.sessions.send_replace(session);
    }

    fn session_for(email: &str) -> Session {
        Session {
            user_id: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
        }
    }
}

#[async_trait]
impl AuthClient for FakeAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        if password == "wrong" {
            return Err(Error::Auth {
                message: "invalid login credentials".to_string(),
            });
        }
        let session = Self::session_for(email);
        self.sessions.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        if password.len() < 6 {
            return Err(Error::Auth {
                message: "password must be at least 6 characters".to_string(),
            });
        }
        let session = Self::session_for(email);
        self.sessions.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        self.sessions.send_replace(None);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.sessions.borrow().clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sessions.subscribe()
    }
}
