//! Product entity - Represents one inventory record owned by a user.
//!
//! Every product row belongs to exactly one user; `user_id` is assigned by
//! the write layer from the authenticated session and never changes after
//! creation, and `id`/`created_at` are likewise immutable once assigned.
//! `category` is stored as plain text; the closed label set is enforced at
//! the write boundary, not by the table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier, assigned by the database on insert
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the product (e.g., "Laptop Stand"); never empty
    pub name: String,
    /// Free-form description; may be empty
    pub description: String,
    /// Unit price in dollars; non-negative
    pub price: f64,
    /// Category label out of the closed set (e.g., "Electronics")
    pub category: String,
    /// Whether the product is currently in stock
    pub in_stock: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// Id of the owning user, taken from the session at creation time
    pub user_id: String,
}

/// Products have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
