//! Product business logic - per-user CRUD and the list query builder.
//!
//! Every operation is scoped to an owner. Reads filter on the owner column
//! and mutations re-assert ownership, so a row can never be read or touched
//! through another user's call. Filtering, ordering, and paging all happen
//! in SQL; no rows are post-processed in memory.

use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{Condition, Order, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::core::query::{Category, Page, ProductQuery, SortKey};
use crate::entities::{Product, ProductColumn, ProductModel, product};
use crate::errors::{Error, Result};

/// Field set for creating a product.
///
/// The row id, creation timestamp, and owner are assigned by the layer,
/// never by the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Display name; must not be blank
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Unit price; must be finite and non-negative
    pub price: f64,
    /// Category label
    pub category: Category,
    /// Whether the product is currently in stock
    pub in_stock: bool,
}

/// Optional field set for updating a product; `None` leaves the column
/// untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
    /// Replacement name; must not be blank when given
    pub name: Option<String>,
    /// Replacement description
    pub description: Option<String>,
    /// Replacement price; must be finite and non-negative when given
    pub price: Option<f64>,
    /// Replacement category
    pub category: Option<Category>,
    /// Replacement stock flag
    pub in_stock: Option<bool>,
}

impl ProductPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.in_stock.is_none()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "product name must not be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidPrice { price });
    }
    Ok(())
}

/// Builds the WHERE clause for a listing: owner scope first, then each
/// filter the query actually sets.
fn filter_condition(user_id: &str, query: &ProductQuery) -> Condition {
    let mut condition = Condition::all().add(ProductColumn::UserId.eq(user_id));

    if let Some(term) = query.search_term() {
        // LOWER(name) LIKE '%term%' OR LOWER(description) LIKE '%term%'
        let pattern = format!("%{}%", term.to_lowercase());
        condition = condition.add(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(ProductColumn::Name))).like(pattern.as_str()))
                .add(
                    Expr::expr(Func::lower(Expr::col(ProductColumn::Description)))
                        .like(pattern.as_str()),
                ),
        );
    }

    if let Some(category) = query.category {
        condition = condition.add(ProductColumn::Category.eq(category.as_str()));
    }

    if let Some(in_stock) = query.in_stock {
        condition = condition.add(ProductColumn::InStock.eq(in_stock));
    }

    condition
}

fn order_column(key: SortKey) -> ProductColumn {
    match key {
        SortKey::CreatedAt => ProductColumn::CreatedAt,
        SortKey::Price => ProductColumn::Price,
        SortKey::Name => ProductColumn::Name,
    }
}

// Largest window start a signed SQL OFFSET can express (`i64::MAX`).
const MAX_WINDOW_START: u64 = u64::MAX >> 1;

/// Returns one page of the user's products plus the filter-wide total.
///
/// The window is computed from the query's effective (clamped) page values.
/// A page past the end of the results comes back with empty `items` but the
/// real `total`, which is not an error.
///
/// # Errors
/// Returns an error if the database query fails.
#[instrument(skip(db, query))]
pub async fn list_products(
    db: &DatabaseConnection,
    user_id: &str,
    query: &ProductQuery,
) -> Result<Page<ProductModel>> {
    let page = query.effective_page();
    let page_size = query.effective_page_size();
    let direction = if query.order_asc {
        Order::Asc
    } else {
        Order::Desc
    };

    debug!("Listing products (page {}, size {})", page, page_size);

    let paginator = Product::find()
        .filter(filter_condition(user_id, query))
        .order_by(order_column(query.order_by), direction)
        .paginate(db, page_size);

    let total = paginator.num_items().await?;
    // Cap the fetch index so the paginator's offset multiply stays inside
    // the signed range; a capped index is still far past the last row.
    let page_index = (page - 1).min(MAX_WINDOW_START / page_size);
    let items = paginator.fetch_page(page_index).await?;

    Ok(Page {
        items,
        total,
        page,
        page_size,
    })
}

/// Inserts a new product owned by `user_id` and returns the stored row.
///
/// # Errors
/// Returns a validation error for a blank name or a non-finite or negative
/// price, or a database error if the insert fails.
#[instrument(skip(db, new))]
pub async fn create_product(
    db: &DatabaseConnection,
    user_id: &str,
    new: NewProduct,
) -> Result<ProductModel> {
    validate_name(&new.name)?;
    validate_price(new.price)?;

    let product = product::ActiveModel {
        name: Set(new.name),
        description: Set(new.description),
        price: Set(new.price),
        category: Set(new.category.as_str().to_string()),
        in_stock: Set(new.in_stock),
        created_at: Set(Utc::now()),
        user_id: Set(user_id.to_string()),
        ..Default::default()
    };

    let model = product.insert(db).await?;
    info!("Created product '{}' with id {}", model.name, model.id);
    Ok(model)
}

/// Applies a partial update to one of the user's products and returns the
/// updated row.
///
/// The row must exist and belong to `user_id`; a missing row and a row
/// owned by someone else both come back as [`Error::ProductNotFound`]. An
/// empty patch is a no-op that returns the row unchanged.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] when no owned row matches, a
/// validation error for bad patch values, or a database error if the
/// update fails.
#[instrument(skip(db, patch))]
pub async fn update_product(
    db: &DatabaseConnection,
    user_id: &str,
    id: i64,
    patch: ProductPatch,
) -> Result<ProductModel> {
    if let Some(name) = &patch.name {
        validate_name(name)?;
    }
    if let Some(price) = patch.price {
        validate_price(price)?;
    }

    let existing = Product::find()
        .filter(ProductColumn::Id.eq(id))
        .filter(ProductColumn::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id })?;

    if patch.is_empty() {
        return Ok(existing);
    }

    let mut active: product::ActiveModel = existing.into();
    if let Some(name) = patch.name {
        active.name = Set(name);
    }
    if let Some(description) = patch.description {
        active.description = Set(description);
    }
    if let Some(price) = patch.price {
        active.price = Set(price);
    }
    if let Some(category) = patch.category {
        active.category = Set(category.as_str().to_string());
    }
    if let Some(in_stock) = patch.in_stock {
        active.in_stock = Set(in_stock);
    }

    let model = active.update(db).await?;
    info!("Updated product {}", id);
    Ok(model)
}

/// Deletes one of the user's products.
///
/// Missing rows and rows owned by someone else both come back as
/// [`Error::ProductNotFound`].
///
/// # Errors
/// Returns [`Error::ProductNotFound`] when no owned row matches, or a
/// database error if the delete fails.
#[instrument(skip(db))]
pub async fn delete_product(db: &DatabaseConnection, user_id: &str, id: i64) -> Result<()> {
    let result = Product::delete_many()
        .filter(ProductColumn::Id.eq(id))
        .filter(ProductColumn::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ProductNotFound { id });
    }

    info!("Deleted product {}", id);
    Ok(())
}
