//! Core business logic, independent of any UI or transport.

pub mod products;
pub mod query;

pub use products::{
    NewProduct, ProductPatch, create_product, delete_product, list_products, update_product,
};
pub use query::{Category, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, ProductQuery, SortKey};
