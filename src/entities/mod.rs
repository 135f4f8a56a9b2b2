//! `SeaORM` entity definitions, one module per database table.

pub mod product;

// Re-exported under prefixed names so call sites read unambiguously
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
