//! `SQLite` connection and table creation using `SeaORM`.
//!
//! Table creation uses `SeaORM`'s `Schema::create_table_from_entity` so the
//! database schema always matches the entity definitions without any manual
//! SQL. Creation is idempotent and safe to run on every startup.

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::info;

use crate::config::settings::DatabaseSettings;
use crate::entities::Product;
use crate::errors::Result;

/// Connects to the database described by the settings.
pub async fn create_connection(settings: &DatabaseSettings) -> Result<DatabaseConnection> {
    info!("Connecting to database at {}", settings.url);
    Database::connect(&settings.url).await.map_err(Into::into)
}

/// Creates the `products` table from its entity definition if it does not
/// already exist.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut product_table = schema.create_table_from_entity(Product);
    product_table.if_not_exists();
    db.execute(builder.build(&product_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{EntityTrait, QuerySelect};

    use super::*;
    use crate::entities::ProductModel;

    #[tokio::test]
    async fn test_connect_and_query() -> Result<()> {
        let settings = DatabaseSettings {
            url: "sqlite::memory:".to_string(),
        };
        let db = create_connection(&settings).await?;
        create_tables(&db).await?;

        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;
        Ok(())
    }
}
