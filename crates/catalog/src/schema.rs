//! Schema bootstrap for the catalog tables

use crate::models::{PenEntity, ProductColumn, ProductEntity};
use acts_as::{db, Result};
use sea_orm::sea_query::Index;
use sea_orm::ConnectionTrait;
use tracing::info;

/// Create `products`, `pens` and the owner lookup index if missing
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    db::create_table(db, ProductEntity).await?;
    db::create_table(db, PenEntity).await?;

    db::create_index(
        db,
        Index::create()
            .name("idx_products_actable")
            .table(ProductEntity)
            .col(ProductColumn::ActableType)
            .col(ProductColumn::ActableId)
            .to_owned(),
    )
    .await?;

    info!("Catalog schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use acts_as::config::DatabaseConfig;
    use acts_as::DbPool;

    #[tokio::test]
    async fn test_create_tables_is_idempotent() {
        let pool = DbPool::new(&DatabaseConfig::in_memory()).await.unwrap();
        create_tables(pool.write()).await.unwrap();
        create_tables(pool.write()).await.unwrap();
    }
}
