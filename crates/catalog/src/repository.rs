//! Repository for catalog data access
//!
//! Pens are always handed out with their product loaded.

use crate::models::{PenColumn, PenEntity, ProductEntity};
use crate::pen::Pen;
use crate::product::Product;
use acts_as::{ActsAs, DbPool, Persist, Result};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder};
use serde_json::{Map, Value as Json};
use tracing::info;

#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Pen Operations
    // ========================================================================

    /// Create a pen from mixed pen/product attributes
    pub async fn create_pen(&self, attributes: Map<String, Json>) -> Result<Pen> {
        let pen = Pen::create(self.write_conn(), attributes).await?;
        info!(id = ?pen.id(), "Pen created");
        Ok(pen)
    }

    pub async fn find_pen(&self, id: i32) -> Result<Pen> {
        Pen::find(self.read_conn(), id).await
    }

    /// All pens in id order
    pub async fn list_pens(&self) -> Result<Vec<Pen>> {
        let models = PenEntity::find()
            .order_by_asc(PenColumn::Id)
            .all(self.read_conn())
            .await?;

        let mut pens = Vec::with_capacity(models.len());
        for model in models {
            let mut pen = Pen::from_model(model);
            pen.load_acting_as(self.read_conn()).await?;
            pens.push(pen);
        }
        Ok(pens)
    }

    pub async fn destroy_pen(&self, id: i32) -> Result<()> {
        let mut pen = Pen::find(self.write_conn(), id).await?;
        pen.destroy(self.write_conn()).await
    }

    // ========================================================================
    // Product Operations
    // ========================================================================

    pub async fn find_product(&self, id: i32) -> Result<Product> {
        Product::find(self.read_conn(), id).await
    }

    pub async fn count_products(&self) -> Result<u64> {
        ProductEntity::find()
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Presenter;
    use crate::schema;
    use acts_as::config::DatabaseConfig;
    use serde_json::json;

    async fn repository() -> Repository {
        let pool = DbPool::new(&DatabaseConfig::in_memory()).await.unwrap();
        schema::create_tables(pool.write()).await.unwrap();
        Repository::new(pool)
    }

    fn attributes(name: &str, price: f64, color: &str) -> Map<String, Json> {
        json!({ "name": name, "price": price, "color": color })
            .as_object()
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_pens_loads_products() {
        let repo = repository().await;
        repo.ping().await.unwrap();

        repo.create_pen(attributes("pen", 0.8, "red")).await.unwrap();
        repo.create_pen(attributes("marker", 2.5, "black")).await.unwrap();

        let pens = repo.list_pens().await.unwrap();
        let presented: Vec<String> = pens.iter().map(|p| p.present()).collect();
        assert_eq!(presented, vec!["pen - $0.8", "marker - $2.5"]);
        assert_eq!(repo.count_products().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_destroy_pen_cascades() {
        let repo = repository().await;
        let pen = repo.create_pen(attributes("pen", 0.8, "red")).await.unwrap();
        let product_id = pen.product().id().unwrap();

        repo.destroy_pen(pen.id().unwrap()).await.unwrap();

        assert!(repo.find_product(product_id).await.unwrap_err().is_not_found());
        assert!(repo.find_pen(pen.id().unwrap()).await.unwrap_err().is_not_found());
        assert_eq!(repo.count_products().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_pen_rejects_invalid_attributes() {
        let repo = repository().await;
        let mut missing_price = Map::new();
        missing_price.insert("name".to_string(), json!("pen"));
        missing_price.insert("color".to_string(), json!("red"));

        let err = repo.create_pen(missing_price).await.unwrap_err();
        assert!(err.to_string().contains("Price can't be blank"));
        assert_eq!(repo.count_products().await.unwrap(), 0);
    }
}
