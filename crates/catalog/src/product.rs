//! Product: the supermodel pens act as

use crate::models::{ActableType, ProductActiveModel, ProductColumn, ProductEntity, ProductModel};
use acts_as::validation;
use acts_as::{
    ActableRef, Actable, AppError, Attributes, Dispatch, Errors, HasRecord, Model, Persist,
    Result, Tracked,
};
use async_trait::async_trait;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde_json::Value as Json;
use tracing::debug;
use validator::Validate;

acts_as::attribute_methods! {
    /// Typed attribute methods of a product, shared by every facade acting as one
    pub trait ProductAttributes for ProductActiveModel {
        ProductColumn::Name => name: String {
            set: set_name,
            present: is_name_present,
            change: name_change,
            changed: is_name_changed,
            was: name_was,
            will_change: name_will_change,
        },
        ProductColumn::Price => price: f64 {
            set: set_price,
            present: is_price_present,
            change: price_change,
            changed: is_price_changed,
            was: price_was,
            will_change: price_will_change,
        },
    }
}

/// Derived product methods
pub trait Presenter: ProductAttributes {
    /// `pen - $0.8`
    fn present(&self) -> String {
        format!(
            "{} - ${}",
            self.name().unwrap_or_default(),
            self.price().map(format_price).unwrap_or_default()
        )
    }
}

impl<T: ProductAttributes + ?Sized> Presenter for T {}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{:.1}", price)
    } else {
        price.to_string()
    }
}

const READONLY: &[&str] = &["id", "actable_type", "actable_id", "created_at", "updated_at"];

#[derive(Debug, Validate)]
struct ProductValidation<'a> {
    #[validate(required(message = "can't be blank"))]
    name: Option<&'a str>,
    #[validate(required(message = "can't be blank"))]
    price: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct Product {
    record: Tracked<ProductActiveModel>,
    errors: Errors,
}

impl Product {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_model(model: ProductModel) -> Self {
        Self {
            record: Tracked::from_model(model),
            errors: Errors::new(),
        }
    }

    pub async fn find<C>(db: &C, id: i32) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        Self::find_record(db, id).await
    }

    /// Run validations and keep the outcome in `errors()`
    pub fn is_valid(&mut self) -> bool {
        self.errors = self.validate();
        self.errors.is_empty()
    }

    pub fn actable_type(&self) -> Option<ActableType> {
        self.record.read::<ActableType>(ProductColumn::ActableType)
    }

    pub fn actable_id(&self) -> Option<i32> {
        self.record.read::<i32>(ProductColumn::ActableId)
    }
}

impl Model for Product {
    const MODEL_NAME: &'static str = "product";
}

impl HasRecord<ProductActiveModel> for Product {
    fn record(&self) -> &Tracked<ProductActiveModel> {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Tracked<ProductActiveModel> {
        &mut self.record
    }
}

#[async_trait]
impl Persist for Product {
    fn id(&self) -> Option<i32> {
        self.record.read::<i32>(ProductColumn::Id)
    }

    fn is_new_record(&self) -> bool {
        self.record.is_new_record()
    }

    fn is_destroyed(&self) -> bool {
        self.record.is_destroyed()
    }

    fn validate(&self) -> Errors {
        let name = self.name().filter(|n| !n.trim().is_empty());
        let snapshot = ProductValidation {
            name: name.as_deref(),
            price: self.price(),
        };
        validation::collect(snapshot.validate())
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    async fn persist_record<C>(&mut self, db: &C) -> Result<()>
    where
        C: ConnectionTrait,
    {
        if self.record.save(db).await? {
            debug!(model = Self::MODEL_NAME, id = ?self.id(), "Product written");
        }
        Ok(())
    }

    async fn remove_record<C>(&mut self, db: &C) -> Result<()>
    where
        C: ConnectionTrait,
    {
        if let Some(id) = self.id().filter(|_| self.record.is_persisted()) {
            ProductEntity::delete_by_id(id).exec(db).await?;
        }
        self.record.mark_destroyed();
        Ok(())
    }

    async fn reload_record<C>(&mut self, db: &C) -> Result<()>
    where
        C: ConnectionTrait,
    {
        let id = self.id().ok_or(AppError::RecordNotPersisted {
            model: Self::MODEL_NAME,
        })?;
        *self = Self::find_record(db, id).await?;
        Ok(())
    }

    async fn find_record<C>(db: &C, id: i32) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        ProductEntity::find_by_id(id)
            .one(db)
            .await?
            .map(Self::from_model)
            .ok_or(AppError::RecordNotFound {
                model: Self::MODEL_NAME,
                id,
            })
    }
}

#[async_trait]
impl Actable for Product {
    type Owner = ActableType;

    fn actable(&self) -> Option<ActableRef<ActableType>> {
        Some(ActableRef::new(self.actable_type()?, self.actable_id()?))
    }

    fn set_actable(&mut self, owner: ActableRef<ActableType>) {
        self.record.write(ProductColumn::ActableType, Some(owner.kind));
        self.record.write(ProductColumn::ActableId, Some(owner.id));
    }

    async fn find_by_actable<C>(db: &C, owner: ActableRef<ActableType>) -> Result<Option<Self>>
    where
        C: ConnectionTrait,
    {
        let found = ProductEntity::find()
            .filter(ProductColumn::ActableType.eq(owner.kind))
            .filter(ProductColumn::ActableId.eq(owner.id))
            .one(db)
            .await?;
        Ok(found.map(Self::from_model))
    }
}

impl Dispatch for Product {
    fn dispatch_name(&self) -> &'static str {
        Self::MODEL_NAME
    }

    fn attributes(&self) -> &dyn Attributes {
        &self.record
    }

    fn attributes_mut(&mut self) -> &mut dyn Attributes {
        &mut self.record
    }

    fn readonly_attributes(&self) -> &'static [&'static str] {
        READONLY
    }

    fn methods(&self) -> &'static [&'static str] {
        &["present"]
    }

    fn call_method(&mut self, method: &str, argument: Option<Json>) -> Option<Result<Json>> {
        match (method, argument) {
            ("present", None) => Some(Ok(Json::String(self.present()))),
            ("present", Some(_)) => Some(Err(AppError::InvalidArgument {
                method: method.to_owned(),
                message: "takes no argument".to_owned(),
            })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use acts_as::config::DatabaseConfig;
    use acts_as::DbPool;
    use serde_json::json;

    async fn database() -> DbPool {
        let pool = DbPool::new(&DatabaseConfig::in_memory()).await.unwrap();
        schema::create_tables(pool.write()).await.unwrap();
        pool
    }

    #[test]
    fn test_present_formats_name_and_price() {
        let mut product = Product::new();
        product.set_name("pen".to_string());
        product.set_price(0.8);
        assert_eq!(product.present(), "pen - $0.8");

        product.set_price(2.0);
        assert_eq!(product.present(), "pen - $2.0");

        product.set_price(None::<f64>);
        assert_eq!(product.present(), "pen - $");
    }

    #[test]
    fn test_blank_name_is_invalid() {
        let mut product = Product::new();
        product.set_name("   ".to_string());
        product.set_price(1.5);
        assert!(!product.is_valid());
        assert_eq!(product.errors().keys().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_dispatch_on_product() {
        let mut product = Product::new();
        product.send("name=", Some(json!("ink"))).unwrap();
        assert_eq!(product.send("name", None).unwrap(), json!("ink"));
        assert_eq!(product.send("name?", None).unwrap(), json!(true));
        assert_eq!(product.send("price?", None).unwrap(), json!(false));

        let err = product.send("actable_id=", Some(json!(3))).unwrap_err();
        assert!(matches!(err, AppError::ReadonlyAttribute { .. }));

        let err = product.send("color", None).unwrap_err();
        assert!(matches!(err, AppError::MethodNotFound { model: "product", .. }));
    }

    #[tokio::test]
    async fn test_actable_lookup() {
        let pool = database().await;
        let db = pool.write();

        let mut product = Product::new();
        product.set_name("ink".to_string());
        product.set_price(3.25);
        product.set_actable(ActableRef::new(ActableType::Pen, 7));
        product.persist_record(db).await.unwrap();
        assert!(!product.is_new_record());

        let found = Product::find_by_actable(db, ActableRef::new(ActableType::Pen, 7))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id(), product.id());
        assert_eq!(found.actable(), Some(ActableRef::new(ActableType::Pen, 7)));
        assert_eq!(found.price(), Some(3.25));

        let missing = Product::find_by_actable(db, ActableRef::new(ActableType::Pen, 8))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_remove_then_find_is_not_found() {
        let pool = database().await;
        let db = pool.write();

        let mut product = Product::new();
        product.set_name("ink".to_string());
        product.set_price(3.25);
        product.persist_record(db).await.unwrap();
        let id = product.id().unwrap();

        product.remove_record(db).await.unwrap();
        assert!(product.is_destroyed());

        let err = Product::find(db, id).await.unwrap_err();
        assert!(matches!(err, AppError::RecordNotFound { model: "product", .. }));
    }
}
