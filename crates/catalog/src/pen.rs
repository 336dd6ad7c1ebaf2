//! Pen: a facade acting as a product
//!
//! A pen stores only its color. Name and price live on the product row that
//! points back at the pen through `(actable_type, actable_id)`, and are
//! reached through `ProductAttributes`, `Dispatch` fallback and the forwarded
//! lifecycle in `ActsAs`.

use crate::models::{ActableType, PenActiveModel, PenColumn, PenEntity, PenModel, ProductActiveModel};
use crate::product::Product;
use acts_as::validation;
use acts_as::{
    AppError, Attributes, Dispatch, Errors, HasRecord, Model, Persist, Result, Tracked,
};
use async_trait::async_trait;
use sea_orm::{ConnectionTrait, EntityTrait};
use tracing::debug;
use validator::Validate;

acts_as::attribute_methods! {
    pub trait PenAttributes for PenActiveModel {
        PenColumn::Color => color: String {
            set: set_color,
            present: is_color_present,
            change: color_change,
            changed: is_color_changed,
            was: color_was,
            will_change: color_will_change,
        },
    }
}

#[derive(Debug, Validate)]
struct PenValidation<'a> {
    #[validate(required(message = "can't be blank"))]
    color: Option<&'a str>,
}

/// A pen with its product built alongside
#[derive(Debug, Clone, Default)]
pub struct Pen {
    record: Tracked<PenActiveModel>,
    product: Product,
    errors: Errors,
}

acts_as::acts_as! {
    Pen: "pen" => Product {
        field: product,
        owner: ActableType::Pen,
        record: ProductActiveModel,
    }
}

impl Pen {
    pub fn new() -> Self {
        Self::default()
    }

    /// A persisted pen whose product is not loaded yet
    pub(crate) fn from_model(model: PenModel) -> Self {
        Self {
            record: Tracked::from_model(model),
            product: Product::new(),
            errors: Errors::new(),
        }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }
}

impl HasRecord<PenActiveModel> for Pen {
    fn record(&self) -> &Tracked<PenActiveModel> {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Tracked<PenActiveModel> {
        &mut self.record
    }
}

#[async_trait]
impl Persist for Pen {
    fn id(&self) -> Option<i32> {
        self.record.read::<i32>(PenColumn::Id)
    }

    fn is_new_record(&self) -> bool {
        self.record.is_new_record()
    }

    fn is_destroyed(&self) -> bool {
        self.record.is_destroyed()
    }

    fn validate(&self) -> Errors {
        let color = self.color().filter(|c| !c.trim().is_empty());
        let snapshot = PenValidation {
            color: color.as_deref(),
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
            debug!(model = Self::MODEL_NAME, id = ?self.id(), "Pen written");
        }
        Ok(())
    }

    async fn remove_record<C>(&mut self, db: &C) -> Result<()>
    where
        C: ConnectionTrait,
    {
        if let Some(id) = self.id().filter(|_| self.record.is_persisted()) {
            PenEntity::delete_by_id(id).exec(db).await?;
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
        let model = PenEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(AppError::RecordNotFound {
                model: Self::MODEL_NAME,
                id,
            })?;
        self.record = Tracked::from_model(model);
        self.errors.clear();
        Ok(())
    }

    async fn find_record<C>(db: &C, id: i32) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        PenEntity::find_by_id(id)
            .one(db)
            .await?
            .map(Self::from_model)
            .ok_or(AppError::RecordNotFound {
                model: Self::MODEL_NAME,
                id,
            })
    }
}

impl Dispatch for Pen {
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
        &["id", "created_at", "updated_at"]
    }

    fn fallback(&self) -> Option<&dyn Dispatch> {
        Some(&self.product)
    }

    fn fallback_mut(&mut self) -> Option<&mut dyn Dispatch> {
        Some(&mut self.product)
    }
}
