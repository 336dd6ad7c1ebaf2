//! Facade → supermodel delegation
//!
//! A facade (`Pen`) owns exactly one supermodel record (`Product`). The
//! supermodel points back at its owner through a discriminated reference
//! `(actable_type, actable_id)`, is built together with the facade, saved in
//! the facade's transaction and destroyed with it.

use crate::attributes::Dispatch;
use crate::errors::{AppError, Result};
use crate::metrics::{self, TransactionTimer};
use crate::model::{Model, ModelRef, Persist};
use crate::validation::Errors;
use async_trait::async_trait;
use sea_orm::{ConnectionTrait, TransactionTrait};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::fmt::Debug;
use tracing::{debug, info, warn};

/// Polymorphic owner reference stored on the supermodel row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActableRef<K> {
    pub kind: K,
    pub id: i32,
}

impl<K> ActableRef<K> {
    pub fn new(kind: K, id: i32) -> Self {
        Self { kind, id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    HasOne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dependent {
    Destroy,
}

/// Reflection of the association a facade declares on its supermodel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Association {
    pub name: &'static str,
    pub kind: AssociationKind,
    /// Polymorphic interface name (`as:`)
    pub polymorphic_as: Option<&'static str>,
    pub dependent: Option<Dependent>,
    pub autosave: bool,
}

impl Association {
    /// The `has_one <name>, as: :actable, dependent: :destroy` association
    pub fn acts_as(name: &'static str) -> Self {
        Self {
            name,
            kind: AssociationKind::HasOne,
            polymorphic_as: Some("actable"),
            dependent: Some(Dependent::Destroy),
            autosave: true,
        }
    }
}

/// A supermodel: a model other models can act as
#[async_trait]
pub trait Actable: Persist {
    /// Closed set of owner types allowed in the discriminator column
    type Owner: Copy + PartialEq + Debug + Send + Sync + 'static;

    fn actable(&self) -> Option<ActableRef<Self::Owner>>;

    fn set_actable(&mut self, owner: ActableRef<Self::Owner>);

    async fn find_by_actable<C>(db: &C, owner: ActableRef<Self::Owner>) -> Result<Option<Self>>
    where
        C: ConnectionTrait;
}

/// A facade acting as `Self::Supermodel`.
///
/// Implemented through [`acts_as!`](crate::acts_as!).
#[async_trait]
pub trait ActsAs: Persist {
    type Supermodel: Actable;

    /// Discriminator value identifying this facade type
    const OWNER: <Self::Supermodel as Actable>::Owner;

    /// The live supermodel instance
    fn acting_as(&self) -> &Self::Supermodel;

    fn acting_as_mut(&mut self) -> &mut Self::Supermodel;

    /// Canonical name of the supermodel
    fn acting_as_name(&self) -> &'static str {
        <Self::Supermodel as Model>::MODEL_NAME
    }

    /// Type-level `acting_as?`
    fn acts_as_model(target: impl Into<ModelRef>) -> bool {
        target.into().matches::<Self::Supermodel>()
    }

    /// Instance-level `acting_as?`
    fn is_acting_as(&self, target: impl Into<ModelRef>) -> bool {
        Self::acts_as_model(target)
    }

    fn association() -> Association {
        Association::acts_as(<Self::Supermodel as Model>::MODEL_NAME)
    }

    /// Reference the supermodel stores to point back at this facade
    fn owner_ref(&self) -> Option<ActableRef<<Self::Supermodel as Actable>::Owner>> {
        self.id().map(|id| ActableRef::new(Self::OWNER, id))
    }

    /// Own errors plus the supermodel's, each under its own field key
    fn validate_all(&self) -> Errors {
        let mut errors = self.validate();
        errors.merge(self.acting_as().validate());
        errors
    }

    /// Run validations and keep the outcome in `errors()`
    fn is_valid(&mut self) -> bool {
        let errors = self.validate_all();
        let valid = errors.is_empty();
        *self.errors_mut() = errors;
        valid
    }

    /// Save facade and supermodel in one transaction.
    ///
    /// Returns `Ok(false)` when validation fails or either write is rolled
    /// back; the reason is left in `errors()`.
    async fn save<C>(&mut self, db: &C) -> Result<bool>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let saved = self.save_strict(db).await;
        match saved {
            Ok(()) => Ok(true),
            Err(AppError::RecordInvalid { .. }) => Ok(false),
            Err(err) => {
                self.errors_mut().add("base", err.to_string());
                Ok(false)
            }
        }
    }

    /// Like [`save`](ActsAs::save) but reports every failure as an error
    async fn save_strict<C>(&mut self, db: &C) -> Result<()>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        if self.is_destroyed() || self.acting_as().is_destroyed() {
            return Err(AppError::RecordDestroyed {
                model: Self::MODEL_NAME,
            });
        }

        if !self.is_valid() {
            metrics::record_validation_failure(Self::MODEL_NAME);
            debug!(model = Self::MODEL_NAME, errors = %self.errors(), "Validation failed");
            return Err(AppError::RecordInvalid {
                model: Self::MODEL_NAME,
                errors: self.errors().clone(),
            });
        }

        let _timer = TransactionTimer::start(Self::MODEL_NAME, "save");
        let snapshot = self.clone();
        let txn = db.begin().await?;

        let written = persist_with_supermodel(self, &txn).await;
        let outcome = match written {
            Ok(()) => txn.commit().await.map_err(AppError::from),
            Err(err) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(model = Self::MODEL_NAME, error = %rollback, "Rollback failed");
                }
                Err(err)
            }
        };

        match outcome {
            Ok(()) => {
                metrics::record_save(Self::MODEL_NAME);
                debug!(model = Self::MODEL_NAME, id = ?self.id(), "Saved with supermodel");
                Ok(())
            }
            Err(err) => {
                *self = snapshot;
                metrics::record_rollback(Self::MODEL_NAME);
                warn!(model = Self::MODEL_NAME, error = %err, "Save rolled back");
                Err(err)
            }
        }
    }

    /// Destroy facade and supermodel in one transaction
    async fn destroy<C>(&mut self, db: &C) -> Result<()>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let _timer = TransactionTimer::start(Self::MODEL_NAME, "destroy");
        let snapshot = self.clone();
        let txn = db.begin().await?;

        let written = remove_with_supermodel(self, &txn).await;
        let outcome = match written {
            Ok(()) => txn.commit().await.map_err(AppError::from),
            Err(err) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(model = Self::MODEL_NAME, error = %rollback, "Rollback failed");
                }
                Err(err)
            }
        };

        if let Err(err) = outcome {
            *self = snapshot;
            metrics::record_rollback(Self::MODEL_NAME);
            return Err(err);
        }

        metrics::record_destroy(Self::MODEL_NAME);
        info!(model = Self::MODEL_NAME, id = ?self.id(), "Destroyed with supermodel");
        Ok(())
    }

    /// Re-read the facade row and its supermodel
    async fn reload<C>(&mut self, db: &C) -> Result<()>
    where
        C: ConnectionTrait,
    {
        self.reload_record(db).await?;
        self.load_acting_as(db).await
    }

    /// Resolve the supermodel through the owner reference, building a fresh
    /// one when none is stored
    async fn load_acting_as<C>(&mut self, db: &C) -> Result<()>
    where
        C: ConnectionTrait,
    {
        let owner = self.owner_ref().ok_or(AppError::RecordNotPersisted {
            model: Self::MODEL_NAME,
        })?;
        let supermodel = match <Self::Supermodel as Actable>::find_by_actable(db, owner).await? {
            Some(found) => found,
            None => {
                debug!(model = Self::MODEL_NAME, ?owner, "No supermodel stored, building one");
                <Self::Supermodel as Default>::default()
            }
        };
        *self.acting_as_mut() = supermodel;
        Ok(())
    }

    async fn find<C>(db: &C, id: i32) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        let mut facade = Self::find_record(db, id).await?;
        facade.load_acting_as(db).await?;
        Ok(facade)
    }

    /// Build from mixed facade/supermodel attributes and save strictly
    async fn create<C>(db: &C, attributes: Map<String, Json>) -> Result<Self>
    where
        C: ConnectionTrait + TransactionTrait,
        Self: Dispatch,
    {
        let mut facade = Self::default();
        facade.assign_attributes(attributes)?;
        facade.save_strict(db).await?;
        Ok(facade)
    }
}

async fn persist_with_supermodel<F, C>(facade: &mut F, db: &C) -> Result<()>
where
    F: ActsAs,
    C: ConnectionTrait,
{
    facade.persist_record(db).await?;

    let owner = facade.owner_ref().ok_or_else(|| AppError::Internal {
        message: format!("{} has no id after insert", F::MODEL_NAME),
    })?;

    let supermodel = facade.acting_as_mut();
    supermodel.set_actable(owner);
    supermodel.persist_record(db).await
}

async fn remove_with_supermodel<F, C>(facade: &mut F, db: &C) -> Result<()>
where
    F: ActsAs,
    C: ConnectionTrait,
{
    facade.acting_as_mut().remove_record(db).await?;
    facade.remove_record(db).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acts_as_association_reflection() {
        let association = Association::acts_as("product");
        assert_eq!(association.name, "product");
        assert_eq!(association.kind, AssociationKind::HasOne);
        assert_eq!(association.polymorphic_as, Some("actable"));
        assert_eq!(association.dependent, Some(Dependent::Destroy));
        assert!(association.autosave);
    }
}
