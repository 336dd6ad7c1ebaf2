//! Change-tracked records over SeaORM active models
//!
//! `Tracked<A>` keeps the active model being edited next to the model as
//! it was last loaded from (or written to) the database. Dirty tracking,
//! `*_was` values and forced changes are all derived from that pair.

use crate::attributes::Attributes;
use crate::errors::{AppError, Result};
use crate::value;
use sea_orm::sea_query::{Nullable, ValueType};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr,
    EntityTrait, IdenStatic, IntoActiveModel, Iterable, ModelTrait, Value,
};
use serde_json::Value as Json;
use std::collections::BTreeSet;
use std::fmt;

/// Model type of an active model's entity
pub type ModelOf<A> = <<A as ActiveModelTrait>::Entity as EntityTrait>::Model;

/// Column type of an active model's entity
pub type ColumnOf<A> = <<A as ActiveModelTrait>::Entity as EntityTrait>::Column;

/// Exposes the change-tracked record of entity `A`.
///
/// A facade implements this once for its own record and once for its
/// supermodel's record; attribute method tables are blanket-implemented
/// over it.
pub trait HasRecord<A: ActiveModelTrait> {
    fn record(&self) -> &Tracked<A>;
    fn record_mut(&mut self) -> &mut Tracked<A>;
}

/// Current value held by an active value, if any
pub fn active_value<V: Into<Value>>(value: &ActiveValue<V>) -> Option<&V> {
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v),
        ActiveValue::NotSet => None,
    }
}

pub struct Tracked<A: ActiveModelTrait> {
    active: A,
    original: Option<ModelOf<A>>,
    forced: BTreeSet<String>,
    destroyed: bool,
}

impl<A: ActiveModelTrait> Clone for Tracked<A> {
    fn clone(&self) -> Self {
        Self {
            active: self.active.clone(),
            original: self.original.clone(),
            forced: self.forced.clone(),
            destroyed: self.destroyed,
        }
    }
}

impl<A: ActiveModelTrait> fmt::Debug for Tracked<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("active", &self.active)
            .field("original", &self.original)
            .field("forced", &self.forced)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl<A: ActiveModelBehavior> Default for Tracked<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ActiveModelBehavior> Tracked<A> {
    /// A new, unsaved record with every attribute unset
    pub fn new() -> Self {
        Self {
            active: <A as ActiveModelBehavior>::new(),
            original: None,
            forced: BTreeSet::new(),
            destroyed: false,
        }
    }
}

impl<A: ActiveModelTrait> Tracked<A> {
    /// A record in its persisted state
    pub fn from_model(model: ModelOf<A>) -> Self
    where
        ModelOf<A>: IntoActiveModel<A>,
    {
        Self {
            active: model.clone().into_active_model(),
            original: Some(model),
            forced: BTreeSet::new(),
            destroyed: false,
        }
    }

    pub fn active(&self) -> &A {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut A {
        &mut self.active
    }

    /// The model as last loaded or saved
    pub fn original(&self) -> Option<&ModelOf<A>> {
        self.original.as_ref()
    }

    pub fn is_new_record(&self) -> bool {
        self.original.is_none() && !self.destroyed
    }

    pub fn is_persisted(&self) -> bool {
        self.original.is_some() && !self.destroyed
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn mark_destroyed(&mut self) {
        self.destroyed = true;
        self.forced.clear();
    }

    // ========================================================================
    // Schema introspection
    // ========================================================================

    /// Every column name of the entity, in declaration order
    pub fn attribute_names(&self) -> Vec<String> {
        <ColumnOf<A> as Iterable>::iter().map(|c| c.as_str().to_owned()).collect()
    }

    pub fn column(&self, name: &str) -> Option<ColumnOf<A>> {
        <ColumnOf<A> as Iterable>::iter().find(|c| c.as_str() == name)
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Current value; unset and NULL both read as `None`
    pub fn current(&self, column: ColumnOf<A>) -> Option<Value> {
        self.active
            .get(column)
            .into_value()
            .filter(|v| !value::is_null(v))
    }

    /// Persisted value; `None` for new records and NULL columns
    pub fn previous(&self, column: ColumnOf<A>) -> Option<Value> {
        self.original
            .as_ref()
            .map(|m| m.get(column))
            .filter(|v| !value::is_null(v))
    }

    pub fn read<T: ValueType + Nullable>(&self, column: ColumnOf<A>) -> Option<T> {
        self.current(column)
            .and_then(|v| <T as ValueType>::try_from(v).ok())
    }

    pub fn write<T: Into<Value> + Nullable>(&mut self, column: ColumnOf<A>, value: Option<T>) {
        self.active.set(column, value.into());
    }

    pub fn is_present(&self, column: ColumnOf<A>) -> bool {
        self.current(column)
            .map(|v| value::is_present(&v))
            .unwrap_or(false)
    }

    // ========================================================================
    // Dirty tracking
    // ========================================================================

    /// Whether the attribute differs from its persisted value or was forced
    pub fn changed(&self, column: ColumnOf<A>) -> bool {
        if self.forced.contains(column.as_str()) {
            return true;
        }
        match self.active.get(column) {
            ActiveValue::Set(_) => self.current(column) != self.previous(column),
            ActiveValue::Unchanged(_) | ActiveValue::NotSet => false,
        }
    }

    pub fn was<T: ValueType + Nullable>(&self, column: ColumnOf<A>) -> Option<T> {
        self.previous(column)
            .and_then(|v| <T as ValueType>::try_from(v).ok())
    }

    /// `(was, now)` when the attribute changed
    pub fn change<T: ValueType + Nullable>(
        &self,
        column: ColumnOf<A>,
    ) -> Option<(Option<T>, Option<T>)> {
        if self.changed(column) {
            Some((self.was(column), self.read(column)))
        } else {
            None
        }
    }

    /// Mark the attribute dirty even if its value stays the same
    pub fn will_change(&mut self, column: ColumnOf<A>) {
        self.forced.insert(column.as_str().to_owned());
        if let ActiveValue::Unchanged(v) = self.active.get(column) {
            self.active.set(column, v);
        }
    }

    pub fn changed_attributes(&self) -> Vec<String> {
        <ColumnOf<A> as Iterable>::iter()
            .filter(|c| self.changed(*c))
            .map(|c| c.as_str().to_owned())
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        <ColumnOf<A> as Iterable>::iter().any(|c| self.changed(c))
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Insert a new record or update a dirty one.
    ///
    /// Returns `false` when a persisted record had nothing to write. A
    /// destroyed record is never written again.
    pub async fn save<C>(&mut self, db: &C) -> std::result::Result<bool, DbErr>
    where
        C: ConnectionTrait,
        A: ActiveModelBehavior + Send + 'static,
        ModelOf<A>: IntoActiveModel<A>,
    {
        if self.destroyed {
            return Err(DbErr::Custom("cannot save a destroyed record".to_owned()));
        }

        if self.is_persisted() && !self.is_dirty() {
            return Ok(false);
        }

        let active = self.active.clone();
        let model = if self.is_persisted() {
            active.update(db).await?
        } else {
            active.insert(db).await?
        };

        self.active = model.clone().into_active_model();
        self.original = Some(model);
        self.forced.clear();
        Ok(true)
    }
}

impl<A: ActiveModelTrait> Attributes for Tracked<A> {
    fn attribute_names(&self) -> Vec<String> {
        Tracked::attribute_names(self)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    fn read_json(&self, name: &str) -> Option<Json> {
        let column = self.column(name)?;
        Some(self.current(column).map(|v| value::to_json(&v)).unwrap_or(Json::Null))
    }

    fn write_json(&mut self, name: &str, json: Json) -> Result<()> {
        let column = self.column(name).ok_or_else(|| AppError::Internal {
            message: format!("no column `{}`", name),
        })?;
        let def = column.def();
        let value = value::from_json(def.get_column_type(), json).map_err(|expected| {
            AppError::TypeMismatch {
                attribute: name.to_owned(),
                expected,
            }
        })?;
        self.active.set(column, value);
        Ok(())
    }

    fn attribute_present(&self, name: &str) -> bool {
        self.column(name).map(|c| self.is_present(c)).unwrap_or(false)
    }

    fn attribute_changed(&self, name: &str) -> bool {
        self.column(name).map(|c| self.changed(c)).unwrap_or(false)
    }

    fn attribute_was(&self, name: &str) -> Json {
        self.column(name)
            .and_then(|c| self.previous(c))
            .map(|v| value::to_json(&v))
            .unwrap_or(Json::Null)
    }

    fn attribute_will_change(&mut self, name: &str) {
        if let Some(column) = self.column(name) {
            self.will_change(column);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod widget {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
        #[sea_orm(table_name = "widgets")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i32,
            #[sea_orm(column_type = "Text", nullable)]
            pub label: Option<String>,
            pub weight: Option<f64>,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    use widget::{ActiveModel, Column};

    fn persisted() -> Tracked<ActiveModel> {
        Tracked::from_model(widget::Model {
            id: 1,
            label: Some("bolt".into()),
            weight: Some(2.5),
        })
    }

    #[test]
    fn test_new_record_tracks_assignments() {
        let mut record = Tracked::<ActiveModel>::new();
        assert!(record.is_new_record());
        assert!(!record.is_dirty());

        record.write(Column::Label, Some("nut".to_string()));
        assert_eq!(record.read::<String>(Column::Label), Some("nut".to_string()));
        assert!(record.changed(Column::Label));
        assert_eq!(record.was::<String>(Column::Label), None);
        assert_eq!(
            record.change::<String>(Column::Label),
            Some((None, Some("nut".to_string())))
        );
        assert!(!record.changed(Column::Weight));
    }

    #[test]
    fn test_assigning_same_value_is_not_a_change() {
        let mut record = persisted();
        record.write(Column::Label, Some("bolt".to_string()));
        assert!(!record.changed(Column::Label));
        assert!(!record.is_dirty());

        record.write(Column::Weight, Some(3.0));
        assert!(record.changed(Column::Weight));
        assert_eq!(record.was::<f64>(Column::Weight), Some(2.5));
        assert_eq!(record.changed_attributes(), vec!["weight".to_string()]);
    }

    #[test]
    fn test_will_change_forces_dirty() {
        let mut record = persisted();
        record.will_change(Column::Label);
        assert!(record.changed(Column::Label));
        assert!(matches!(record.active().label, ActiveValue::Set(_)));
    }

    #[test]
    fn test_presence_and_introspection() {
        let mut record = Tracked::<ActiveModel>::new();
        assert!(!record.is_present(Column::Label));
        record.write(Column::Label, Some(" ".to_string()));
        assert!(!record.is_present(Column::Label));
        assert_eq!(record.attribute_names(), vec!["id", "label", "weight"]);
        assert!(record.column("weight").is_some());
        assert!(record.column("height").is_none());
    }

    #[test]
    fn test_dynamic_access() {
        let mut record = persisted();
        assert_eq!(record.read_json("label"), Some(Json::from("bolt")));
        assert_eq!(record.read_json("missing"), None);

        record.write_json("weight", Json::from(4.0)).unwrap();
        assert!(record.attribute_changed("weight"));
        assert_eq!(record.attribute_was("weight"), Json::from(2.5));

        let err = record.write_json("weight", Json::from("heavy")).unwrap_err();
        assert!(matches!(err, AppError::TypeMismatch { .. }));
    }

    #[tokio::test]
    async fn test_save_inserts_then_skips_clean_update() {
        let pool = crate::db::DbPool::new(&crate::config::DatabaseConfig::in_memory())
            .await
            .unwrap();
        let db = pool.write();
        crate::db::create_table(db, widget::Entity).await.unwrap();

        let mut record = Tracked::<ActiveModel>::new();
        record.write(Column::Label, Some("washer".to_string()));
        assert!(record.save(db).await.unwrap());
        assert!(record.is_persisted());
        assert!(!record.is_dirty());
        assert_eq!(record.original().map(|m| m.id), Some(1));

        assert!(!record.save(db).await.unwrap());

        record.write(Column::Weight, Some(0.1));
        assert!(record.save(db).await.unwrap());
        let stored = widget::Entity::find_by_id(1).one(db).await.unwrap().unwrap();
        assert_eq!(stored.weight, Some(0.1));
    }

    #[tokio::test]
    async fn test_destroyed_record_is_not_inserted_again() {
        let pool = crate::db::DbPool::new(&crate::config::DatabaseConfig::in_memory())
            .await
            .unwrap();
        let db = pool.write();
        crate::db::create_table(db, widget::Entity).await.unwrap();

        let mut record = Tracked::<ActiveModel>::new();
        record.write(Column::Label, Some("washer".to_string()));
        record.save(db).await.unwrap();
        widget::Entity::delete_by_id(1).exec(db).await.unwrap();
        record.mark_destroyed();

        assert!(record.save(db).await.is_err());
        assert!(widget::Entity::find_by_id(1).one(db).await.unwrap().is_none());
    }
}
