//! Model identity and low-level persistence

use crate::errors::Result;
use crate::validation::Errors;
use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use std::any::TypeId;

/// Root of every model lineage, the counterpart of a universal base class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Base;

/// Static identity of a model type
pub trait Model: Send + Sync + 'static {
    /// Canonical lowercase name, e.g. `product`
    const MODEL_NAME: &'static str;

    /// The type itself followed by every type it answers `is_a` for
    fn lineage() -> Vec<TypeId> {
        vec![TypeId::of::<Self>(), TypeId::of::<Base>()]
    }

    /// Type-level identity check
    fn is_a<T: ?Sized + 'static>() -> bool {
        Self::lineage().contains(&TypeId::of::<T>())
    }

    /// Instance-level identity check
    fn kind_of<T: ?Sized + 'static>(&self) -> bool
    where
        Self: Sized,
    {
        Self::is_a::<T>()
    }

    fn model_name(&self) -> &'static str
    where
        Self: Sized,
    {
        Self::MODEL_NAME
    }
}

/// A model referenced either by name or by type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelRef {
    Name(String),
    Type(TypeId),
}

impl ModelRef {
    pub fn of<T: ?Sized + 'static>() -> Self {
        ModelRef::Type(TypeId::of::<T>())
    }

    /// Whether this reference designates `M`; names compare in snake case
    pub fn matches<M: Model>(&self) -> bool {
        match self {
            ModelRef::Name(name) => underscore(name) == M::MODEL_NAME,
            ModelRef::Type(id) => *id == TypeId::of::<M>(),
        }
    }
}

impl From<&str> for ModelRef {
    fn from(name: &str) -> Self {
        ModelRef::Name(name.to_owned())
    }
}

impl From<String> for ModelRef {
    fn from(name: String) -> Self {
        ModelRef::Name(name)
    }
}

/// `LineItem` -> `line_item`
pub fn underscore(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Row-level persistence of a single model, without any forwarding
#[async_trait]
pub trait Persist: Model + Clone + Default {
    fn id(&self) -> Option<i32>;

    fn is_new_record(&self) -> bool;

    fn is_destroyed(&self) -> bool;

    /// Validate this model's own attributes
    fn validate(&self) -> Errors;

    fn errors(&self) -> &Errors;

    fn errors_mut(&mut self) -> &mut Errors;

    /// Write the row (insert or update)
    async fn persist_record<C>(&mut self, db: &C) -> Result<()>
    where
        C: ConnectionTrait;

    /// Delete the row; a never-saved record is left alone
    async fn remove_record<C>(&mut self, db: &C) -> Result<()>
    where
        C: ConnectionTrait;

    /// Re-read the row, discarding unsaved changes
    async fn reload_record<C>(&mut self, db: &C) -> Result<()>
    where
        C: ConnectionTrait;

    async fn find_record<C>(db: &C, id: i32) -> Result<Self>
    where
        C: ConnectionTrait;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Gadget;

    impl Model for Gadget {
        const MODEL_NAME: &'static str = "gadget";
    }

    #[test]
    fn test_default_lineage() {
        assert!(Gadget::is_a::<Gadget>());
        assert!(Gadget::is_a::<Base>());
        assert!(!Gadget::is_a::<String>());
        assert!(Gadget.kind_of::<Base>());
    }

    #[test]
    fn test_model_ref_matching() {
        assert!(ModelRef::from("gadget").matches::<Gadget>());
        assert!(ModelRef::from("Gadget").matches::<Gadget>());
        assert!(ModelRef::of::<Gadget>().matches::<Gadget>());
        assert!(!ModelRef::from("model").matches::<Gadget>());
        assert!(!ModelRef::of::<str>().matches::<Gadget>());
    }

    #[test]
    fn test_underscore() {
        assert_eq!(underscore("LineItem"), "line_item");
        assert_eq!(underscore("product"), "product");
    }
}
