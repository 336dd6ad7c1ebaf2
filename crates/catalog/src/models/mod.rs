//! SeaORM entity models
//!
//! Database entities for the catalog

mod pen;
mod product;

pub use product::{
    ActableType,
    Entity as ProductEntity,
    Model as ProductModel,
    ActiveModel as ProductActiveModel,
    Column as ProductColumn,
};

pub use pen::{
    Entity as PenEntity,
    Model as PenModel,
    ActiveModel as PenActiveModel,
    Column as PenColumn,
};
