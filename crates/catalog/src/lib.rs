//! Catalog models
//!
//! `Product` is the supermodel; `Pen` acts as a product, so a pen exposes
//! the product's name and price, validates them, and saves and destroys its
//! product row together with its own.

pub mod models;
pub mod pen;
pub mod product;
pub mod repository;
pub mod schema;

pub use pen::{Pen, PenAttributes};
pub use product::{Presenter, Product, ProductAttributes};
pub use repository::Repository;
