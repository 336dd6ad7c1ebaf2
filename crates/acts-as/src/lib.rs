//! acts-as core library
//!
//! Lets a facade model present itself as an instance of a polymorphic
//! supermodel record:
//! - Change-tracked records over SeaORM active models
//! - Statically generated attribute method tables
//! - Identity predicates (`acts_as_model`, `is_a`)
//! - Transactional save / destroy forwarding
//! - Dynamic, string-named attribute dispatch
//! - Validation error collection
//! - Configuration, database pool, metrics

pub mod acts_as;
pub mod attributes;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod record;
pub mod validation;
pub mod value;

mod macros;

// Re-export commonly used types
pub use acts_as::{ActableRef, Actable, ActsAs, Association, AssociationKind, Dependent};
pub use attributes::{AttributeMethod, Attributes, Dispatch};
pub use config::AppConfig;
pub use db::DbPool;
pub use errors::{AppError, ErrorCode, Result};
pub use model::{Base, Model, ModelRef, Persist};
pub use record::{HasRecord, Tracked};
pub use validation::Errors;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Message recorded for missing required attributes
pub const BLANK_MESSAGE: &str = "can't be blank";
