//! Model System - the model contract consumed by the datastore
//!
//! - `definition`: property descriptors and semantic type tags
//! - `core_trait`: `Model` and `ModelInstance` traits
//! - `naming`: model-to-table name resolution

pub mod core_trait;
pub mod definition;
pub mod naming;

pub use core_trait::{Instance, Model, ModelInstance, Record};
pub use definition::{ModelDefinition, ModelDefinitionBuilder, PropertyDefinition, PropertyType};
pub use naming::{to_kebab_case, KebabCaseTableNames, TableNameResolver};
