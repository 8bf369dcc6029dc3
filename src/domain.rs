//! Domain layer: the records produced by extraction

pub mod product;

pub use product::{FieldValue, ProductRecord};
