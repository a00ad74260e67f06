//! Catalog entities and the generic operations over them
//!
//! Each entity (film, actor, category, editor, language) is described once by
//! an [`EntityDescriptor`]; list, add and edit behavior is written a single
//! time against that description.

pub mod crud;
pub mod entity;
pub mod form;

pub use entity::{ColumnSpec, EntityDescriptor, EntityKind, FieldKind, FieldSpec};
pub use form::FormValues;
