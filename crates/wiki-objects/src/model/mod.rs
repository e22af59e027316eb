//! Data model types for wiki objects.
//!
//! This module contains the record side of the object model:
//! - Identifiers (derived UUIDs)
//! - Values (typed field instances)
//! - Containers (records of a runtime-defined class)
//! - Diffs (field-level differences between containers)

pub mod container;
pub mod diff;
pub mod id;
pub mod value;

pub use container::Container;
pub use diff::{DiffAction, ObjectDiff};
pub use id::{container_id, derived_uuid, format_id, parse_id, Id, NIL_ID};
pub use value::{FieldType, PropertyValue, Value, FORM_LIST_SEPARATOR};
