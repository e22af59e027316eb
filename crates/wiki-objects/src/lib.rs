//! wiki-objects: typed, schema-driven property containers for a wiki CMS.
//!
//! Pages of a wiki carry structured records ("objects") whose fields are
//! defined by a class schema loaded at runtime. This crate provides the
//! record model, the schema model, and everything that connects the two:
//! typed access, field rendering, validation, merging, diffing and XML.
//!
//! # Quick Start
//!
//! ```rust
//! use wiki_objects::{
//!     ClassDefinition, Container, Context, FieldDescriptor, FieldType, InMemoryRegistry,
//! };
//!
//! let registry = InMemoryRegistry::new().with_class(
//!     ClassDefinition::new("Blog.PostClass")
//!         .with_field(FieldDescriptor::new("title", "Title", FieldType::String))
//!         .with_field(FieldDescriptor::new("count", "Count", FieldType::Integer)),
//! );
//! let ctx = Context::new(&registry);
//!
//! let mut a = Container::new("Blog.PostClass");
//! a.set_string_value("title", "Hello");
//! a.set_int_value("count", 3);
//!
//! let mut b = a.clone();
//! b.set_int_value("count", 5);
//!
//! let diffs = a.diff(&b, &ctx);
//! assert_eq!(diffs.len(), 1);
//! assert_eq!(diffs[0].field_name(), "count");
//!
//! // Objects survive an XML round trip when their class is known.
//! let xml = a.to_xml_string();
//! assert_eq!(Container::from_xml_str(&xml, &ctx).unwrap(), a);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Containers, values, identifiers and diffs
//! - [`schema`]: Class definitions, field descriptors and registries
//! - [`context`]: Schema lookup and validation settings
//! - [`codec`]: XML encoding/decoding of objects and classes
//! - [`validate`]: Opt-in schema validation
//! - [`error`]: Error types
//!
//! # Failure policy
//!
//! Reads are fail-soft. Typed accessors return defaults for missing or
//! mistyped fields, registry failures are logged and treated as "class not
//! found", and `Container::to_xml_string` yields an empty string if the
//! writer fails. Errors are returned only by strict validation and by XML
//! parsing.

pub mod codec;
pub mod context;
pub mod error;
pub mod model;
pub mod schema;
pub mod util;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::{XmlElement, XmlOptions};
pub use context::Context;
pub use error::{ObjectError, RegistryError, XmlError};
pub use model::{
    Container, DiffAction, FieldType, Id, ObjectDiff, PropertyValue, Value, FORM_LIST_SEPARATOR,
};
pub use model::id::{container_id, derived_uuid, format_id, parse_id, NIL_ID};
pub use schema::{ClassDefinition, DisplayMode, FieldDescriptor, InMemoryRegistry, SchemaRegistry};
pub use validate::{check_field, validate_object};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
