//! Error types for object access, schema lookup and XML (de)serialization.
//!
//! Most read paths in this crate are fail-soft and never surface these
//! errors: typed accessors return defaults and schema lookups degrade to
//! `None`. The errors below are returned only where a caller asked for
//! strictness (field validation) or parsed an external document.

use thiserror::Error;

use crate::model::FieldType;

/// Error raised by checked container access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    /// Strict field validation is enabled and the class does not declare the field.
    #[error("field {field:?} does not exist in class {class:?}")]
    FieldNotDeclared { field: String, class: String },

    /// The value stored under a field does not have the declared type.
    #[error("field {field:?} holds a {found} value, class declares {expected}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        found: FieldType,
    },
}

/// Error reported by a [`SchemaRegistry`](crate::schema::SchemaRegistry) back end.
///
/// Containers never propagate these; they are logged and the lookup is
/// treated as "class not found".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("schema storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("failed to load class {class:?}: {reason}")]
    LoadFailed { class: String, reason: String },
}

/// Error during XML reading or writing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    #[error("malformed XML: {message}")]
    Malformed { message: String },

    #[error("invalid UTF-8 in {context}")]
    InvalidUtf8 { context: &'static str },

    #[error("document has no root element")]
    MissingRoot,

    #[error("expected <{expected}> element, found <{found}>")]
    UnexpectedElement {
        expected: &'static str,
        found: String,
    },

    #[error("<{parent}> is missing required <{child}> element")]
    MissingElement {
        parent: &'static str,
        child: &'static str,
    },

    #[error("invalid number {value:?} in <{element}>")]
    InvalidNumber {
        element: &'static str,
        value: String,
    },

    #[error("unknown field class type {class_type:?} for field {field:?}")]
    UnknownClassType { field: String, class_type: String },

    #[error("failed to write XML: {message}")]
    Write { message: String },
}
