//! Value types for container fields.
//!
//! Values are typed field instances stored on a [`Container`]; the field's
//! schema-side definition lives in [`FieldDescriptor`](crate::schema::FieldDescriptor).

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::model::{Container, Id};
use crate::util::datetime::{format_date, DEFAULT_DATE_FORMAT};

/// Separator used when a string set is written as a single form value.
pub const FORM_LIST_SEPARATOR: &str = "|";

/// Field type tags.
///
/// The tag is the identity of a field definition: it selects the value
/// variant, the parsing rules and the renderers. It is fixed when the
/// definition is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Short single-line text.
    String,
    /// Large multi-line text.
    TextArea,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    Long,
    /// Point in time, UTC.
    Date,
    /// Set of strings chosen from a list.
    List,
    /// Nested container of another class.
    Object,
}

impl FieldType {
    /// Every field type, in declaration order.
    pub const ALL: [FieldType; 7] = [
        FieldType::String,
        FieldType::TextArea,
        FieldType::Integer,
        FieldType::Long,
        FieldType::Date,
        FieldType::List,
        FieldType::Object,
    ];

    /// Returns the class type name written to XML.
    pub fn class_type(self) -> &'static str {
        match self {
            FieldType::String => "StringClass",
            FieldType::TextArea => "TextAreaClass",
            FieldType::Integer => "IntegerClass",
            FieldType::Long => "LongClass",
            FieldType::Date => "DateClass",
            FieldType::List => "ListClass",
            FieldType::Object => "ObjectClass",
        }
    }

    /// Resolves a class type name read from XML.
    pub fn from_class_type(class_type: &str) -> Option<FieldType> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.class_type() == class_type)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_type())
    }
}

/// A typed value stored in a container field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Short text.
    String(String),
    /// Large text, stored separately from short strings by persistence layers.
    LargeString(String),
    /// 32-bit integer.
    Integer(i32),
    /// 64-bit integer.
    Long(i64),
    /// Point in time.
    Date(DateTime<Utc>),
    /// Unordered set of strings, kept sorted for stable output.
    StringSet(BTreeSet<String>),
    /// Nested container.
    Object(Box<Container>),
}

impl Value {
    /// Returns the field type this value belongs to.
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::String(_) => FieldType::String,
            Value::LargeString(_) => FieldType::TextArea,
            Value::Integer(_) => FieldType::Integer,
            Value::Long(_) => FieldType::Long,
            Value::Date(_) => FieldType::Date,
            Value::StringSet(_) => FieldType::List,
            Value::Object(_) => FieldType::Object,
        }
    }

    /// Returns the human-readable text of the value.
    pub fn to_text(&self) -> String {
        match self {
            Value::String(s) | Value::LargeString(s) => s.clone(),
            Value::Integer(v) => v.to_string(),
            Value::Long(v) => v.to_string(),
            Value::Date(d) => format_date(d, DEFAULT_DATE_FORMAT),
            Value::StringSet(set) => join(set, " "),
            Value::Object(c) => c.to_xml_string(),
        }
    }

    /// Returns the value as submitted through a single form input.
    ///
    /// Sets are joined with [`FORM_LIST_SEPARATOR`].
    pub fn to_form_string(&self) -> String {
        match self {
            Value::StringSet(set) => join(set, FORM_LIST_SEPARATOR),
            other => other.to_text(),
        }
    }
}

fn join(set: &BTreeSet<String>, sep: &str) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(sep)
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Date(v)
    }
}

impl From<BTreeSet<String>> for Value {
    fn from(v: BTreeSet<String>) -> Self {
        Value::StringSet(v)
    }
}

impl From<Container> for Value {
    fn from(v: Container) -> Self {
        Value::Object(Box::new(v))
    }
}

/// A named value held by a container.
///
/// `owner` is the identifier of the container the value is stored in. It is
/// set by the container on insertion and never keeps the container alive.
#[derive(Debug, Clone)]
pub struct PropertyValue {
    pub(crate) name: String,
    pub(crate) owner: Option<Id>,
    pub(crate) value: Value,
}

impl PropertyValue {
    /// Creates an unattached property.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            value: value.into(),
        }
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the identifier of the owning container, if attached.
    pub fn owner(&self) -> Option<Id> {
        self.owner
    }

    /// Returns the raw value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Replaces the raw value, keeping name and owner.
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
    }

    /// Consumes the property, returning the raw value.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Returns the human-readable text of the value.
    pub fn to_text(&self) -> String {
        self.value.to_text()
    }

    /// Returns the value as a single form input string.
    pub fn to_form_string(&self) -> String {
        self.value.to_form_string()
    }
}

/// Two properties are equal when name and value match; the owner is ignored.
impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}
