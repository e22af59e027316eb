//! The dynamic property container.
//!
//! A [`Container`] is one record of a class: a set of named, typed values
//! whose legal names are defined by a [`ClassDefinition`] looked up at
//! runtime. Fields keep their insertion order. Removed fields are kept as
//! tombstones until a persistence layer takes them.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::warn;

use crate::codec::xml::{parse_document, write_document, XmlElement, XmlOptions};
use crate::context::Context;
use crate::error::{ObjectError, XmlError};
use crate::model::diff::{DiffAction, ObjectDiff};
use crate::model::id::{container_id, Id};
use crate::model::value::{PropertyValue, Value};
use crate::schema::{ClassDefinition, DisplayMode};
use crate::validate::check_field;

/// A record of a runtime-defined class.
#[derive(Debug, Default)]
pub struct Container {
    class_name: String,
    name: String,
    number: i32,
    fields: IndexMap<String, PropertyValue>,
    fields_to_remove: Vec<PropertyValue>,
}

impl Container {
    /// Creates an empty container of the given class.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    // =========================================================================
    // IDENTITY
    // =========================================================================

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn set_class_name(&mut self, class_name: impl Into<String>) {
        self.class_name = class_name.into();
        self.rebind_owners();
    }

    /// Returns the name of the document that holds this container.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.rebind_owners();
    }

    /// Returns the index of this container among the document's containers
    /// of the same class.
    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn set_number(&mut self, number: i32) {
        self.number = number;
        self.rebind_owners();
    }

    /// Returns the identifier stored as the owner of every held value.
    ///
    /// Derived from class name, document name and number, so it changes when
    /// any of them does.
    pub fn id(&self) -> Id {
        container_id(&self.class_name, &self.name, self.number)
    }

    fn rebind_owners(&mut self) {
        let id = self.id();
        for property in self.fields.values_mut().chain(self.fields_to_remove.iter_mut()) {
            property.owner = Some(id);
        }
    }

    /// Resolves this container's class through `ctx`.
    pub fn class_definition(&self, ctx: &Context<'_>) -> Option<Arc<ClassDefinition>> {
        ctx.resolve_class(&self.class_name)
    }

    // =========================================================================
    // FIELD ACCESS
    // =========================================================================

    /// Returns the value of a field after checking the name against the class.
    ///
    /// The check only rejects names when `ctx` has strict field validation
    /// enabled and the class resolves.
    pub fn get(
        &self,
        name: &str,
        ctx: &Context<'_>,
    ) -> Result<Option<&PropertyValue>, ObjectError> {
        check_field(self, name, ctx)?;
        Ok(self.safe_get(name))
    }

    /// Stores a value after checking the name against the class.
    pub fn put(
        &mut self,
        name: &str,
        property: PropertyValue,
        ctx: &Context<'_>,
    ) -> Result<(), ObjectError> {
        check_field(self, name, ctx)?;
        self.safe_put(name, property);
        Ok(())
    }

    /// Returns the value of a field without any check.
    pub fn safe_get(&self, name: &str) -> Option<&PropertyValue> {
        self.fields.get(name)
    }

    /// Stores a value without any check.
    ///
    /// The value is renamed to `name` and bound to this container. Replacing
    /// an existing field keeps its position.
    pub fn safe_put(&mut self, name: &str, property: PropertyValue) {
        let id = self.id();
        self.insert_bound(name, property, id);
    }

    /// Stores a value bound to `owner`, which must be `self.id()`.
    fn insert_bound(&mut self, name: &str, mut property: PropertyValue, owner: Id) {
        property.name = name.to_string();
        property.owner = Some(owner);
        self.fields.insert(name.to_string(), property);
    }

    fn put_value(&mut self, name: &str, value: Value) {
        self.safe_put(name, PropertyValue::new(name, value));
    }

    fn value(&self, name: &str) -> Option<&Value> {
        self.safe_get(name).map(PropertyValue::value)
    }

    // =========================================================================
    // TYPED ACCESSORS
    // =========================================================================

    // Reads never fail: a missing field or a value of an unrelated type yields
    // the type's default.

    /// Returns the text of a scalar field, `""` for sets, nested objects and
    /// missing fields.
    pub fn string_value(&self, name: &str) -> String {
        match self.value(name) {
            Some(Value::StringSet(_) | Value::Object(_)) | None => String::new(),
            Some(value) => value.to_text(),
        }
    }

    pub fn large_string_value(&self, name: &str) -> String {
        self.string_value(name)
    }

    /// Returns an integer field; long values are truncated.
    pub fn int_value(&self, name: &str) -> i32 {
        match self.value(name) {
            Some(Value::Integer(v)) => *v,
            Some(Value::Long(v)) => *v as i32,
            _ => 0,
        }
    }

    /// Returns a long field; integer values are widened.
    pub fn long_value(&self, name: &str) -> i64 {
        match self.value(name) {
            Some(Value::Long(v)) => *v,
            Some(Value::Integer(v)) => i64::from(*v),
            _ => 0,
        }
    }

    pub fn date_value(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.value(name) {
            Some(Value::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn set_value(&self, name: &str) -> BTreeSet<String> {
        match self.value(name) {
            Some(Value::StringSet(set)) => set.clone(),
            _ => BTreeSet::new(),
        }
    }

    /// Returns a nested container field.
    pub fn object_value(&self, name: &str) -> Option<&Container> {
        match self.value(name) {
            Some(Value::Object(nested)) => Some(nested.as_ref()),
            _ => None,
        }
    }

    pub fn set_string_value(&mut self, name: &str, value: impl Into<String>) {
        self.put_value(name, Value::String(value.into()));
    }

    pub fn set_large_string_value(&mut self, name: &str, value: impl Into<String>) {
        self.put_value(name, Value::LargeString(value.into()));
    }

    pub fn set_int_value(&mut self, name: &str, value: i32) {
        self.put_value(name, Value::Integer(value));
    }

    pub fn set_long_value(&mut self, name: &str, value: i64) {
        self.put_value(name, Value::Long(value));
    }

    pub fn set_date_value(&mut self, name: &str, value: DateTime<Utc>) {
        self.put_value(name, Value::Date(value));
    }

    pub fn set_set_value(&mut self, name: &str, value: BTreeSet<String>) {
        self.put_value(name, Value::StringSet(value));
    }

    pub fn set_object_value(&mut self, name: &str, value: Container) {
        self.put_value(name, Value::Object(Box::new(value)));
    }

    // =========================================================================
    // REMOVAL
    // =========================================================================

    /// Removes a field, keeping it as a tombstone. Does nothing if absent.
    pub fn remove_field(&mut self, name: &str) {
        if let Some(property) = self.fields.shift_remove(name) {
            self.fields_to_remove.push(property);
        }
    }

    /// Returns the fields removed since the tombstones were last taken.
    pub fn fields_to_remove(&self) -> &[PropertyValue] {
        &self.fields_to_remove
    }

    /// Takes the tombstones, leaving none.
    pub fn take_fields_to_remove(&mut self) -> Vec<PropertyValue> {
        std::mem::take(&mut self.fields_to_remove)
    }

    /// Records a value for deletion without touching the live fields.
    pub fn add_property_for_removal(&mut self, mut property: PropertyValue) {
        property.owner = Some(self.id());
        self.fields_to_remove.push(property);
    }

    // =========================================================================
    // INTROSPECTION
    // =========================================================================

    /// Iterates field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterates values in insertion order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyValue> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copies the raw values out, keyed by field name.
    pub fn to_value_map(&self) -> IndexMap<String, Value> {
        self.fields
            .iter()
            .map(|(name, property)| (name.clone(), property.value.clone()))
            .collect()
    }

    // =========================================================================
    // MERGE & DIFF
    // =========================================================================

    /// Copies in every field of `other` that this container lacks.
    ///
    /// Existing fields are never overwritten.
    pub fn merge(&mut self, other: &Container) {
        let id = self.id();
        for (name, property) in &other.fields {
            if !self.fields.contains_key(name) {
                self.insert_bound(name, property.clone(), id);
            }
        }
    }

    /// Lists the field-level differences from this container to `other`.
    ///
    /// Fields only here are reported as [`DiffAction::Added`], fields on both
    /// sides with different values as [`DiffAction::Changed`], and fields only
    /// in `other` as [`DiffAction::Removed`]. Values are rendered in view mode
    /// when the class resolves, otherwise as raw text.
    pub fn diff(&self, other: &Container, ctx: &Context<'_>) -> Vec<ObjectDiff> {
        let class = self.class_definition(ctx);
        let render = |object: &Container, name: &str| -> String {
            let field = class.as_deref().and_then(|c| c.field(name));
            match (field, object.safe_get(name)) {
                (Some(field), Some(_)) => field.display_view(name, "", object, ctx),
                (None, Some(property)) => property.to_text(),
                (_, None) => String::new(),
            }
        };
        let entry = |action, name: &str, old: String, new: String| {
            ObjectDiff::new(self.class_name.as_str(), self.number, action, name, old, new)
        };

        let mut diffs = Vec::new();
        for (name, property) in &self.fields {
            match other.fields.get(name) {
                None => {
                    let old = render(self, name);
                    diffs.push(entry(DiffAction::Added, name, old, String::new()));
                }
                Some(theirs) if theirs != property => {
                    let (old, new) = (render(self, name), render(other, name));
                    diffs.push(entry(DiffAction::Changed, name, old, new));
                }
                Some(_) => {}
            }
        }
        for name in other.fields.keys() {
            if !self.fields.contains_key(name) {
                diffs.push(entry(DiffAction::Removed, name, String::new(), render(other, name)));
            }
        }
        diffs
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    /// Returns the form input prefix used for this container's fields.
    pub fn form_prefix(&self) -> String {
        format!("{}_{}_", self.class_name, self.number)
    }

    /// Renders one declared field in the given mode, prefixed with
    /// [`Container::form_prefix`]. Empty when the class or field is unknown.
    pub fn display(&self, name: &str, mode: DisplayMode, ctx: &Context<'_>) -> String {
        let Some(class) = self.class_definition(ctx) else {
            return String::new();
        };
        match class.field(name) {
            Some(field) => field.display(mode, name, &self.form_prefix(), self, ctx),
            None => String::new(),
        }
    }

    // =========================================================================
    // XML
    // =========================================================================

    /// Encodes the container as an `<object>` element tree.
    pub fn to_xml(&self) -> XmlElement {
        crate::codec::object::encode_object(self)
    }

    /// Serializes the container as an indented XML document.
    ///
    /// Returns an empty string if the writer fails.
    pub fn to_xml_string(&self) -> String {
        match self.to_xml_string_with(&XmlOptions::default()) {
            Ok(xml) => xml,
            Err(err) => {
                warn!(class = %self.class_name, error = %err, "failed to serialize object");
                String::new()
            }
        }
    }

    /// Serializes the container with explicit writer options.
    pub fn to_xml_string_with(&self, options: &XmlOptions) -> Result<String, XmlError> {
        write_document(&self.to_xml(), options)
    }

    /// Decodes a container from an `<object>` element.
    pub fn from_xml(element: &XmlElement, ctx: &Context<'_>) -> Result<Container, XmlError> {
        crate::codec::object::decode_object(element, ctx)
    }

    /// Parses a container from an XML document.
    pub fn from_xml_str(text: &str, ctx: &Context<'_>) -> Result<Container, XmlError> {
        Self::from_xml(&parse_document(text)?, ctx)
    }
}

/// Containers are equal when they have the same class and equal values
/// under the same names. Document name, number and tombstones are ignored.
impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.class_name == other.class_name
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|(name, property)| other.fields.get(name) == Some(property))
    }
}

/// Deep copy with values bound to the copy. Tombstones are not copied.
impl Clone for Container {
    fn clone(&self) -> Self {
        let mut copy = Container {
            class_name: self.class_name.clone(),
            name: self.name.clone(),
            number: self.number,
            fields: IndexMap::with_capacity(self.fields.len()),
            fields_to_remove: Vec::new(),
        };
        let id = copy.id();
        for (name, property) in &self.fields {
            copy.insert_bound(name, property.clone(), id);
        }
        copy
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;
    use crate::schema::{FieldDescriptor, InMemoryRegistry};

    fn registry() -> InMemoryRegistry {
        InMemoryRegistry::new().with_class(
            ClassDefinition::new("Blog.PostClass")
                .with_field(FieldDescriptor::new("title", "Title", FieldType::String))
                .with_field(FieldDescriptor::new("count", "Count", FieldType::Integer))
                .with_field(
                    FieldDescriptor::new("posted", "Posted", FieldType::Date)
                        .with_date_format("%Y-%m-%d"),
                ),
        )
    }

    fn post() -> Container {
        let mut c = Container::new("Blog.PostClass");
        c.set_name("Blog.Hello");
        c.set_string_value("title", "Hello");
        c.set_int_value("count", 3);
        c
    }

    #[test]
    fn test_put_get() {
        let mut c = Container::new("Blog.PostClass");
        let ctx = Context::detached();
        c.put("title", PropertyValue::new("ignored", "Hello"), &ctx).unwrap();
        let stored = c.get("title", &ctx).unwrap().unwrap();
        assert_eq!(stored.name(), "title");
        assert_eq!(stored.owner(), Some(c.id()));
        assert_eq!(stored.value(), &Value::String("Hello".into()));
        assert!(c.get("missing", &ctx).unwrap().is_none());
    }

    #[test]
    fn test_strict_validation() {
        let registry = registry();
        let strict = Context::new(&registry).with_strict_field_validation(true);
        let mut c = post();

        assert_eq!(
            c.put("ghost", PropertyValue::new("ghost", 1), &strict),
            Err(ObjectError::FieldNotDeclared {
                field: "ghost".to_string(),
                class: "Blog.PostClass".to_string()
            })
        );
        assert!(c.get("ghost", &strict).is_err());
        assert!(c.get("title", &strict).unwrap().is_some());

        // Lenient by default.
        let lenient = Context::new(&registry);
        c.put("ghost", PropertyValue::new("ghost", 1), &lenient).unwrap();
        assert_eq!(c.int_value("ghost"), 1);
    }

    #[test]
    fn test_typed_defaults_and_conversions() {
        let mut c = Container::new("C");
        assert_eq!(c.int_value("x"), 0);
        assert_eq!(c.long_value("x"), 0);
        assert_eq!(c.string_value("x"), "");
        assert_eq!(c.date_value("x"), None);
        assert!(c.set_value("x").is_empty());
        assert!(c.object_value("x").is_none());

        c.set_long_value("big", 7);
        c.set_int_value("small", -2);
        c.set_string_value("text", "7");
        assert_eq!(c.int_value("big"), 7);
        assert_eq!(c.long_value("small"), -2);
        assert_eq!(c.int_value("text"), 0);
        assert_eq!(c.string_value("small"), "-2");
        assert_eq!(c.date_value("text"), None);

        c.set_large_string_value("body", "long text");
        assert_eq!(c.large_string_value("body"), "long text");
        c.set_set_value("tags", ["a".to_string()].into_iter().collect());
        assert_eq!(c.string_value("tags"), "");
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut c = post();
        c.set_string_value("title", "Bye");
        assert_eq!(c.field_names().collect::<Vec<_>>(), ["title", "count"]);
        assert_eq!(c.string_value("title"), "Bye");
    }

    #[test]
    fn test_remove_field_tombstones_once() {
        let mut c = post();
        c.remove_field("title");
        c.remove_field("title");
        c.remove_field("never");
        assert!(c.safe_get("title").is_none());
        assert_eq!(c.fields_to_remove().len(), 1);
        assert_eq!(c.fields_to_remove()[0].to_text(), "Hello");

        c.add_property_for_removal(PropertyValue::new("old", 1));
        let taken = c.take_fields_to_remove();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[1].owner(), Some(c.id()));
        assert!(c.fields_to_remove().is_empty());
    }

    #[test]
    fn test_identity_rebinds_owners() {
        let mut c = post();
        let before = c.id();
        c.set_number(4);
        assert_ne!(c.id(), before);
        assert!(c.properties().all(|p| p.owner() == Some(c.id())));
    }

    #[test]
    fn test_equality_ignores_identity() {
        let a = post();
        let mut b = post();
        b.set_name("Other.Page");
        b.set_number(9);
        assert_eq!(a, b);

        b.set_int_value("count", 4);
        assert_ne!(a, b);
        assert_ne!(post(), Container::new("Blog.PostClass"));

        let mut other_class = post();
        other_class.set_class_name("Blog.DraftClass");
        assert_ne!(post(), other_class);
    }

    #[test]
    fn test_clone_is_deep_and_drops_tombstones() {
        let mut nested = Container::new("Inner");
        nested.set_string_value("x", "1");
        let mut c = post();
        c.set_object_value("inner", nested);
        c.remove_field("title");

        let mut copy = c.clone();
        assert_eq!(copy, c);
        assert!(copy.fields_to_remove().is_empty());
        assert!(copy.properties().all(|p| p.owner() == Some(copy.id())));

        copy.set_int_value("count", 99);
        assert_eq!(c.int_value("count"), 3);
    }

    #[test]
    fn test_merge_never_overwrites() {
        let mut a = post();
        let mut b = Container::new("Blog.PostClass");
        b.set_string_value("title", "Other");
        b.set_string_value("tag", "x");

        a.merge(&b);
        assert_eq!(a.string_value("title"), "Hello");
        assert_eq!(a.string_value("tag"), "x");
        assert_eq!(a.safe_get("tag").unwrap().owner(), Some(a.id()));
        assert_eq!(a.field_names().collect::<Vec<_>>(), ["title", "count", "tag"]);
    }

    #[test]
    fn test_diff_labels() {
        let a = post();
        let mut b = post();
        b.set_int_value("count", 5);
        b.set_string_value("tag", "x");
        let mut c = a.clone();
        c.set_string_value("extra", "y");

        let ctx = Context::detached();
        assert!(a.diff(&a, &ctx).is_empty());

        let diffs = a.diff(&b, &ctx);
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].action(), DiffAction::Changed);
        assert_eq!((diffs[0].old_value(), diffs[0].new_value()), ("3", "5"));
        assert_eq!(diffs[1].action(), DiffAction::Removed);
        let removed = &diffs[1];
        assert_eq!(removed.field_name(), "tag");
        assert_eq!((removed.old_value(), removed.new_value()), ("", "x"));

        let diffs = c.diff(&a, &ctx);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].action(), DiffAction::Added);
        assert_eq!((diffs[0].old_value(), diffs[0].new_value()), ("y", ""));
    }

    #[test]
    fn test_diff_renders_through_schema() {
        let registry = registry();
        let ctx = Context::new(&registry);
        let mut a = post();
        let mut b = post();
        a.set_date_value("posted", DateTime::from_timestamp(1_710_460_800, 0).unwrap());
        b.set_date_value("posted", DateTime::from_timestamp(1_710_547_200, 0).unwrap());

        let diffs = a.diff(&b, &ctx);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].old_value(), "2024-03-15");
        assert_eq!(diffs[0].new_value(), "2024-03-16");
        assert_eq!(diffs[0].class_name(), "Blog.PostClass");
    }

    #[test]
    fn test_display_uses_form_prefix() {
        let registry = registry();
        let ctx = Context::new(&registry);
        let c = post();
        assert_eq!(c.form_prefix(), "Blog.PostClass_0_");
        assert_eq!(
            c.display("count", DisplayMode::Hidden, &ctx),
            "<input type=\"hidden\" name=\"Blog.PostClass_0_count\" value=\"3\"/>"
        );
        assert_eq!(c.display("title", DisplayMode::View, &ctx), "Hello");
        assert_eq!(c.display("ghost", DisplayMode::View, &ctx), "");
        assert_eq!(c.display("title", DisplayMode::View, &Context::detached()), "");
    }

    #[test]
    fn test_xml_string_roundtrip() {
        let registry = registry();
        let ctx = Context::new(&registry);
        let c = post();
        let xml = c.to_xml_string();
        assert!(xml.contains("<className>Blog.PostClass</className>"));
        assert_eq!(c.to_string(), xml);

        let back = Container::from_xml_str(&xml, &ctx).unwrap();
        assert_eq!(back, c);
        assert_eq!(back.name(), "Blog.Hello");
        assert!(Container::from_xml_str("<object>", &ctx).is_err());
    }

    #[test]
    fn test_xml_keeps_dates_whatever_the_field_pattern() {
        let registry = InMemoryRegistry::new().with_class(
            ClassDefinition::new("Event.MeetingClass")
                .with_field(
                    FieldDescriptor::new("starts", "Starts", FieldType::Date)
                        .with_date_format("%m/%d/%Y %H:%M:%S"),
                )
                .with_field(
                    FieldDescriptor::new("ends", "Ends", FieldType::Date)
                        .with_date_format("%Y-%m-%d %H:%M"),
                ),
        );
        let ctx = Context::new(&registry);

        let mut c = Container::new("Event.MeetingClass");
        // 2024-03-05T14:30:00Z, day and month both valid either way round.
        c.set_date_value("starts", DateTime::from_timestamp(1_709_649_000, 0).unwrap());
        c.set_date_value("ends", DateTime::from_timestamp(1_710_513_000, 250_000_000).unwrap());

        let xml = c.to_xml_string();
        assert!(xml.contains("<starts>2024-03-05T14:30:00Z</starts>"));
        assert!(xml.contains("<ends>2024-03-15T14:30:00.250Z</ends>"));

        let back = Container::from_xml_str(&xml, &ctx).unwrap();
        assert_eq!(back.date_value("starts"), c.date_value("starts"));
        assert_eq!(back.date_value("ends"), c.date_value("ends"));
        assert_eq!(back, c);
    }

    #[test]
    fn test_clone_and_merge_bind_one_owner() {
        let mut a = post();
        a.set_number(3);
        let copy = a.clone();
        assert!(copy.properties().all(|p| p.owner() == Some(a.id())));

        let mut b = Container::new("Blog.PostClass");
        b.set_string_value("tag", "x");
        b.set_string_value("extra", "y");
        a.merge(&b);
        assert!(a.properties().all(|p| p.owner() == Some(a.id())));
    }
}
