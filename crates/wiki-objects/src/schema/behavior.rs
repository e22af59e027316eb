//! Per-type field behavior, looked up from the [`FieldType`] tag.
//!
//! The trait's provided methods are the generic behavior of a field: no
//! textual parsing, a single text input for editing and searching, and the
//! value's text for viewing. Each field type overrides what differs.

use std::collections::BTreeSet;
use std::sync::Arc;

use lazy_static::lazy_static;
use quick_xml::escape::escape;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::codec::xml::XmlElement;
use crate::context::Context;
use crate::model::{Container, FieldType, PropertyValue, Value};
use crate::schema::{ClassDefinition, DisplayMode, FieldDescriptor};
use crate::util::datetime::{format_date, parse_date, parse_stored_date};

lazy_static! {
    static ref BEHAVIORS: FxHashMap<FieldType, Box<dyn FieldBehavior>> = FieldType::ALL
        .into_iter()
        .map(|t| (t, new_behavior(t)))
        .collect();
}

fn new_behavior(field_type: FieldType) -> Box<dyn FieldBehavior> {
    match field_type {
        FieldType::String => Box::new(StringField),
        FieldType::TextArea => Box::new(TextAreaField),
        FieldType::Integer => Box::new(IntegerField),
        FieldType::Long => Box::new(LongField),
        FieldType::Date => Box::new(DateField),
        FieldType::List => Box::new(ListField),
        FieldType::Object => Box::new(ObjectField),
    }
}

/// Returns the behavior registered for a field type.
pub(crate) fn behavior(field_type: FieldType) -> &'static dyn FieldBehavior {
    BEHAVIORS[&field_type].as_ref()
}

pub(crate) trait FieldBehavior: Send + Sync {
    /// Parses one textual value. Generic fields have no textual encoding.
    fn from_string(&self, field: &FieldDescriptor, text: &str) -> Option<Value> {
        let _ = (field, text);
        None
    }

    fn from_string_array(&self, field: &FieldDescriptor, values: &[&str]) -> Option<Value> {
        values.first().and_then(|text| self.from_string(field, text))
    }

    /// XML and form submissions share one textual encoding.
    fn from_xml(
        &self,
        field: &FieldDescriptor,
        element: &XmlElement,
        ctx: &Context<'_>,
    ) -> Option<Value> {
        let _ = ctx;
        self.from_string(field, element.text())
    }

    /// Text placed in form inputs.
    fn form_value(&self, field: &FieldDescriptor, value: &Value) -> String {
        let _ = field;
        value.to_form_string()
    }

    /// Text shown in view mode.
    fn view_text(&self, field: &FieldDescriptor, value: &Value) -> String {
        let _ = field;
        value.to_text()
    }

    fn display_hidden(
        &self,
        buf: &mut String,
        field: &FieldDescriptor,
        name: &str,
        prefix: &str,
        object: &Container,
        _ctx: &Context<'_>,
    ) {
        let value = stored(object, name).map(|v| self.form_value(field, v));
        push_input(buf, "hidden", &format!("{prefix}{name}"), value.as_deref(), None);
    }

    fn display_search(
        &self,
        buf: &mut String,
        field: &FieldDescriptor,
        name: &str,
        prefix: &str,
        object: &Container,
        _ctx: &Context<'_>,
    ) {
        let value = stored(object, name).map(|v| self.form_value(field, v));
        push_input(buf, "text", &format!("{prefix}{name}"), value.as_deref(), None);
    }

    fn display_view(
        &self,
        buf: &mut String,
        field: &FieldDescriptor,
        name: &str,
        _prefix: &str,
        object: &Container,
        _ctx: &Context<'_>,
    ) {
        if let Some(value) = stored(object, name) {
            buf.push_str(&self.view_text(field, value));
        }
    }

    fn display_edit(
        &self,
        buf: &mut String,
        field: &FieldDescriptor,
        name: &str,
        prefix: &str,
        object: &Container,
        _ctx: &Context<'_>,
    ) {
        let value = stored(object, name).map(|v| self.form_value(field, v));
        push_input(buf, "text", &format!("{prefix}{name}"), value.as_deref(), Some(field.size()));
    }
}

fn stored<'o>(object: &'o Container, name: &str) -> Option<&'o Value> {
    object.safe_get(name).map(PropertyValue::value)
}

fn push_input(buf: &mut String, kind: &str, name: &str, value: Option<&str>, size: Option<usize>) {
    buf.push_str("<input type=\"");
    buf.push_str(kind);
    buf.push_str("\" name=\"");
    buf.push_str(&escape(name));
    buf.push('"');
    if let Some(value) = value {
        buf.push_str(" value=\"");
        buf.push_str(&escape(value));
        buf.push('"');
    }
    if let Some(size) = size {
        buf.push_str(&format!(" size=\"{size}\""));
    }
    buf.push_str("/>");
}

// =============================================================================
// SCALAR FIELDS
// =============================================================================

struct StringField;

impl FieldBehavior for StringField {
    fn from_string(&self, _field: &FieldDescriptor, text: &str) -> Option<Value> {
        Some(Value::String(text.to_string()))
    }
}

struct TextAreaField;

impl FieldBehavior for TextAreaField {
    fn from_string(&self, _field: &FieldDescriptor, text: &str) -> Option<Value> {
        Some(Value::LargeString(text.to_string()))
    }

    fn display_edit(
        &self,
        buf: &mut String,
        field: &FieldDescriptor,
        name: &str,
        prefix: &str,
        object: &Container,
        _ctx: &Context<'_>,
    ) {
        let text = stored(object, name).map(Value::to_text).unwrap_or_default();
        buf.push_str(&format!(
            "<textarea name=\"{}\" rows=\"{}\" cols=\"{}\">{}</textarea>",
            escape(&format!("{prefix}{name}")),
            field.rows(),
            field.cols(),
            escape(&text),
        ));
    }
}

struct IntegerField;

impl FieldBehavior for IntegerField {
    fn from_string(&self, field: &FieldDescriptor, text: &str) -> Option<Value> {
        match text.trim().parse::<i32>() {
            Ok(v) => Some(Value::Integer(v)),
            Err(err) => {
                debug!(field = field.name(), text, error = %err, "not an integer");
                None
            }
        }
    }
}

struct LongField;

impl FieldBehavior for LongField {
    fn from_string(&self, field: &FieldDescriptor, text: &str) -> Option<Value> {
        match text.trim().parse::<i64>() {
            Ok(v) => Some(Value::Long(v)),
            Err(err) => {
                debug!(field = field.name(), text, error = %err, "not a long");
                None
            }
        }
    }
}

struct DateField;

impl FieldBehavior for DateField {
    fn from_string(&self, field: &FieldDescriptor, text: &str) -> Option<Value> {
        let date = parse_date(text, field.date_format());
        if date.is_none() && !text.trim().is_empty() {
            debug!(field = field.name(), text, "not a date");
        }
        date.map(Value::Date)
    }

    /// Stored documents use RFC 3339; the field pattern is only a fallback
    /// for documents written by hand.
    fn from_xml(
        &self,
        field: &FieldDescriptor,
        element: &XmlElement,
        _ctx: &Context<'_>,
    ) -> Option<Value> {
        match parse_stored_date(element.text()) {
            Some(date) => Some(Value::Date(date)),
            None => self.from_string(field, element.text()),
        }
    }

    fn form_value(&self, field: &FieldDescriptor, value: &Value) -> String {
        self.view_text(field, value)
    }

    fn view_text(&self, field: &FieldDescriptor, value: &Value) -> String {
        match value {
            Value::Date(date) => format_date(date, field.date_format()),
            other => other.to_text(),
        }
    }
}

// =============================================================================
// LIST FIELD
// =============================================================================

struct ListField;

impl FieldBehavior for ListField {
    fn from_string(&self, field: &FieldDescriptor, text: &str) -> Option<Value> {
        let separators = field.separators();
        let set: BTreeSet<String> = text
            .split(|c: char| separators.contains(c))
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect();
        Some(Value::StringSet(set))
    }

    fn from_string_array(&self, field: &FieldDescriptor, values: &[&str]) -> Option<Value> {
        if let [single] = values {
            return self.from_string(field, single);
        }
        let set: BTreeSet<String> = values
            .iter()
            .filter(|item| !item.is_empty())
            .map(|item| item.to_string())
            .collect();
        Some(Value::StringSet(set))
    }

    fn from_xml(
        &self,
        field: &FieldDescriptor,
        element: &XmlElement,
        _ctx: &Context<'_>,
    ) -> Option<Value> {
        if element.children().is_empty() {
            return self.from_string(field, element.text());
        }
        let set: BTreeSet<String> = element
            .children_named("value")
            .map(|v| v.text().to_string())
            .collect();
        Some(Value::StringSet(set))
    }

    fn display_edit(
        &self,
        buf: &mut String,
        field: &FieldDescriptor,
        name: &str,
        prefix: &str,
        object: &Container,
        _ctx: &Context<'_>,
    ) {
        let selected = match stored(object, name) {
            Some(Value::StringSet(set)) => Some(set),
            _ => None,
        };

        let mut options: Vec<&str> = field.list_values().iter().map(String::as_str).collect();
        for item in selected.into_iter().flatten() {
            if !options.contains(&item.as_str()) {
                options.push(item);
            }
        }

        buf.push_str(&format!(
            "<select name=\"{}\" multiple=\"multiple\" size=\"{}\">",
            escape(&format!("{prefix}{name}")),
            options.len().max(1)
        ));
        for option in options {
            let is_selected = selected.is_some_and(|set| set.contains(option));
            buf.push_str("<option value=\"");
            buf.push_str(&escape(option));
            buf.push('"');
            if is_selected {
                buf.push_str(" selected=\"selected\"");
            }
            buf.push('>');
            buf.push_str(&escape(option));
            buf.push_str("</option>");
        }
        buf.push_str("</select>");
    }
}

// =============================================================================
// NESTED OBJECT FIELD
// =============================================================================

/// Nested containers have no textual form encoding; `from_string` keeps the
/// generic `None`.
struct ObjectField;

impl ObjectField {
    fn nested_class(
        field: &FieldDescriptor,
        nested: &Container,
        ctx: &Context<'_>,
    ) -> Option<Arc<ClassDefinition>> {
        let class_name = if field.class_name().is_empty() {
            nested.class_name()
        } else {
            field.class_name()
        };
        ctx.resolve_class(class_name)
    }

    /// Renders every declared field of the nested container under `prefix + name + "_"`.
    fn display_nested(
        mode: DisplayMode,
        buf: &mut String,
        field: &FieldDescriptor,
        name: &str,
        prefix: &str,
        object: &Container,
        ctx: &Context<'_>,
    ) {
        let Some(Value::Object(nested)) = stored(object, name) else {
            return;
        };
        let Some(class) = Self::nested_class(field, nested, ctx) else {
            return;
        };
        let prefix = format!("{prefix}{name}_");
        for nested_field in class.fields() {
            nested_field.display_into(mode, buf, nested_field.name(), &prefix, nested, ctx);
        }
    }
}

impl FieldBehavior for ObjectField {
    fn from_xml(
        &self,
        field: &FieldDescriptor,
        element: &XmlElement,
        ctx: &Context<'_>,
    ) -> Option<Value> {
        let nested = element.child("object")?;
        match crate::codec::object::decode_object(nested, ctx) {
            Ok(object) => Some(Value::Object(Box::new(object))),
            Err(err) => {
                debug!(field = field.name(), error = %err, "nested object did not decode");
                None
            }
        }
    }

    fn view_text(&self, _field: &FieldDescriptor, value: &Value) -> String {
        match value {
            Value::Object(nested) => nested
                .properties()
                .map(|p| format!("{}: {}", p.name(), p.to_text()))
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_text(),
        }
    }

    fn display_hidden(
        &self,
        buf: &mut String,
        field: &FieldDescriptor,
        name: &str,
        prefix: &str,
        object: &Container,
        ctx: &Context<'_>,
    ) {
        Self::display_nested(DisplayMode::Hidden, buf, field, name, prefix, object, ctx);
    }

    fn display_edit(
        &self,
        buf: &mut String,
        field: &FieldDescriptor,
        name: &str,
        prefix: &str,
        object: &Container,
        ctx: &Context<'_>,
    ) {
        Self::display_nested(DisplayMode::Edit, buf, field, name, prefix, object, ctx);
    }
}
