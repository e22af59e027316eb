//! Object XML encoding.
//!
//! ```xml
//! <object>
//!   <className>Blog.PostClass</className>
//!   <name>Blog.Hello</name>
//!   <number>0</number>
//!   <property>
//!     <title>Hello</title>
//!   </property>
//!   <property>
//!     <tags><value>rust</value><value>xml</value></tags>
//!   </property>
//! </object>
//! ```
//!
//! Scalars are written as element text, sets as `<value>` children and nested
//! containers as an `<object>` child. Dates are written as RFC 3339 UTC,
//! independent of the field's display pattern.

use std::collections::BTreeSet;

use tracing::debug;

use crate::codec::xml::XmlElement;
use crate::context::Context;
use crate::error::XmlError;
use crate::model::{Container, PropertyValue, Value};
use crate::util::datetime::format_stored_date;

const OBJECT: &str = "object";
const CLASS_NAME: &str = "className";
const NAME: &str = "name";
const NUMBER: &str = "number";
const PROPERTY: &str = "property";
const SET_ITEM: &str = "value";

/// Encodes a container, its fields in insertion order.
pub fn encode_object(object: &Container) -> XmlElement {
    let mut root = XmlElement::new(OBJECT);
    root.push(XmlElement::with_text(CLASS_NAME, object.class_name()));
    root.push(XmlElement::with_text(NAME, object.name()));
    root.push(XmlElement::with_text(NUMBER, object.number().to_string()));

    for property in object.properties() {
        let mut wrapper = XmlElement::new(PROPERTY);
        wrapper.push(encode_value(property.name(), property.value()));
        root.push(wrapper);
    }
    root
}

fn encode_value(name: &str, value: &Value) -> XmlElement {
    match value {
        Value::StringSet(set) => {
            let mut element = XmlElement::new(name);
            for item in set {
                element.push(XmlElement::with_text(SET_ITEM, item.as_str()));
            }
            element
        }
        Value::Object(nested) => {
            let mut element = XmlElement::new(name);
            element.push(encode_object(nested));
            element
        }
        Value::Date(date) => XmlElement::with_text(name, format_stored_date(date)),
        other => XmlElement::with_text(name, other.to_text()),
    }
}

/// Decodes a container encoded by [`encode_object`].
///
/// When the class resolves through `ctx`, each field is parsed by its
/// declared descriptor and undeclared fields are skipped. Without a schema,
/// values are read back as strings, string sets or nested containers
/// according to the element's shape.
pub fn decode_object(element: &XmlElement, ctx: &Context<'_>) -> Result<Container, XmlError> {
    if element.name() != OBJECT {
        return Err(XmlError::UnexpectedElement {
            expected: OBJECT,
            found: element.name().to_string(),
        });
    }

    let class_name = element.child_text(CLASS_NAME).unwrap_or_default();
    let mut object = Container::new(class_name);
    object.set_name(element.child_text(NAME).unwrap_or_default());
    if let Some(text) = element.child_text(NUMBER) {
        let text = text.trim();
        if !text.is_empty() {
            let number = text.parse::<i32>().map_err(|_| XmlError::InvalidNumber {
                element: NUMBER,
                value: text.to_string(),
            })?;
            object.set_number(number);
        }
    }

    let class = ctx.resolve_class(class_name);
    for wrapper in element.children_named(PROPERTY) {
        for field_element in wrapper.children() {
            let name = field_element.name();
            let property = match &class {
                Some(class) => match class.field(name) {
                    Some(field) => field.new_property_from_xml(field_element, ctx),
                    None => {
                        debug!(
                            class = class_name,
                            field = name,
                            "field not declared by class, skipped"
                        );
                        continue;
                    }
                },
                None => Some(PropertyValue::new(name, decode_untyped(field_element, ctx)?)),
            };
            match property {
                Some(property) => object.safe_put(name, property),
                None => debug!(
                    class = class_name,
                    field = name,
                    "field value did not parse, skipped"
                ),
            }
        }
    }
    Ok(object)
}

fn decode_untyped(element: &XmlElement, ctx: &Context<'_>) -> Result<Value, XmlError> {
    if let Some(nested) = element.child(OBJECT) {
        return Ok(Value::Object(Box::new(decode_object(nested, ctx)?)));
    }
    if element.children().is_empty() {
        return Ok(Value::String(element.text().to_string()));
    }
    let set: BTreeSet<String> = element
        .children_named(SET_ITEM)
        .map(|item| item.text().to_string())
        .collect();
    Ok(Value::StringSet(set))
}
