//! Class definition XML encoding.
//!
//! A class is a `<class>` element holding its `<name>` followed by one element
//! per field. Each field element is named after the field and ends with a
//! `<classType>` element identifying the field type:
//!
//! ```xml
//! <class>
//!   <name>Blog.PostClass</name>
//!   <title>
//!     <name>title</name>
//!     <prettyName>Title</prettyName>
//!     <number>1</number>
//!     <unmodifiable>0</unmodifiable>
//!     <size>30</size>
//!     <classType>StringClass</classType>
//!   </title>
//! </class>
//! ```

use crate::codec::xml::XmlElement;
use crate::error::XmlError;
use crate::model::FieldType;
use crate::schema::{ClassDefinition, FieldDescriptor};

const CLASS: &str = "class";
const NAME: &str = "name";
const PRETTY_NAME: &str = "prettyName";
const NUMBER: &str = "number";
const UNMODIFIABLE: &str = "unmodifiable";
const SIZE: &str = "size";
const ROWS: &str = "rows";
const COLS: &str = "cols";
const DATE_FORMAT: &str = "dateFormat";
const SEPARATORS: &str = "separators";
const VALUES: &str = "values";
const VALUE: &str = "value";
const CLASS_NAME: &str = "className";
const CLASS_TYPE: &str = "classType";

// =============================================================================
// CLASSES
// =============================================================================

/// Encodes a class definition with its fields in declaration order.
pub fn encode_class(class: &ClassDefinition) -> XmlElement {
    let mut root = XmlElement::new(CLASS);
    root.push(XmlElement::with_text(NAME, class.name()));
    for field in class.fields() {
        root.push(encode_field(field));
    }
    root
}

/// Decodes a class encoded by [`encode_class`].
///
/// Field elements are recognized by their `<classType>` child, so a field
/// may itself be called `name`. Fields are declared in `<number>` order.
pub fn decode_class(element: &XmlElement) -> Result<ClassDefinition, XmlError> {
    if element.name() != CLASS {
        return Err(XmlError::UnexpectedElement {
            expected: CLASS,
            found: element.name().to_string(),
        });
    }

    let name = element
        .children()
        .iter()
        .find(|child| child.name() == NAME && child.children().is_empty())
        .ok_or(XmlError::MissingElement {
            parent: CLASS,
            child: NAME,
        })?;

    let mut fields = element
        .children()
        .iter()
        .filter(|child| child.child(CLASS_TYPE).is_some())
        .map(decode_field)
        .collect::<Result<Vec<_>, _>>()?;
    // Stable: fields without a number keep document order.
    fields.sort_by_key(|field| if field.number() > 0 { field.number() } else { i32::MAX });

    let mut class = ClassDefinition::new(name.text());
    for field in fields {
        class.add_field(field);
    }
    Ok(class)
}

// =============================================================================
// FIELDS
// =============================================================================

/// Encodes one field definition.
///
/// Only the settings meaningful for the field type are written.
pub fn encode_field(field: &FieldDescriptor) -> XmlElement {
    let mut element = XmlElement::new(field.name());
    element.push(XmlElement::with_text(NAME, field.name()));
    element.push(XmlElement::with_text(PRETTY_NAME, field.pretty_name()));
    element.push(XmlElement::with_text(NUMBER, field.number().to_string()));
    element.push(XmlElement::with_text(
        UNMODIFIABLE,
        if field.is_unmodifiable() { "1" } else { "0" },
    ));

    match field.field_type() {
        FieldType::String | FieldType::Integer | FieldType::Long => {
            element.push(XmlElement::with_text(SIZE, field.size().to_string()));
        }
        FieldType::TextArea => {
            element.push(XmlElement::with_text(SIZE, field.size().to_string()));
            element.push(XmlElement::with_text(ROWS, field.rows().to_string()));
            element.push(XmlElement::with_text(COLS, field.cols().to_string()));
        }
        FieldType::Date => {
            element.push(XmlElement::with_text(SIZE, field.size().to_string()));
            element.push(XmlElement::with_text(DATE_FORMAT, field.date_format()));
        }
        FieldType::List => {
            element.push(XmlElement::with_text(SIZE, field.size().to_string()));
            element.push(XmlElement::with_text(SEPARATORS, field.separators()));
            let mut values = XmlElement::new(VALUES);
            for value in field.list_values() {
                values.push(XmlElement::with_text(VALUE, value.as_str()));
            }
            element.push(values);
        }
        FieldType::Object => {
            element.push(XmlElement::with_text(CLASS_NAME, field.class_name()));
        }
    }

    element.push(XmlElement::with_text(CLASS_TYPE, field.class_type()));
    element
}

/// Decodes a field encoded by [`encode_field`].
///
/// Missing settings take their defaults. The returned field keeps the
/// encoded number until it is added to a class.
pub fn decode_field(element: &XmlElement) -> Result<FieldDescriptor, XmlError> {
    let name = match element.child_text(NAME) {
        Some(name) if !name.is_empty() => name,
        _ => element.name(),
    };

    let class_type = element.child_text(CLASS_TYPE).ok_or(XmlError::MissingElement {
        parent: "field",
        child: CLASS_TYPE,
    })?;
    let field_type =
        FieldType::from_class_type(class_type.trim()).ok_or_else(|| XmlError::UnknownClassType {
            field: name.to_string(),
            class_type: class_type.to_string(),
        })?;

    let pretty_name = element.child_text(PRETTY_NAME).unwrap_or(name);
    let mut field = FieldDescriptor::new(name, pretty_name, field_type);

    if let Some(number) = parse_number::<i32>(element, NUMBER)? {
        field.number = number;
    }
    if let Some(flag) = element.child_text(UNMODIFIABLE) {
        field = field.with_unmodifiable(matches!(flag.trim(), "1" | "true"));
    }
    if let Some(size) = parse_number(element, SIZE)? {
        field = field.with_size(size);
    }
    let rows = parse_number(element, ROWS)?;
    let cols = parse_number(element, COLS)?;
    if rows.is_some() || cols.is_some() {
        let rows = rows.unwrap_or(field.rows());
        let cols = cols.unwrap_or(field.cols());
        field = field.with_rows_cols(rows, cols);
    }
    if let Some(format) = element.child_text(DATE_FORMAT).filter(|f| !f.is_empty()) {
        field = field.with_date_format(format);
    }
    if let Some(separators) = element.child_text(SEPARATORS).filter(|s| !s.is_empty()) {
        field = field.with_separators(separators);
    }
    if let Some(values) = element.child(VALUES) {
        field = field.with_list_values(values.children_named(VALUE).map(XmlElement::text));
    }
    if let Some(class_name) = element.child_text(CLASS_NAME) {
        field = field.with_class_name(class_name);
    }
    Ok(field)
}

fn parse_number<T: std::str::FromStr>(
    element: &XmlElement,
    child: &'static str,
) -> Result<Option<T>, XmlError> {
    let Some(text) = element.child_text(child) else {
        return Ok(None);
    };
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse().map(Some).map_err(|_| XmlError::InvalidNumber {
        element: child,
        value: text.to_string(),
    })
}
