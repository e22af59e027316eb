//! Class schemas: the runtime definitions that give containers their fields.
//!
//! A [`ClassDefinition`] lists the [`FieldDescriptor`]s of one class. Class
//! definitions are looked up by name through a [`SchemaRegistry`]; they are
//! built once and shared by every container of the class.

mod behavior;
mod field;

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::codec::xml::{parse_document, write_document, XmlElement, XmlOptions};
use crate::error::{RegistryError, XmlError};
use crate::model::Container;

pub use field::{DisplayMode, FieldDescriptor};

/// Resolves class names to class definitions.
///
/// Implementations front whatever stores the schemas (wiki documents, a
/// database, static tables). `Ok(None)` means the class does not exist;
/// `Err` means the back end failed. Callers in this crate log errors and
/// treat them as `Ok(None)`.
pub trait SchemaRegistry: Send + Sync {
    fn resolve_class(&self, name: &str) -> Result<Option<Arc<ClassDefinition>>, RegistryError>;
}

/// In-memory schema registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    classes: FxHashMap<String, Arc<ClassDefinition>>,
}

impl InMemoryRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class, replacing any class of the same name.
    pub fn register(&mut self, class: ClassDefinition) -> Arc<ClassDefinition> {
        let class = Arc::new(class);
        self.classes.insert(class.name().to_string(), Arc::clone(&class));
        class
    }

    /// Registers a class and returns the registry.
    pub fn with_class(mut self, class: ClassDefinition) -> Self {
        self.register(class);
        self
    }

    /// Returns the number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if no class is registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl SchemaRegistry for InMemoryRegistry {
    fn resolve_class(&self, name: &str) -> Result<Option<Arc<ClassDefinition>>, RegistryError> {
        Ok(self.classes.get(name).cloned())
    }
}

/// The schema of one class: an ordered set of named field definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDefinition {
    name: String,
    fields: IndexMap<String, FieldDescriptor>,
}

impl ClassDefinition {
    /// Creates a class with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Returns the class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a field, numbering it after the fields already declared.
    ///
    /// A field with the same name is replaced in place.
    pub fn add_field(&mut self, mut field: FieldDescriptor) {
        let number = match self.fields.get_index_of(field.name()) {
            Some(index) => index + 1,
            None => self.fields.len() + 1,
        };
        field.number = number as i32;
        self.fields.insert(field.name().to_string(), field);
    }

    /// Adds a field and returns the class.
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.add_field(field);
        self
    }

    /// Looks up a field definition.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Iterates field definitions in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    /// Iterates field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the class declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Creates an empty container of this class.
    pub fn new_object(&self, document: impl Into<String>, number: i32) -> Container {
        let mut object = Container::new(self.name.clone());
        object.set_name(document);
        object.set_number(number);
        object
    }

    /// Reads submitted form values into `object`.
    ///
    /// For each declared field, the values submitted under `prefix + name` are
    /// parsed with [`FieldDescriptor::from_string_array`]. Fields that were
    /// not submitted or do not parse are left untouched.
    pub fn read_form<S: BuildHasher>(
        &self,
        prefix: &str,
        form: &HashMap<String, Vec<String>, S>,
        object: &mut Container,
    ) {
        for field in self.fields.values() {
            let key = format!("{}{}", prefix, field.name());
            let Some(values) = form.get(&key) else {
                continue;
            };
            match field.from_string_array(values.as_slice()) {
                Some(property) => object.safe_put(field.name(), property),
                None => debug!(
                    field = field.name(),
                    "form value did not parse, field left unchanged"
                ),
            }
        }
    }

    /// Encodes the class definition as a `<class>` element tree.
    pub fn to_xml(&self) -> XmlElement {
        crate::codec::class::encode_class(self)
    }

    /// Decodes a class definition from a `<class>` element.
    pub fn from_xml(element: &XmlElement) -> Result<Self, XmlError> {
        crate::codec::class::decode_class(element)
    }

    /// Serializes the class definition to an XML document.
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        self.to_xml_string_with(&XmlOptions::default())
    }

    /// Serializes the class definition with explicit writer options.
    pub fn to_xml_string_with(&self, options: &XmlOptions) -> Result<String, XmlError> {
        write_document(&self.to_xml(), options)
    }

    /// Parses a class definition from an XML document.
    pub fn from_xml_str(text: &str) -> Result<Self, XmlError> {
        Self::from_xml(&parse_document(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldType, Value};

    fn post_class() -> ClassDefinition {
        ClassDefinition::new("Blog.PostClass")
            .with_field(FieldDescriptor::new("title", "Title", FieldType::String))
            .with_field(FieldDescriptor::new("count", "Count", FieldType::Integer))
            .with_field(
                FieldDescriptor::new("tags", "Tags", FieldType::List)
                    .with_list_values(["rust", "wiki", "xml"]),
            )
    }

    #[test]
    fn test_field_numbering() {
        let mut class = post_class();
        assert_eq!(class.field("title").unwrap().number(), 1);
        assert_eq!(class.field("tags").unwrap().number(), 3);

        class.add_field(FieldDescriptor::new("title", "Headline", FieldType::TextArea));
        assert_eq!(class.len(), 3);
        assert_eq!(class.field("title").unwrap().number(), 1);
        assert_eq!(class.field("title").unwrap().pretty_name(), "Headline");
        assert_eq!(class.field_names().collect::<Vec<_>>(), ["title", "count", "tags"]);
    }

    #[test]
    fn test_registry_replaces_class() {
        let mut registry = InMemoryRegistry::new();
        registry.register(post_class());
        registry.register(ClassDefinition::new("Blog.PostClass"));
        assert_eq!(registry.len(), 1);
        let class = registry.resolve_class("Blog.PostClass").unwrap().unwrap();
        assert!(class.is_empty());
        assert!(registry.resolve_class("Nope").unwrap().is_none());
    }

    #[test]
    fn test_new_object() {
        let object = post_class().new_object("Blog.Hello", 2);
        assert_eq!(object.class_name(), "Blog.PostClass");
        assert_eq!(object.name(), "Blog.Hello");
        assert_eq!(object.number(), 2);
        assert!(object.is_empty());
    }

    #[test]
    fn test_class_xml_string_roundtrip() {
        let class = post_class();
        let xml = class.to_xml_string().unwrap();
        assert!(xml.contains("<classType>ListClass</classType>"));
        assert_eq!(ClassDefinition::from_xml_str(&xml).unwrap(), class);
        assert!(ClassDefinition::from_xml_str("<object/>").is_err());
    }

    #[test]
    fn test_read_form() {
        let class = post_class();
        let mut object = class.new_object("Blog.Hello", 0);
        object.set_int_value("count", 1);

        let mut form = HashMap::new();
        form.insert("Blog.PostClass_0_title".to_string(), vec!["Hello".to_string()]);
        form.insert("Blog.PostClass_0_count".to_string(), vec!["many".to_string()]);
        form.insert(
            "Blog.PostClass_0_tags".to_string(),
            vec!["rust".to_string(), "xml".to_string()],
        );

        class.read_form("Blog.PostClass_0_", &form, &mut object);

        assert_eq!(object.string_value("title"), "Hello");
        // Unparseable number leaves the old value.
        assert_eq!(object.int_value("count"), 1);
        assert_eq!(object.set_value("tags").len(), 2);
        assert_eq!(
            object.safe_get("title").map(|p| p.value().clone()),
            Some(Value::String("Hello".into()))
        );
    }
}
