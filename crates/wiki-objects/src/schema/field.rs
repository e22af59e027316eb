//! Field definitions: how one field of a class is typed, parsed and rendered.

use std::fmt;

use crate::codec::xml::XmlElement;
use crate::context::Context;
use crate::model::{Container, FieldType, PropertyValue, Value};
use crate::schema::behavior::behavior;
use crate::util::datetime::DEFAULT_DATE_FORMAT;

const DEFAULT_SIZE: usize = 30;
const DEFAULT_ROWS: usize = 5;
const DEFAULT_COLS: usize = 40;
const DEFAULT_SEPARATORS: &str = "|";

/// How a field is presented in a generated page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    /// Stored form value with no visible affordance, for round-tripping forms.
    Hidden,
    /// Editable input used to build a query filter.
    Search,
    /// Read-only text.
    View,
    /// Editable widget.
    Edit,
}

impl DisplayMode {
    /// Returns the lowercase mode name.
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Hidden => "hidden",
            DisplayMode::Search => "search",
            DisplayMode::View => "view",
            DisplayMode::Edit => "edit",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Definition of one field of a class.
///
/// The [`FieldType`] is fixed at construction; there is no way to change it
/// afterwards. Type-specific behavior (parsing, rendering, XML) is looked up
/// from the type tag.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    pretty_name: String,
    field_type: FieldType,
    pub(crate) number: i32,
    unmodifiable: bool,
    size: usize,
    rows: usize,
    cols: usize,
    date_format: String,
    list_values: Vec<String>,
    separators: String,
    class_name: String,
}

impl FieldDescriptor {
    /// Creates a field definition with default settings.
    pub fn new(
        name: impl Into<String>,
        pretty_name: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            name: name.into(),
            pretty_name: pretty_name.into(),
            field_type,
            number: 0,
            unmodifiable: false,
            size: DEFAULT_SIZE,
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            list_values: Vec::new(),
            separators: DEFAULT_SEPARATORS.to_string(),
            class_name: String::new(),
        }
    }

    /// Sets the width of text inputs.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Sets the dimensions of textarea editors.
    pub fn with_rows_cols(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    /// Sets the strftime-style pattern of date fields.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Sets the values offered by list fields.
    pub fn with_list_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the characters that split a single list form value.
    pub fn with_separators(mut self, separators: impl Into<String>) -> Self {
        self.separators = separators.into();
        self
    }

    /// Sets the class of nested object fields.
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Marks the field as unmodifiable by end users.
    pub fn with_unmodifiable(mut self, unmodifiable: bool) -> Self {
        self.unmodifiable = unmodifiable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pretty_name(&self) -> &str {
        &self.pretty_name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns the type identity written to XML.
    pub fn class_type(&self) -> &'static str {
        self.field_type.class_type()
    }

    /// Returns the 1-based declaration position within the class (0 if unattached).
    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn is_unmodifiable(&self) -> bool {
        self.unmodifiable
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn list_values(&self) -> &[String] {
        &self.list_values
    }

    pub fn separators(&self) -> &str {
        &self.separators
    }

    /// Returns the class of nested objects (empty when unspecified).
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    // =========================================================================
    // PARSING
    // =========================================================================

    /// Parses one submitted text value.
    ///
    /// Returns `None` when the text does not parse, and always for field
    /// types without a textual encoding (nested objects).
    pub fn from_string(&self, text: &str) -> Option<PropertyValue> {
        behavior(self.field_type)
            .from_string(self, text)
            .map(|value| self.from_value(value))
    }

    /// Parses a multi-valued submission.
    ///
    /// Single-valued types use the first element; list fields use all of them.
    pub fn from_string_array<S: AsRef<str>>(&self, values: &[S]) -> Option<PropertyValue> {
        let values: Vec<&str> = values.iter().map(AsRef::as_ref).collect();
        behavior(self.field_type)
            .from_string_array(self, &values)
            .map(|value| self.from_value(value))
    }

    /// Parses a value from its XML element.
    pub fn new_property_from_xml(
        &self,
        element: &XmlElement,
        ctx: &Context<'_>,
    ) -> Option<PropertyValue> {
        behavior(self.field_type)
            .from_xml(self, element, ctx)
            .map(|value| self.from_value(value))
    }

    /// Wraps a raw value as a property named after this field.
    pub fn from_value(&self, value: impl Into<Value>) -> PropertyValue {
        PropertyValue::new(self.name.clone(), value)
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    /// Renders the field `name` of `object` into `buf`.
    ///
    /// `prefix` is prepended to form input names so several objects can share
    /// one page.
    pub fn display_into(
        &self,
        mode: DisplayMode,
        buf: &mut String,
        name: &str,
        prefix: &str,
        object: &Container,
        ctx: &Context<'_>,
    ) {
        let b = behavior(self.field_type);
        match mode {
            DisplayMode::Hidden => b.display_hidden(buf, self, name, prefix, object, ctx),
            DisplayMode::Search => b.display_search(buf, self, name, prefix, object, ctx),
            DisplayMode::View => b.display_view(buf, self, name, prefix, object, ctx),
            DisplayMode::Edit => b.display_edit(buf, self, name, prefix, object, ctx),
        }
    }

    /// Renders the field `name` of `object` into a new string.
    pub fn display(
        &self,
        mode: DisplayMode,
        name: &str,
        prefix: &str,
        object: &Container,
        ctx: &Context<'_>,
    ) -> String {
        let mut buf = String::new();
        self.display_into(mode, &mut buf, name, prefix, object, ctx);
        buf
    }

    pub fn display_hidden_into(
        &self,
        buf: &mut String,
        name: &str,
        prefix: &str,
        object: &Container,
        ctx: &Context<'_>,
    ) {
        self.display_into(DisplayMode::Hidden, buf, name, prefix, object, ctx);
    }

    pub fn display_hidden(
        &self,
        name: &str,
        prefix: &str,
        object: &Container,
        ctx: &Context<'_>,
    ) -> String {
        self.display(DisplayMode::Hidden, name, prefix, object, ctx)
    }

    pub fn display_search_into(
        &self,
        buf: &mut String,
        name: &str,
        prefix: &str,
        object: &Container,
        ctx: &Context<'_>,
    ) {
        self.display_into(DisplayMode::Search, buf, name, prefix, object, ctx);
    }

    pub fn display_search(
        &self,
        name: &str,
        prefix: &str,
        object: &Container,
        ctx: &Context<'_>,
    ) -> String {
        self.display(DisplayMode::Search, name, prefix, object, ctx)
    }

    pub fn display_view_into(
        &self,
        buf: &mut String,
        name: &str,
        prefix: &str,
        object: &Container,
        ctx: &Context<'_>,
    ) {
        self.display_into(DisplayMode::View, buf, name, prefix, object, ctx);
    }

    pub fn display_view(
        &self,
        name: &str,
        prefix: &str,
        object: &Container,
        ctx: &Context<'_>,
    ) -> String {
        self.display(DisplayMode::View, name, prefix, object, ctx)
    }

    pub fn display_edit_into(
        &self,
        buf: &mut String,
        name: &str,
        prefix: &str,
        object: &Container,
        ctx: &Context<'_>,
    ) {
        self.display_into(DisplayMode::Edit, buf, name, prefix, object, ctx);
    }

    pub fn display_edit(
        &self,
        name: &str,
        prefix: &str,
        object: &Container,
        ctx: &Context<'_>,
    ) -> String {
        self.display(DisplayMode::Edit, name, prefix, object, ctx)
    }

    // =========================================================================
    // XML
    // =========================================================================

    /// Encodes the definition as an element named after the field, ending
    /// with a `<classType>` element.
    pub fn to_xml(&self) -> XmlElement {
        crate::codec::class::encode_field(self)
    }

    /// Decodes a definition encoded by [`FieldDescriptor::to_xml`].
    pub fn from_xml(element: &XmlElement) -> Result<Self, crate::error::XmlError> {
        crate::codec::class::decode_field(element)
    }
}
