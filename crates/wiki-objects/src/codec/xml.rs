//! Minimal XML element tree on top of `quick-xml`.
//!
//! Objects and classes are (de)serialized through [`XmlElement`], a
//! namespace-free tree of named elements carrying either text or children.
//! Attributes are not used by the format and are ignored on input; namespace
//! prefixes are stripped.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::XmlError;

/// Writer options for XML documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlOptions {
    /// Character repeated for each indentation level.
    pub indent_char: u8,
    /// Number of `indent_char` per level. Zero writes the document on one line.
    pub indent_size: usize,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            indent_char: b' ',
            indent_size: 2,
        }
    }
}

impl XmlOptions {
    /// Creates default options (two-space indentation).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options producing a single-line document.
    pub fn compact() -> Self {
        Self {
            indent_char: b' ',
            indent_size: 0,
        }
    }
}

/// An XML element with text content or child elements.
///
/// Mixed content is not supported: the text of an element that has children
/// is discarded on input and never written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Creates an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Creates a text-only element.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the text content (empty for elements with children).
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// Appends a child element.
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Returns the first child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Returns the text of the first child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(XmlElement::text)
    }

    /// Iterates the children with the given name.
    pub fn children_named<'s>(
        &'s self,
        name: &'s str,
    ) -> impl Iterator<Item = &'s XmlElement> + 's {
        self.children.iter().filter(move |c| c.name == name)
    }
}

// =============================================================================
// WRITING
// =============================================================================

/// Serializes an element as a complete document with an XML declaration.
pub fn write_document(root: &XmlElement, options: &XmlOptions) -> Result<String, XmlError> {
    let mut writer = if options.indent_size == 0 {
        Writer::new(Vec::new())
    } else {
        Writer::new_with_indent(Vec::new(), options.indent_char, options.indent_size)
    };

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_error)?;
    write_element(&mut writer, root)?;

    String::from_utf8(writer.into_inner()).map_err(|_| XmlError::InvalidUtf8 { context: "output" })
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<(), XmlError> {
    writer
        .write_event(Event::Start(BytesStart::new(element.name.as_str())))
        .map_err(write_error)?;

    if element.children.is_empty() {
        // Always emit the text event, even empty, so the end tag stays on the
        // same line and the element reads back with empty text.
        writer
            .write_event(Event::Text(BytesText::new(&element.text)))
            .map_err(write_error)?;
    } else {
        for child in &element.children {
            write_element(writer, child)?;
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(write_error)
}

fn write_error(err: impl std::fmt::Display) -> XmlError {
    XmlError::Write {
        message: err.to_string(),
    }
}

// =============================================================================
// READING
// =============================================================================

/// Parses a document into its root element.
pub fn parse_document(text: &str) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<XmlElement> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|err| XmlError::Malformed {
            message: format!("at byte {}: {}", reader.buffer_position(), err),
        })?;

        match event {
            Event::Start(start) => stack.push(XmlElement::new(local_name(&start)?)),
            Event::Empty(start) => {
                let element = XmlElement::new(local_name(&start)?);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::End(_) => {
                let Some(mut element) = stack.pop() else {
                    return Err(XmlError::Malformed {
                        message: "unbalanced end tag".to_string(),
                    });
                };
                if !element.children.is_empty() {
                    element.text.clear();
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let text = text.unescape().map_err(|err| XmlError::Malformed {
                        message: err.to_string(),
                    })?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    let data = std::str::from_utf8(&data)
                        .map_err(|_| XmlError::InvalidUtf8 { context: "CDATA" })?;
                    current.text.push_str(data);
                }
            }
            Event::Eof => {
                return Err(match stack.last() {
                    Some(open) => XmlError::Malformed {
                        message: format!("unexpected end of document inside <{}>", open.name),
                    },
                    None => XmlError::MissingRoot,
                });
            }
            // Declarations, comments, processing instructions, doctypes.
            _ => {}
        }
    }
}

fn local_name(start: &BytesStart<'_>) -> Result<String, XmlError> {
    std::str::from_utf8(start.local_name().as_ref())
        .map(str::to_string)
        .map_err(|_| XmlError::InvalidUtf8 { context: "element name" })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> XmlElement {
        let mut root = XmlElement::new("object");
        root.push(XmlElement::with_text("className", "Blog.PostClass"));
        let mut tags = XmlElement::new("tags");
        tags.push(XmlElement::with_text("value", "a & b"));
        tags.push(XmlElement::with_text("value", "<c>"));
        root.push(tags);
        root.push(XmlElement::with_text("empty", ""));
        root
    }

    #[test]
    fn test_write_indented() {
        let xml = write_document(&sample(), &XmlOptions::default()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("\n  <className>Blog.PostClass</className>"));
        assert!(xml.contains("<value>a &amp; b</value>"));
        assert!(xml.contains("<empty></empty>"));
    }

    #[test]
    fn test_write_compact() {
        let mut root = XmlElement::new("a");
        root.push(XmlElement::with_text("b", "1"));
        let xml = write_document(&root, &XmlOptions::compact()).unwrap();
        assert_eq!(xml, "<?xml version=\"1.0\" encoding=\"UTF-8\"?><a><b>1</b></a>");
    }

    #[test]
    fn test_parse_written_document() {
        for options in [XmlOptions::default(), XmlOptions::compact()] {
            let xml = write_document(&sample(), &options).unwrap();
            assert_eq!(parse_document(&xml).unwrap(), sample());
        }
    }

    #[test]
    fn test_parse_lenient_input() {
        let xml = r#"<?xml version="1.0"?>
            <!-- exported -->
            <w:object xmlns:w="urn:ignored" id="7">
                <w:title><![CDATA[Fish & Chips]]></w:title>
                <flag/>
            </w:object>"#;
        let root = parse_document(xml).unwrap();
        assert_eq!(root.name(), "object");
        assert_eq!(root.text(), "");
        assert_eq!(root.child_text("title"), Some("Fish & Chips"));
        assert_eq!(root.child_text("flag"), Some(""));
        assert_eq!(root.children_named("title").count(), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_document(""), Err(XmlError::MissingRoot));
        assert_eq!(parse_document("<!-- nothing -->"), Err(XmlError::MissingRoot));
        assert!(matches!(parse_document("<a><b></a>"), Err(XmlError::Malformed { .. })));
        assert!(matches!(parse_document("<a><b>"), Err(XmlError::Malformed { .. })));
    }
}
