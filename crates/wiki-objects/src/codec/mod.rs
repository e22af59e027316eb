//! XML encoding and decoding for objects and class definitions.
//!
//! [`xml`] is the format-neutral element tree; [`object`] and [`class`] map
//! containers and schemas onto it.

pub mod class;
pub mod object;
pub mod xml;

pub use class::{decode_class, decode_field, encode_class, encode_field};
pub use object::{decode_object, encode_object};
pub use xml::{parse_document, write_document, XmlElement, XmlOptions};
