//! Stable identifiers for containers.
//!
//! A container is identified by its class, its owning document and its
//! sequence number. Property values point back at their container through
//! this identifier rather than through a reference.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A 16-byte UUID identifier.
pub type Id = [u8; 16];

/// The zero/nil UUID.
pub const NIL_ID: Id = [0u8; 16];

/// Domain separator prefix for container identity derivation.
const CONTAINER_PREFIX: &[u8] = b"wiki-objects:container:";

/// Derives a UUIDv8 from input bytes using SHA-256.
///
/// ```text
/// hash = SHA-256(input_bytes)[0:16]
/// hash[6] = (hash[6] & 0x0F) | 0x80  // version 8
/// hash[8] = (hash[8] & 0x3F) | 0x80  // RFC 4122 variant
/// ```
pub fn derived_uuid(input: &[u8]) -> Id {
    let hash = Sha256::digest(input);
    let mut id = [0u8; 16];
    id.copy_from_slice(&hash[..16]);

    id[6] = (id[6] & 0x0F) | 0x80;
    id[8] = (id[8] & 0x3F) | 0x80;

    id
}

/// Derives the identity of a container.
///
/// ```text
/// id = derived_uuid("wiki-objects:container:" || class || 0x00 || document || 0x00 || number_be)
/// ```
///
/// The NUL separators keep `("ab", "c")` and `("a", "bc")` apart.
pub fn container_id(class_name: &str, document: &str, number: i32) -> Id {
    let mut input = Vec::with_capacity(
        CONTAINER_PREFIX.len() + class_name.len() + document.len() + 6,
    );
    input.extend_from_slice(CONTAINER_PREFIX);
    input.extend_from_slice(class_name.as_bytes());
    input.push(0);
    input.extend_from_slice(document.as_bytes());
    input.push(0);
    input.extend_from_slice(&number.to_be_bytes());
    derived_uuid(&input)
}

/// Formats an identifier as a hyphenated lowercase UUID.
pub fn format_id(id: &Id) -> String {
    Uuid::from_bytes(*id).hyphenated().to_string()
}

/// Parses an identifier from a UUID string (with or without hyphens).
pub fn parse_id(s: &str) -> Option<Id> {
    Uuid::parse_str(s).ok().map(|uuid| *uuid.as_bytes())
}
