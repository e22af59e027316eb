//! Rendering and validation context.
//!
//! A [`Context`] is what a container consults when it needs its schema: to
//! render fields, to validate field names, or to parse XML. A detached context
//! has no registry; every lookup through it yields `None`.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::schema::{ClassDefinition, SchemaRegistry};

/// Lookup context passed to schema-dependent operations.
#[derive(Clone, Copy, Default)]
pub struct Context<'a> {
    registry: Option<&'a dyn SchemaRegistry>,
    strict_field_validation: bool,
}

impl<'a> Context<'a> {
    /// Creates a context backed by a schema registry.
    pub fn new(registry: &'a dyn SchemaRegistry) -> Self {
        Self {
            registry: Some(registry),
            strict_field_validation: false,
        }
    }

    /// Creates a context with no registry.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Enables or disables strict field validation.
    ///
    /// When enabled, checked container access rejects field names that the
    /// container's class does not declare. Off by default.
    pub fn with_strict_field_validation(mut self, strict: bool) -> Self {
        self.strict_field_validation = strict;
        self
    }

    /// Returns whether strict field validation is enabled.
    pub fn strict_field_validation(&self) -> bool {
        self.strict_field_validation
    }

    /// Returns the registry, if any.
    pub fn registry(&self) -> Option<&'a dyn SchemaRegistry> {
        self.registry
    }

    /// Resolves a class by name.
    ///
    /// Registry failures are logged and reported as "not found".
    pub fn resolve_class(&self, name: &str) -> Option<Arc<ClassDefinition>> {
        let registry = self.registry?;
        if name.is_empty() {
            return None;
        }
        match registry.resolve_class(name) {
            Ok(class) => class,
            Err(err) => {
                warn!(class = name, error = %err, "class lookup failed");
                None
            }
        }
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("has_registry", &self.registry.is_some())
            .field("strict_field_validation", &self.strict_field_validation)
            .finish()
    }
}
