//! Field-level differences between two containers.

use std::fmt;

/// Kind of change recorded for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffAction {
    /// The field exists only on the container `diff` was called on.
    Added,
    /// The field exists on both sides with different values.
    Changed,
    /// The field exists only on the other container.
    Removed,
}

impl DiffAction {
    pub fn as_str(self) -> &'static str {
        match self {
            DiffAction::Added => "added",
            DiffAction::Changed => "changed",
            DiffAction::Removed => "removed",
        }
    }
}

impl fmt::Display for DiffAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field-level difference produced by [`Container::diff`](crate::model::Container::diff).
///
/// Values are the rendered, human-readable text of each side; an absent side
/// is the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDiff {
    class_name: String,
    number: i32,
    action: DiffAction,
    field_name: String,
    old_value: String,
    new_value: String,
}

impl ObjectDiff {
    pub fn new(
        class_name: impl Into<String>,
        number: i32,
        action: DiffAction,
        field_name: impl Into<String>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            number,
            action,
            field_name: field_name.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn action(&self) -> DiffAction {
        self.action
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn old_value(&self) -> &str {
        &self.old_value
    }

    pub fn new_value(&self) -> &str {
        &self.new_value
    }
}

impl fmt::Display for ObjectDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}].{} {}: {:?} -> {:?}",
            self.class_name,
            self.number,
            self.field_name,
            self.action,
            self.old_value,
            self.new_value
        )
    }
}
