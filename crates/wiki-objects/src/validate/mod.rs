//! Schema validation for containers.
//!
//! Containers accept any field name by default. Validation against the
//! class schema is opt-in: [`check_field`] only rejects names when the
//! context enables strict field validation, and [`validate_object`] is run
//! explicitly by callers that want to audit a whole container.
//!
//! **Note:** Both checks are skipped when the class cannot be resolved, so a
//! missing or failing registry never makes a container unusable.

use crate::context::Context;
use crate::error::ObjectError;
use crate::model::Container;

/// Checks that `name` is declared by the container's class.
///
/// A no-op unless `ctx` has strict field validation enabled.
pub fn check_field(object: &Container, name: &str, ctx: &Context<'_>) -> Result<(), ObjectError> {
    if !ctx.strict_field_validation() {
        return Ok(());
    }
    let Some(class) = object.class_definition(ctx) else {
        return Ok(());
    };
    if class.field(name).is_none() {
        return Err(ObjectError::FieldNotDeclared {
            field: name.to_string(),
            class: object.class_name().to_string(),
        });
    }
    Ok(())
}

/// Validates every field of a container against its class.
///
/// This checks, regardless of the strictness flag:
/// - Every field is declared by the class
/// - Every value has the type the class declares for it
pub fn validate_object(object: &Container, ctx: &Context<'_>) -> Result<(), ObjectError> {
    let Some(class) = object.class_definition(ctx) else {
        return Ok(());
    };
    for property in object.properties() {
        let Some(field) = class.field(property.name()) else {
            return Err(ObjectError::FieldNotDeclared {
                field: property.name().to_string(),
                class: object.class_name().to_string(),
            });
        };
        let found = property.value().field_type();
        if found != field.field_type() {
            return Err(ObjectError::TypeMismatch {
                field: property.name().to_string(),
                expected: field.field_type(),
                found,
            });
        }
    }
    Ok(())
}
