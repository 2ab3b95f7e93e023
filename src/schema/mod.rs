//! Parameter schemas: structural validation and coercion-based repair.

pub mod coerce;
pub mod validator;

pub use coerce::{Repair, coerce_arguments, coerce_value};
pub use validator::{
    ParameterSchema, PrimitiveType, PropertySchema, ValidationViolation, format_errors,
    json_type_name, validate_arguments,
};
