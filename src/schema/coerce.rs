//! Best-effort type coercion toward a schema's declared types.
//!
//! Each declared type maps to one coercion function in [`COERCIONS`]. A
//! function returns `Some(new_value)` only when it actually converted the
//! value; `None` leaves the argument as it was. Values that already match
//! their declared type, and `null`s, are never touched.
//!
//! Coercion says nothing about overall validity: a repaired object must be
//! re-validated before it is trusted.

use serde_json::{Map, Number, Value};

use super::validator::{ParameterSchema, PrimitiveType};
use crate::lenient_json::parse_lenient;

type CoerceFn = fn(&Value) -> Option<Value>;

/// Declared type → coercion function.
const COERCIONS: &[(PrimitiveType, CoerceFn)] = &[
    (PrimitiveType::String, coerce_to_string),
    (PrimitiveType::Number, coerce_to_number),
    (PrimitiveType::Integer, coerce_to_integer),
    (PrimitiveType::Boolean, coerce_to_boolean),
    (PrimitiveType::Array, coerce_to_array),
    (PrimitiveType::Object, coerce_to_object),
];

/// A working copy of arguments after coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct Repair {
    /// Arguments with every successful coercion applied
    pub arguments: Map<String, Value>,
    /// Names of arguments whose value changed, in property order
    pub changed_fields: Vec<String>,
}

impl Repair {
    /// Whether any argument changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.changed_fields.is_empty()
    }
}

/// Coerce one value to `target`.
///
/// Returns `None` when the value already fits, is `null`, or cannot be
/// converted.
#[must_use]
pub fn coerce_value(value: &Value, target: PrimitiveType) -> Option<Value> {
    if value.is_null() || target.matches(value) {
        return None;
    }
    COERCIONS
        .iter()
        .find(|(kind, _)| *kind == target)
        .and_then(|(_, coerce)| coerce(value))
}

/// Coerce every present argument that has a declared type in `schema`.
#[must_use]
pub fn coerce_arguments(arguments: &Map<String, Value>, schema: &ParameterSchema) -> Repair {
    let mut repaired = arguments.clone();
    let mut changed_fields = Vec::new();

    for (name, property) in &schema.properties {
        let Some(target) = property.kind else {
            continue;
        };
        let Some(current) = repaired.get(name) else {
            continue;
        };
        if let Some(coerced) = coerce_value(current, target) {
            repaired.insert(name.clone(), coerced);
            changed_fields.push(name.clone());
        }
    }

    Repair {
        arguments: repaired,
        changed_fields,
    }
}

fn coerce_to_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) | Value::Null => None,
        other => Some(Value::String(other.to_string())),
    }
}

/// Parse a numeric string, preferring an integer representation.
fn parse_number(s: &str) -> Option<Number> {
    let trimmed = s.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(i.into());
    }
    if let Ok(u) = trimmed.parse::<u64>() {
        return Some(u.into());
    }
    trimmed.parse::<f64>().ok().and_then(Number::from_f64)
}

fn coerce_to_number(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => parse_number(s).map(Value::Number),
        _ => None,
    }
}

fn coerce_to_integer(value: &Value) -> Option<Value> {
    let Value::String(s) = value else {
        return None;
    };
    let number = parse_number(s)?;
    if number.is_i64() || number.is_u64() {
        return Some(Value::Number(number));
    }
    // "5.0" → 5; anything with a fractional part stays as it was.
    let f = number.as_f64()?;
    #[allow(clippy::cast_precision_loss)]
    let in_range = f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64;
    if !in_range {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let integral = f as i64;
    Some(Value::Number(integral.into()))
}

fn coerce_to_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(Value::Bool(true)),
            "false" | "0" | "no" => Some(Value::Bool(false)),
            _ => None,
        },
        Value::Number(n) => n.as_f64().map(|f| Value::Bool(f != 0.0)),
        _ => None,
    }
}

fn coerce_to_array(value: &Value) -> Option<Value> {
    let Value::String(s) = value else {
        return None;
    };
    if let Some(parsed @ Value::Array(_)) = parse_lenient(value).into_parsed() {
        return Some(parsed);
    }
    if s.contains(',') {
        let parts = s
            .split(',')
            .map(|part| Value::String(part.trim().to_string()))
            .collect();
        return Some(Value::Array(parts));
    }
    Some(Value::Array(vec![Value::String(s.clone())]))
}

fn coerce_to_object(value: &Value) -> Option<Value> {
    if !value.is_string() {
        return None;
    }
    match parse_lenient(value).into_parsed() {
        Some(parsed @ Value::Object(_)) => Some(parsed),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    // ── Per-type coercion ───────────────────────────────────────────────────

    #[test]
    fn every_type_has_a_coercion() {
        for kind in [
            PrimitiveType::String,
            PrimitiveType::Number,
            PrimitiveType::Integer,
            PrimitiveType::Boolean,
            PrimitiveType::Array,
            PrimitiveType::Object,
        ] {
            assert!(COERCIONS.iter().any(|(k, _)| *k == kind), "missing {kind}");
        }
    }

    #[test]
    fn non_strings_are_stringified() {
        assert_eq!(coerce_value(&json!(42), PrimitiveType::String), Some(json!("42")));
        assert_eq!(coerce_value(&json!(true), PrimitiveType::String), Some(json!("true")));
        assert_eq!(
            coerce_value(&json!([1, 2]), PrimitiveType::String),
            Some(json!("[1,2]"))
        );
    }

    #[test]
    fn numeric_strings_become_numbers() {
        assert_eq!(coerce_value(&json!("5"), PrimitiveType::Number), Some(json!(5)));
        assert_eq!(coerce_value(&json!(" 3.14 "), PrimitiveType::Number), Some(json!(3.14)));
        assert_eq!(coerce_value(&json!("-7"), PrimitiveType::Integer), Some(json!(-7)));
        assert_eq!(coerce_value(&json!("5.0"), PrimitiveType::Integer), Some(json!(5)));
    }

    #[test]
    fn non_numeric_strings_are_left_alone() {
        assert_eq!(coerce_value(&json!("five"), PrimitiveType::Number), None);
        assert_eq!(coerce_value(&json!("2.5"), PrimitiveType::Integer), None);
        assert_eq!(coerce_value(&json!("NaN"), PrimitiveType::Number), None);
    }

    #[test]
    fn boolean_words_and_numbers() {
        for (input, expected) in [
            ("true", true),
            ("YES", true),
            ("1", true),
            ("False", false),
            ("no", false),
            ("0", false),
        ] {
            assert_eq!(
                coerce_value(&json!(input), PrimitiveType::Boolean),
                Some(json!(expected)),
                "{input}"
            );
        }
        assert_eq!(coerce_value(&json!(3), PrimitiveType::Boolean), Some(json!(true)));
        assert_eq!(coerce_value(&json!(0), PrimitiveType::Boolean), Some(json!(false)));
        assert_eq!(coerce_value(&json!("maybe"), PrimitiveType::Boolean), None);
    }

    #[test]
    fn array_from_json_text() {
        assert_eq!(
            coerce_value(&json!("['a', 'b']"), PrimitiveType::Array),
            Some(json!(["a", "b"]))
        );
    }

    #[test]
    fn array_from_comma_list() {
        assert_eq!(
            coerce_value(&json!("rust, async ,tokio"), PrimitiveType::Array),
            Some(json!(["rust", "async", "tokio"]))
        );
    }

    #[test]
    fn array_wraps_single_string() {
        assert_eq!(
            coerce_value(&json!("solo"), PrimitiveType::Array),
            Some(json!(["solo"]))
        );
    }

    #[test]
    fn object_from_near_json() {
        assert_eq!(
            coerce_value(&json!("{limit: 5,}"), PrimitiveType::Object),
            Some(json!({ "limit": 5 }))
        );
    }

    #[test]
    fn object_requires_object_result() {
        assert_eq!(coerce_value(&json!("[1]"), PrimitiveType::Object), None);
        assert_eq!(coerce_value(&json!("nope"), PrimitiveType::Object), None);
    }

    #[test]
    fn structured_targets_only_parse_strings() {
        assert_eq!(coerce_value(&json!(5), PrimitiveType::Array), None);
        assert_eq!(coerce_value(&json!(true), PrimitiveType::Object), None);
        assert_eq!(
            coerce_value(&json!("{'nested': [1, 2],}"), PrimitiveType::Object),
            Some(json!({ "nested": [1, 2] }))
        );
    }

    #[test]
    fn matching_and_null_values_are_untouched() {
        assert_eq!(coerce_value(&json!("x"), PrimitiveType::String), None);
        assert_eq!(coerce_value(&Value::Null, PrimitiveType::String), None);
        assert_eq!(coerce_value(&json!(5), PrimitiveType::Integer), None);
    }

    // ── Whole-object repair ─────────────────────────────────────────────────

    #[test]
    fn coerce_arguments_reports_changed_fields() {
        let schema = ParameterSchema::new()
            .property("count", PrimitiveType::Number)
            .property("name", PrimitiveType::String)
            .property("tags", PrimitiveType::Array);
        let repair = coerce_arguments(
            &args(json!({ "count": "5", "name": "ok", "tags": "a,b", "other": "1" })),
            &schema,
        );

        assert!(repair.changed());
        assert_eq!(repair.changed_fields, vec!["count".to_string(), "tags".to_string()]);
        assert_eq!(
            Value::Object(repair.arguments),
            json!({ "count": 5, "name": "ok", "tags": ["a", "b"], "other": "1" })
        );
    }

    #[test]
    fn coerce_arguments_without_changes() {
        let schema = ParameterSchema::new().property("count", PrimitiveType::Number);
        let repair = coerce_arguments(&args(json!({ "count": "many" })), &schema);
        assert!(!repair.changed());
        assert_eq!(Value::Object(repair.arguments), json!({ "count": "many" }));
    }
}
