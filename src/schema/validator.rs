//! Structural validation of tool arguments against a parameter schema.
//!
//! Two checks, in order:
//!
//! 1. **Required parameters**: every name under `required` must be present
//!    and non-null.
//! 2. **Declared types**: every present, non-null argument whose property
//!    declares one of `string`, `number`, `integer`, `boolean`, `array` or
//!    `object` must hold a value of that type.
//!
//! Unknown argument keys are accepted. Nothing here mutates the arguments;
//! coercion lives in [`super::coerce`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Primitive JSON Schema types the validator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// `string`
    String,
    /// `number` (any JSON number)
    Number,
    /// `integer` (a number with no fractional part)
    Integer,
    /// `boolean`
    Boolean,
    /// `array`
    Array,
    /// `object`
    Object,
}

impl PrimitiveType {
    /// Parse a JSON Schema type name. Unknown names (including `null`)
    /// yield `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    /// JSON Schema name of this type.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Whether `value` is an instance of this type.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => is_integral(value),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn is_integral(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => true,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0),
        _ => false,
    }
}

/// Declared shape of one parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PropertySchema {
    /// Declared type; `None` when absent or not understood
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PrimitiveType>,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertySchema {
    /// A property of the given type.
    #[must_use]
    pub fn of(kind: PrimitiveType) -> Self {
        Self {
            kind: Some(kind),
            description: None,
        }
    }

    fn from_value(value: &Value) -> Self {
        // `type` may be a single name or a list such as ["string", "null"];
        // the first understood name is used.
        let kind = match value.get("type") {
            Some(Value::String(name)) => PrimitiveType::parse(name),
            Some(Value::Array(names)) => names
                .iter()
                .filter_map(Value::as_str)
                .find_map(PrimitiveType::parse),
            _ => None,
        };
        let description = value
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self { kind, description }
    }
}

/// JSON-Schema-like description of a tool's argument object.
///
/// Deserializes from any JSON Schema object; only `properties[*].type`,
/// `properties[*].description` and `required` are read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct ParameterSchema {
    /// Declared parameters by name
    pub properties: BTreeMap<String, PropertySchema>,
    /// Parameters that must be present and non-null
    pub required: Vec<String>,
}

impl ParameterSchema {
    /// Start an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a typed property.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, kind: PrimitiveType) -> Self {
        self.properties.insert(name.into(), PropertySchema::of(kind));
        self
    }

    /// Mark a property as required.
    #[must_use]
    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Read a schema from a JSON value.
    ///
    /// `null` and `{}` are accepted as "no constraints".
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the schema, its
    /// `properties` or its `required` list has the wrong shape.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let schema = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            other => return Err(format!("schema must be an object, got {}", json_type_name(other))),
        };

        let properties = match schema.get("properties") {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(Value::Object(props)) => props
                .iter()
                .map(|(name, prop)| (name.clone(), PropertySchema::from_value(prop)))
                .collect(),
            Some(other) => {
                return Err(format!(
                    "schema 'properties' must be an object, got {}",
                    json_type_name(other)
                ));
            }
        };

        let required = match schema.get("required") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(names)) => names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(other) => {
                return Err(format!(
                    "schema 'required' must be an array, got {}",
                    json_type_name(other)
                ));
            }
        };

        Ok(Self {
            properties,
            required,
        })
    }

    /// Declared type of `name`, if any.
    #[must_use]
    pub fn declared_type(&self, name: &str) -> Option<PrimitiveType> {
        self.properties.get(name).and_then(|p| p.kind)
    }
}

impl TryFrom<Value> for ParameterSchema {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

/// A single validation violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolation {
    /// Parameter name that caused the violation
    pub param: String,
    /// Human-readable description of the problem
    pub message: String,
}

impl ValidationViolation {
    fn new(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.param, self.message)
    }
}

/// Validate `arguments` against `schema`.
///
/// Returns every violation found; empty means valid.
#[must_use]
pub fn validate_arguments(
    arguments: &Map<String, Value>,
    schema: &ParameterSchema,
) -> Vec<ValidationViolation> {
    let mut violations = Vec::new();

    for name in &schema.required {
        match arguments.get(name) {
            None => violations.push(ValidationViolation::new(
                name,
                "required parameter is missing",
            )),
            Some(Value::Null) => violations.push(ValidationViolation::new(
                name,
                "required parameter must not be null",
            )),
            Some(_) => {}
        }
    }

    for (name, property) in &schema.properties {
        let Some(kind) = property.kind else {
            continue;
        };
        let Some(value) = arguments.get(name) else {
            continue;
        };
        if value.is_null() || kind.matches(value) {
            continue;
        }
        violations.push(ValidationViolation::new(
            name,
            format!("expected {kind}, got {}", json_type_name(value)),
        ));
    }

    violations
}

/// Join violations into a single line.
#[must_use]
pub fn format_errors<T: fmt::Display>(violations: &[T]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// JSON type name of a value, for messages.
#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
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

    fn schema(value: Value) -> ParameterSchema {
        ParameterSchema::from_value(&value).unwrap()
    }

    // ── Schema parsing ──────────────────────────────────────────────────────

    #[test]
    fn schema_reads_types_and_required() {
        let s = schema(json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "search text" },
                "limit": { "type": "integer" },
                "mode": { "enum": ["a", "b"] }
            },
            "required": ["query"]
        }));

        assert_eq!(s.declared_type("query"), Some(PrimitiveType::String));
        assert_eq!(s.declared_type("limit"), Some(PrimitiveType::Integer));
        assert_eq!(s.declared_type("mode"), None);
        assert_eq!(s.required, vec!["query".to_string()]);
        assert_eq!(
            s.properties["query"].description.as_deref(),
            Some("search text")
        );
    }

    #[test]
    fn nullable_type_list_uses_first_understood_type() {
        let s = schema(json!({ "properties": { "tag": { "type": ["null", "string"] } } }));
        assert_eq!(s.declared_type("tag"), Some(PrimitiveType::String));
    }

    #[test]
    fn null_schema_has_no_constraints() {
        let s = schema(Value::Null);
        assert!(s.properties.is_empty());
        assert!(s.required.is_empty());
    }

    #[test]
    fn malformed_schema_is_rejected() {
        assert!(ParameterSchema::from_value(&json!("string")).is_err());
        assert!(ParameterSchema::from_value(&json!({ "properties": [] })).is_err());
        assert!(ParameterSchema::from_value(&json!({ "required": "x" })).is_err());
    }

    #[test]
    fn schema_deserializes_through_serde() {
        let s: ParameterSchema =
            serde_json::from_value(json!({ "properties": { "n": { "type": "number" } } }))
                .unwrap();
        assert_eq!(s.declared_type("n"), Some(PrimitiveType::Number));
    }

    // ── Required parameters ─────────────────────────────────────────────────

    #[test]
    fn required_param_missing_produces_violation() {
        // GIVEN: schema requiring "query", WHEN: args are empty
        let s = ParameterSchema::new()
            .property("query", PrimitiveType::String)
            .require("query");
        let violations = validate_arguments(&Map::new(), &s);

        // THEN: violation for missing required param
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].param, "query");
        assert!(violations[0].message.contains("missing"));
    }

    #[test]
    fn required_param_null_produces_violation() {
        let s = ParameterSchema::new().require("symbol");
        let violations = validate_arguments(&args(json!({ "symbol": null })), &s);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("null"));
    }

    #[test]
    fn optional_null_is_accepted() {
        let s = ParameterSchema::new().property("note", PrimitiveType::String);
        assert!(validate_arguments(&args(json!({ "note": null })), &s).is_empty());
    }

    // ── Types ───────────────────────────────────────────────────────────────

    #[test]
    fn matching_types_pass() {
        let s = ParameterSchema::new()
            .property("s", PrimitiveType::String)
            .property("n", PrimitiveType::Number)
            .property("i", PrimitiveType::Integer)
            .property("b", PrimitiveType::Boolean)
            .property("a", PrimitiveType::Array)
            .property("o", PrimitiveType::Object);
        let a = args(json!({
            "s": "x", "n": 1.5, "i": 3, "b": false, "a": [], "o": {}
        }));
        assert!(validate_arguments(&a, &s).is_empty());
    }

    #[test]
    fn integral_float_counts_as_integer() {
        let s = ParameterSchema::new().property("i", PrimitiveType::Integer);
        assert!(validate_arguments(&args(json!({ "i": 5.0 })), &s).is_empty());
        assert_eq!(validate_arguments(&args(json!({ "i": 5.5 })), &s).len(), 1);
    }

    #[test]
    fn wrong_type_names_field_and_types() {
        let s = ParameterSchema::new().property("count", PrimitiveType::Number);
        let violations = validate_arguments(&args(json!({ "count": "5" })), &s);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].to_string(), "count: expected number, got string");
    }

    #[test]
    fn unknown_keys_are_accepted() {
        let s = ParameterSchema::new().property("q", PrimitiveType::String);
        assert!(validate_arguments(&args(json!({ "q": "x", "extra": 1 })), &s).is_empty());
    }

    #[test]
    fn untyped_property_is_not_checked() {
        let s = schema(json!({ "properties": { "any": {} } }));
        assert!(validate_arguments(&args(json!({ "any": [1] })), &s).is_empty());
    }

    #[test]
    fn required_violations_precede_type_violations() {
        let s = ParameterSchema::new()
            .property("a", PrimitiveType::Boolean)
            .require("z");
        let violations = validate_arguments(&args(json!({ "a": "maybe" })), &s);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].param, "z");
        assert_eq!(violations[1].param, "a");
    }

    // ── Formatting ──────────────────────────────────────────────────────────

    #[test]
    fn format_errors_joins_with_semicolons() {
        let violations = vec![
            ValidationViolation::new("a", "x"),
            ValidationViolation::new("b", "y"),
        ];
        assert_eq!(format_errors(&violations), "a: x; b: y");
    }
}
