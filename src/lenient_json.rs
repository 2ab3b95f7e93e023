//! Lenient parsing of near-JSON produced by language models.
//!
//! Strict `serde_json` parsing is tried first. On failure three textual
//! fixups are applied in order, and strict parsing is retried once:
//!
//! 1. bare identifier keys are wrapped in double quotes (`{a: 1}` → `{"a": 1}`)
//! 2. every single quote becomes a double quote
//! 3. trailing commas before `}` or `]` are removed
//!
//! Fixup 2 is global and will corrupt string content that legitimately
//! contains an apostrophe (`{"t": "it's"}` is already valid and never
//! reaches it, but `{t: 'it's'}` cannot be recovered). It is a best-effort
//! heuristic, not a correctness-preserving transform.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Outcome of a lenient parse.
#[derive(Debug, Clone, PartialEq)]
pub struct LenientJson {
    /// Parsed value on success; the untouched input otherwise
    pub value: Value,
    /// Parsing (with or without fixups) produced a value
    pub success: bool,
}

impl LenientJson {
    fn ok(value: Value) -> Self {
        Self {
            value,
            success: true,
        }
    }

    fn failed(original: &str) -> Self {
        Self {
            value: Value::String(original.to_string()),
            success: false,
        }
    }

    /// The parsed value if parsing succeeded.
    #[must_use]
    pub fn into_parsed(self) -> Option<Value> {
        self.success.then_some(self.value)
    }
}

/// Parse `input` leniently.
///
/// Non-string values are already structured and pass through with
/// `success = true`. Strings are parsed with [`parse_lenient_str`].
#[must_use]
pub fn parse_lenient(input: &Value) -> LenientJson {
    match input {
        Value::String(s) => parse_lenient_str(s),
        other => LenientJson::ok(other.clone()),
    }
}

/// Parse a string that should be JSON but may be near-JSON.
///
/// Never panics. On failure the original string is returned unchanged.
#[must_use]
pub fn parse_lenient_str(input: &str) -> LenientJson {
    if let Ok(value) = serde_json::from_str::<Value>(input) {
        return LenientJson::ok(value);
    }

    let fixed = apply_fixups(input);
    match serde_json::from_str::<Value>(&fixed) {
        Ok(value) => LenientJson::ok(value),
        Err(e) => {
            tracing::debug!(error = %e, "Lenient JSON parse failed after fixups");
            LenientJson::failed(input)
        }
    }
}

fn bare_key_re() -> &'static Regex {
    static BARE_KEY_RE: OnceLock<Regex> = OnceLock::new();
    BARE_KEY_RE.get_or_init(|| {
        Regex::new(r"([{,]\s*)([A-Za-z_$][A-Za-z0-9_$]*)(\s*:)").expect("static regex")
    })
}

fn trailing_comma_re() -> &'static Regex {
    static TRAILING_COMMA_RE: OnceLock<Regex> = OnceLock::new();
    TRAILING_COMMA_RE.get_or_init(|| Regex::new(r",(\s*[}\]])").expect("static regex"))
}

fn apply_fixups(input: &str) -> String {
    let quoted_keys = bare_key_re().replace_all(input, r#"${1}"${2}"${3}"#);
    let double_quoted = quoted_keys.replace('\'', "\"");
    trailing_comma_re()
        .replace_all(&double_quoted, "${1}")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn strict_json_parses_unchanged() {
        let out = parse_lenient_str(r#"{"a": [1, 2], "b": "it's"}"#);
        assert!(out.success);
        assert_eq!(out.value, json!({ "a": [1, 2], "b": "it's" }));
    }

    #[test]
    fn model_style_object_is_repaired() {
        // GIVEN: unquoted key, single quotes and a trailing comma
        let out = parse_lenient_str("{name: 'bob', age: 30,}");

        // THEN: all three fixups combine into valid JSON
        assert!(out.success);
        assert_eq!(out.value, json!({ "name": "bob", "age": 30 }));
    }

    #[test]
    fn trailing_comma_in_array_is_removed() {
        let out = parse_lenient_str("[1, 2, 3, ]");
        assert!(out.success);
        assert_eq!(out.value, json!([1, 2, 3]));
    }

    #[test]
    fn nested_bare_keys_are_quoted() {
        let out = parse_lenient_str("{outer: {inner_key: true}}");
        assert!(out.success);
        assert_eq!(out.value, json!({ "outer": { "inner_key": true } }));
    }

    #[test]
    fn unrecoverable_input_returns_original_string() {
        let out = parse_lenient_str("{this is: not json");
        assert!(!out.success);
        assert_eq!(out.value, json!("{this is: not json"));
        assert!(out.into_parsed().is_none());
    }

    #[test]
    fn apostrophe_inside_single_quoted_string_is_not_recoverable() {
        let out = parse_lenient_str("{t: 'it's'}");
        assert!(!out.success);
    }

    #[test]
    fn non_string_values_pass_through() {
        let out = parse_lenient(&json!([1, 2]));
        assert!(out.success);
        assert_eq!(out.value, json!([1, 2]));

        let out = parse_lenient(&json!(7));
        assert!(out.success);
        assert_eq!(out.value, json!(7));
    }

    #[test]
    fn string_value_is_parsed() {
        let out = parse_lenient(&json!("['a', 'b']"));
        assert!(out.success);
        assert_eq!(out.value, json!(["a", "b"]));
    }
}
