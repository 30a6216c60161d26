//! JSON built-in
//!
//! Parsing and serialization with ECMAScript `JSON` semantics:
//! - `parse(text)` / `parse_with_reviver(text, reviver)`
//! - `stringify(value)` / `stringify_pretty(value, indent)` /
//!   `stringify_with_replacer(value, replacer)`
//!
//! Text decoding delegates to `serde_json` (with source key order
//! preserved); the conversion into values, reviver/replacer callbacks,
//! indentation, circular detection, and number formatting are handled here.

use lutra_core::{Classified, CoreError, CoreResult, JsArray, JsObject, JsString, Value, json};
use std::collections::HashSet;
use std::sync::Arc;

// =============================================================================
// Parsing
// =============================================================================

/// Parse JSON text into a value
///
/// Object key order follows the source text. Errors are `SyntaxError`s.
pub fn parse(text: &str) -> CoreResult<Value> {
    let parsed: serde_json::Value =
        serde_json::from_str(text).map_err(|e| CoreError::syntax_error(e.to_string()))?;
    Ok(json_to_value(&parsed))
}

/// Parse JSON text, then rewrite the result bottom-up with a reviver
///
/// The reviver sees `(key, value)` for every property and element (index
/// keys are rendered in decimal, the root key is `""`). Returning `None`
/// deletes an object property; a deleted array element becomes `undefined`.
/// Returning `None` for the root yields `undefined`.
pub fn parse_with_reviver<F>(text: &str, reviver: F) -> CoreResult<Value>
where
    F: Fn(&str, Value) -> Option<Value>,
{
    let root = parse(text)?;
    Ok(revive("", root, &reviver).unwrap_or_else(Value::undefined))
}

/// Convert a decoded `serde_json` tree into the value model
fn json_to_value(parsed: &serde_json::Value) -> Value {
    match parsed {
        serde_json::Value::Null => Value::null(),
        serde_json::Value::Bool(b) => Value::boolean(*b),
        serde_json::Value::Number(n) => Value::number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::string(JsString::intern(s)),
        serde_json::Value::Array(items) => {
            let arr = JsArray::new();
            for item in items {
                arr.push(json_to_value(item));
            }
            Value::array(Arc::new(arr))
        }
        serde_json::Value::Object(map) => {
            let obj = JsObject::new();
            for (k, v) in map {
                obj.set(k, json_to_value(v));
            }
            Value::object(Arc::new(obj))
        }
    }
}

/// Bottom-up reviver walk: children are revived before their container is
/// handed to the callback
fn revive<F>(key: &str, value: Value, reviver: &F) -> Option<Value>
where
    F: Fn(&str, Value) -> Option<Value>,
{
    match json::classify(&value) {
        json::Json::Array(arr) => {
            let out = JsArray::new();
            let mut index_buf = itoa::Buffer::new();
            for (index, element) in arr.elements().into_iter().enumerate() {
                let kept = revive(index_buf.format(index), element, reviver)
                    .unwrap_or_else(Value::undefined);
                out.push(kept);
            }
            reviver(key, Value::array(Arc::new(out)))
        }
        json::Json::Object(obj) => {
            let out = JsObject::new();
            for (k, v) in obj.entries() {
                if let Some(kept) = revive(k.as_str(), v, reviver) {
                    out.set(k.as_str(), kept);
                }
            }
            reviver(key, Value::object(Arc::new(out)))
        }
        _ => reviver(key, value),
    }
}

// =============================================================================
// Serialization
// =============================================================================

/// Serialize a value to compact JSON text
///
/// Returns `Ok(None)` when the top-level value does not serialize
/// (undefined, functions, symbols — matching `JSON.stringify` returning
/// `undefined`). BigInt and circular structures are `TypeError`s.
pub fn stringify(value: &Value) -> CoreResult<Option<String>> {
    stringify_inner(value, None, 0)
}

/// Serialize a value with newline/indentation formatting
///
/// `indent` is the number of columns per nesting level, clamped to 10.
pub fn stringify_pretty(value: &Value, indent: usize) -> CoreResult<Option<String>> {
    stringify_inner(value, None, indent)
}

/// Serialize a value, filtering/rewriting each (key, value) pair first
///
/// The replacer runs before serialization of every property, element, and
/// the root (key `""`). Returning `None` omits an object property; an
/// omitted array element serializes as `null`.
pub fn stringify_with_replacer<F>(value: &Value, replacer: F) -> CoreResult<Option<String>>
where
    F: Fn(&str, &Value) -> Option<Value>,
{
    stringify_inner(value, Some(&replacer), 0)
}

type Replacer<'a> = &'a dyn Fn(&str, &Value) -> Option<Value>;

fn stringify_inner(
    value: &Value,
    replacer: Option<Replacer<'_>>,
    indent: usize,
) -> CoreResult<Option<String>> {
    let mut serializer = Serializer {
        replacer,
        indent: " ".repeat(indent.min(10)),
        active: HashSet::new(),
    };
    let mut out = String::new();
    if serializer.write_value("", value, 0, &mut out)? {
        Ok(Some(out))
    } else {
        Ok(None)
    }
}

struct Serializer<'a> {
    replacer: Option<Replacer<'a>>,
    /// One nesting level of indentation; empty means compact output
    indent: String,
    /// Containers on the current serialization path, for cycle detection
    active: HashSet<usize>,
}

impl Serializer<'_> {
    /// Serialize one value into `out`. Returns false if the value does not
    /// serialize at all (undefined, function, symbol, or replaced away), in
    /// which case nothing was written.
    fn write_value(
        &mut self,
        key: &str,
        value: &Value,
        depth: usize,
        out: &mut String,
    ) -> CoreResult<bool> {
        let replaced;
        let value = match self.replacer {
            Some(replace) => match replace(key, value) {
                Some(v) => {
                    replaced = v;
                    &replaced
                }
                None => return Ok(false),
            },
            None => value,
        };

        match value.classify() {
            Classified::Undefined | Classified::Function(_) | Classified::Symbol(_) => Ok(false),
            Classified::BigInt(_) => {
                Err(CoreError::type_error("Do not know how to serialize a BigInt"))
            }
            Classified::Null => {
                out.push_str("null");
                Ok(true)
            }
            Classified::Bool(b) => {
                out.push_str(if b { "true" } else { "false" });
                Ok(true)
            }
            Classified::Number(n) => {
                write_number(n, out);
                Ok(true)
            }
            Classified::String(s) => {
                write_escaped(s.as_str(), out);
                Ok(true)
            }
            Classified::Object(container) => self.write_container(key, &container, depth, out),
        }
    }

    fn write_container(
        &mut self,
        key: &str,
        container: &Value,
        depth: usize,
        out: &mut String,
    ) -> CoreResult<bool> {
        if let Some(arr) = container.as_array() {
            let ptr = Arc::as_ptr(&arr) as usize;
            self.enter(key, ptr)?;
            self.write_array(&arr, depth, out)?;
            self.active.remove(&ptr);
            Ok(true)
        } else if let Some(obj) = container.as_object() {
            let ptr = Arc::as_ptr(&obj) as usize;
            self.enter(key, ptr)?;
            self.write_object(&obj, depth, out)?;
            self.active.remove(&ptr);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn enter(&mut self, key: &str, ptr: usize) -> CoreResult<()> {
        if !self.active.insert(ptr) {
            let mut msg = String::from("Converting circular structure to JSON");
            if !key.is_empty() {
                msg.push_str(&format!("\n    --- property '{}' closes the circle", key));
            }
            return Err(CoreError::type_error(msg));
        }
        Ok(())
    }

    fn write_array(&mut self, arr: &JsArray, depth: usize, out: &mut String) -> CoreResult<()> {
        let elements = arr.elements();
        if elements.is_empty() {
            out.push_str("[]");
            return Ok(());
        }

        let mut index_buf = itoa::Buffer::new();
        out.push('[');
        for (index, element) in elements.iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            self.newline_indent(depth + 1, out);
            let written = self.write_value(index_buf.format(index), element, depth + 1, out)?;
            if !written {
                // Unserializable elements keep their slot as null
                out.push_str("null");
            }
        }
        self.newline_indent(depth, out);
        out.push(']');
        Ok(())
    }

    fn write_object(&mut self, obj: &JsObject, depth: usize, out: &mut String) -> CoreResult<()> {
        // Serialize each property to a side buffer first: unserializable
        // properties are omitted entirely, key included
        let mut pieces = Vec::new();
        for (k, v) in obj.entries() {
            let mut piece = String::new();
            if self.write_value(k.as_str(), &v, depth + 1, &mut piece)? {
                pieces.push((k, piece));
            }
        }

        if pieces.is_empty() {
            out.push_str("{}");
            return Ok(());
        }

        out.push('{');
        for (index, (k, piece)) in pieces.iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            self.newline_indent(depth + 1, out);
            write_escaped(k.as_str(), out);
            out.push(':');
            if !self.indent.is_empty() {
                out.push(' ');
            }
            out.push_str(piece);
        }
        self.newline_indent(depth, out);
        out.push('}');
        Ok(())
    }

    fn newline_indent(&self, depth: usize, out: &mut String) {
        if self.indent.is_empty() {
            return;
        }
        out.push('\n');
        for _ in 0..depth {
            out.push_str(&self.indent);
        }
    }
}

/// Format a number the way `JSON.stringify` does: non-finite values become
/// null, integral values print without a decimal point
fn write_number(n: f64, out: &mut String) {
    if !n.is_finite() {
        out.push_str("null");
        return;
    }
    // 2^53 bounds the exactly-representable integers
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        let mut buf = itoa::Buffer::new();
        out.push_str(buf.format(n as i64));
    } else {
        let mut buf = ryu::Buffer::new();
        out.push_str(buf.format(n));
    }
}

/// Escape a string into a quoted JSON literal
fn write_escaped(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use lutra_core::{NativeFunction, json::Json};
    use num_bigint::BigInt;

    #[test]
    fn test_parse_object_preserves_key_order() {
        let v = parse(r#"{"zebra":1,"alpha":2,"mid":3}"#).unwrap();
        let obj = v.as_object().unwrap();
        let keys: Vec<_> = obj.keys().iter().map(|k| k.as_str().to_string()).collect();
        assert_eq!(keys, vec!["zebra", "alpha", "mid"]);
    }

    #[test]
    fn test_parse_nested_classification() {
        // {"a": 1, "b": [true, null]} classifies level by level
        let v = parse(r#"{"a": 1, "b": [true, null]}"#).unwrap();

        let obj = match json::classify(&v) {
            Json::Object(obj) => obj,
            other => panic!("expected Object, got {:?}", other),
        };
        let keys: Vec<_> = obj.keys().iter().map(|k| k.as_str().to_string()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(matches!(
            json::classify(&obj.get("a").unwrap()),
            Json::Number(n) if n == 1.0
        ));

        match json::classify(&obj.get("b").unwrap()) {
            Json::Array(arr) => {
                assert!(matches!(json::classify(&arr.get(0).unwrap()), Json::Bool(true)));
                assert!(matches!(json::classify(&arr.get(1).unwrap()), Json::Null));
            }
            other => panic!("expected Array, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_primitives() {
        assert_eq!(parse("42").unwrap().as_number(), Some(42.0));
        assert_eq!(parse("\"hello\"").unwrap().as_string().unwrap().as_str(), "hello");
        assert_eq!(parse("true").unwrap().as_boolean(), Some(true));
        assert!(parse("null").unwrap().is_null());
    }

    #[test]
    fn test_parse_invalid() {
        let err = parse("{invalid}").unwrap_err();
        assert!(err.to_string().starts_with("SyntaxError"));
    }

    #[test]
    fn test_stringify_round_trip() {
        let text = r#"{"name":"test","tags":[1,2.5,null,true],"nested":{"empty":[]}}"#;
        let v = parse(text).unwrap();
        assert_eq!(stringify(&v).unwrap().as_deref(), Some(text));
    }

    #[test]
    fn test_stringify_unserializable_top_level() {
        assert!(stringify(&Value::undefined()).unwrap().is_none());
        let f = Value::function(NativeFunction::anonymous(|_| Ok(Value::undefined())));
        assert!(stringify(&f).unwrap().is_none());
    }

    #[test]
    fn test_stringify_omits_undefined_properties_nulls_elements() {
        let obj = JsObject::new();
        obj.set("keep", Value::number(1.0));
        obj.set("drop", Value::undefined());
        let arr = JsArray::from_vec(vec![Value::number(1.0), Value::undefined()]);
        obj.set("list", Value::array(Arc::new(arr)));

        let text = stringify(&Value::object(Arc::new(obj))).unwrap().unwrap();
        assert_eq!(text, r#"{"keep":1,"list":[1,null]}"#);
    }

    #[test]
    fn test_stringify_bigint_is_type_error() {
        let v = Value::bigint(BigInt::from(1));
        let err = stringify(&v).unwrap_err();
        assert!(err.to_string().contains("BigInt"));
    }

    #[test]
    fn test_stringify_non_finite_numbers() {
        let arr = JsArray::from_vec(vec![
            Value::nan(),
            Value::number(f64::INFINITY),
            Value::number(f64::NEG_INFINITY),
            Value::number(-0.0),
        ]);
        let text = stringify(&Value::array(Arc::new(arr))).unwrap().unwrap();
        assert_eq!(text, "[null,null,null,0]");
    }

    #[test]
    fn test_stringify_escapes() {
        let v = Value::string(JsString::intern("a\"b\\c\nd\u{1}"));
        let text = stringify(&v).unwrap().unwrap();
        assert_eq!(text, "\"a\\\"b\\\\c\\nd\\u0001\"");
    }

    #[test]
    fn test_stringify_pretty() {
        let v = parse(r#"{"a":1,"b":[true]}"#).unwrap();
        let text = stringify_pretty(&v, 2).unwrap().unwrap();
        assert_eq!(text, "{\n  \"a\": 1,\n  \"b\": [\n    true\n  ]\n}");
    }

    #[test]
    fn test_stringify_pretty_clamps_indent() {
        let v = parse(r#"{"a":1}"#).unwrap();
        let wide = stringify_pretty(&v, 64).unwrap().unwrap();
        let ten = stringify_pretty(&v, 10).unwrap().unwrap();
        assert_eq!(wide, ten);
    }

    #[test]
    fn test_replacer_omits_and_rewrites() {
        let v = parse(r#"{"secret":"hide me","count":2}"#).unwrap();
        let text = stringify_with_replacer(&v, |key, value| match key {
            "secret" => None,
            "count" => value.as_number().map(|n| Value::number(n * 10.0)),
            _ => Some(value.clone()),
        })
        .unwrap()
        .unwrap();
        assert_eq!(text, r#"{"count":20}"#);
    }

    #[test]
    fn test_replacer_sees_array_indices() {
        let v = parse("[10,20,30]").unwrap();
        let text = stringify_with_replacer(&v, |key, value| {
            if key == "1" {
                None // elided elements serialize as null
            } else {
                Some(value.clone())
            }
        })
        .unwrap()
        .unwrap();
        assert_eq!(text, "[10,null,30]");
    }

    #[test]
    fn test_reviver_rewrites_bottom_up() {
        let v = parse_with_reviver(r#"{"a":1,"b":{"c":2}}"#, |_key, value| {
            match value.as_number() {
                Some(n) => Some(Value::number(n + 1.0)),
                None => Some(value),
            }
        })
        .unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.get("a").unwrap().as_number(), Some(2.0));
        let inner = obj.get("b").unwrap().as_object().unwrap();
        assert_eq!(inner.get("c").unwrap().as_number(), Some(3.0));
    }

    #[test]
    fn test_reviver_deletes_properties() {
        let v = parse_with_reviver(r#"{"keep":1,"drop":2}"#, |key, value| {
            if key == "drop" { None } else { Some(value) }
        })
        .unwrap();
        let obj = v.as_object().unwrap();
        assert!(obj.get("keep").is_some());
        assert!(obj.get("drop").is_none());
    }

    #[test]
    fn test_reviver_root() {
        let v = parse_with_reviver("5", |key, value| {
            assert_eq!(key, "");
            Some(value)
        })
        .unwrap();
        assert_eq!(v.as_number(), Some(5.0));

        let dropped = parse_with_reviver("5", |_, _| None).unwrap();
        assert!(dropped.is_undefined());
    }

    #[test]
    fn test_circular_structure_is_type_error() {
        let obj = Arc::new(JsObject::new());
        obj.set("self", Value::object(obj.clone()));

        let err = stringify(&Value::object(obj)).unwrap_err();
        assert!(err.to_string().contains("circular"));
    }

    #[test]
    fn test_shared_subtree_is_not_circular() {
        // The same object reachable twice on sibling paths is fine; only a
        // path back through an ancestor is a cycle
        let shared = Arc::new(JsObject::new());
        shared.set("v", Value::number(1.0));

        let root = JsObject::new();
        root.set("a", Value::object(shared.clone()));
        root.set("b", Value::object(shared));

        let text = stringify(&Value::object(Arc::new(root))).unwrap().unwrap();
        assert_eq!(text, r#"{"a":{"v":1},"b":{"v":1}}"#);
    }

    #[test]
    fn test_large_integers_and_fractions() {
        let arr = JsArray::from_vec(vec![
            Value::number(9_007_199_254_740_991.0), // 2^53 - 1
            Value::number(0.5),
            Value::number(-3.0),
        ]);
        let text = stringify(&Value::array(Arc::new(arr))).unwrap().unwrap();
        assert_eq!(text, "[9007199254740991,0.5,-3]");
    }
}
