//! JSON data-model classification
//!
//! [`classify`] maps a JSON-shaped value onto the closed [`Json`] sum.
//! Container variants carry the raw object/array handle: nested values stay
//! unclassified until the caller asks, so one level of dispatch never pays
//! for a deep traversal.
//!
//! The input is assumed JSON-shaped (produced by a trusted parser or typed
//! constructors). Classification does not validate: a non-JSON input still
//! gets a variant — wrong, never absent — and is a bug in the producer.

use crate::array::JsArray;
use crate::object::JsObject;
use crate::string::JsString;
use crate::value::Value;
use std::sync::Arc;

/// A single level of the JSON data model
#[derive(Debug, Clone)]
pub enum Json {
    /// `null`
    Null,
    /// A boolean
    Bool(bool),
    /// A number
    Number(f64),
    /// A string
    String(Arc<JsString>),
    /// An ordered sequence; elements are re-classified on demand
    Array(Arc<JsArray>),
    /// An insertion-ordered string-keyed mapping; values are re-classified
    /// on demand
    Object(Arc<JsObject>),
}

/// Classify one level of a JSON-shaped value
///
/// Ordered checks, first match wins. Null is excluded before anything else
/// (its dynamic kind collides with objects), and arrays are split from
/// objects by the structural sequence test rather than a kind tag, since the
/// kind inspector reports both as "object".
pub fn classify(value: &Value) -> Json {
    if value.is_null() {
        return Json::Null;
    }
    if let Some(b) = value.as_boolean() {
        return Json::Bool(b);
    }
    if let Some(s) = value.as_string() {
        return Json::String(s);
    }
    if let Some(n) = value.as_number() {
        return Json::Number(n);
    }
    if let Some(arr) = value.as_array() {
        return Json::Array(arr);
    }
    match value.as_object() {
        Some(obj) => Json::Object(obj),
        // Precondition violation (undefined/function/symbol/bigint input):
        // still produce an Object tag rather than panic
        None => Json::Object(Arc::new(JsObject::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(entries: &[(&str, Value)]) -> Value {
        let obj = JsObject::new();
        for (k, v) in entries {
            obj.set(k, v.clone());
        }
        Value::object(Arc::new(obj))
    }

    fn array(elements: Vec<Value>) -> Value {
        Value::array(Arc::new(JsArray::from_vec(elements)))
    }

    /// Rebuild a value from one classification level, recursing by
    /// re-invoking classify per nested element
    fn reconstruct(value: &Value) -> Value {
        match classify(value) {
            Json::Null => Value::null(),
            Json::Bool(b) => Value::boolean(b),
            Json::Number(n) => Value::number(n),
            Json::String(s) => Value::string(s),
            Json::Array(arr) => {
                let out = JsArray::new();
                for element in arr.elements() {
                    out.push(reconstruct(&element));
                }
                Value::array(Arc::new(out))
            }
            Json::Object(obj) => {
                let out = JsObject::new();
                for (k, v) in obj.entries() {
                    out.set(k.as_str(), reconstruct(&v));
                }
                Value::object(Arc::new(out))
            }
        }
    }

    fn assert_structurally_equal(a: &Value, b: &Value) {
        match (classify(a), classify(b)) {
            (Json::Array(x), Json::Array(y)) => {
                assert_eq!(x.len(), y.len());
                for (ea, eb) in x.elements().iter().zip(y.elements().iter()) {
                    assert_structurally_equal(ea, eb);
                }
            }
            (Json::Object(x), Json::Object(y)) => {
                let xe = x.entries();
                let ye = y.entries();
                assert_eq!(xe.len(), ye.len());
                // Same keys in the same order
                for ((ka, va), (kb, vb)) in xe.iter().zip(ye.iter()) {
                    assert_eq!(ka.as_str(), kb.as_str());
                    assert_structurally_equal(va, vb);
                }
            }
            _ => assert_eq!(a, b),
        }
    }

    #[test]
    fn test_null_first() {
        assert!(matches!(classify(&Value::null()), Json::Null));
    }

    #[test]
    fn test_primitives() {
        assert!(matches!(classify(&Value::boolean(true)), Json::Bool(true)));
        match classify(&Value::string(JsString::intern("x"))) {
            Json::String(s) => assert_eq!(s.as_str(), "x"),
            other => panic!("expected String, got {:?}", other),
        }
        match classify(&Value::number(1.25)) {
            Json::Number(n) => assert_eq!(n, 1.25),
            other => panic!("expected Number, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_array_vs_empty_object() {
        // Both are non-null heap values; they must never be confused
        match classify(&array(vec![])) {
            Json::Array(a) => assert!(a.is_empty()),
            other => panic!("expected Array, got {:?}", other),
        }
        match classify(&object(&[])) {
            Json::Object(o) => assert!(o.is_empty()),
            other => panic!("expected Object, got {:?}", other),
        }
    }

    #[test]
    fn test_lazy_containers() {
        // The classifier wraps the container; nested values stay raw until
        // the caller classifies them
        let nested = array(vec![Value::boolean(true), Value::null()]);
        let v = object(&[("a", Value::number(1.0)), ("b", nested)]);

        let obj = match classify(&v) {
            Json::Object(obj) => obj,
            other => panic!("expected Object, got {:?}", other),
        };
        let keys: Vec<_> = obj.keys().iter().map(|k| k.as_str().to_string()).collect();
        assert_eq!(keys, vec!["a", "b"]);

        match classify(&obj.get("b").unwrap()) {
            Json::Array(arr) => {
                assert!(matches!(classify(&arr.get(0).unwrap()), Json::Bool(true)));
                assert!(matches!(classify(&arr.get(1).unwrap()), Json::Null));
            }
            other => panic!("expected Array, got {:?}", other),
        }
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let v = object(&[
            ("z", Value::number(1.0)),
            ("a", array(vec![Value::boolean(true), Value::null(), Value::number(2.5)])),
            ("m", object(&[("inner", Value::string(JsString::intern("s")))])),
        ]);
        let rebuilt = reconstruct(&v);
        assert_structurally_equal(&v, &rebuilt);
    }
}
