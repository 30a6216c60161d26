//! Runtime-kind classification
//!
//! [`Value::classify`] maps any value onto the closed [`Classified`] sum so
//! callers branch with an exhaustive match instead of chained `is_*` probes.
//! If a new runtime kind is ever added, every call site stops compiling
//! rather than silently mis-classifying.

use crate::string::JsString;
use crate::value::{HeapRef, JsSymbol, NativeFunction, Value};
use num_bigint::BigInt;
use std::sync::Arc;

/// The runtime kind of a value, with its payload
///
/// Exactly one variant per value; produced by [`Value::classify`], which is
/// total and never fails. Object and function payloads are opaque handles:
/// their internals are not modeled here.
#[derive(Debug, Clone)]
pub enum Classified {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// A boolean
    Bool(bool),
    /// A number (int32-encoded values widen to f64)
    Number(f64),
    /// An arbitrary-precision integer, never coerced to f64
    BigInt(Arc<BigInt>),
    /// A string
    String(Arc<JsString>),
    /// A symbol handle
    Symbol(Arc<JsSymbol>),
    /// A callable handle
    Function(Arc<NativeFunction>),
    /// An opaque handle to any other heap shape (objects, arrays)
    Object(Value),
}

impl Value {
    /// Classify this value by runtime kind
    ///
    /// Total and side-effect-free: every value, including `null` and
    /// `undefined`, maps to exactly one [`Classified`] variant.
    pub fn classify(&self) -> Classified {
        // typeof reports null as "object", so the identity check must come
        // before the generic kind dispatch
        if self.is_null() {
            return Classified::Null;
        }
        if self.is_undefined() {
            return Classified::Undefined;
        }
        if let Some(b) = self.as_boolean() {
            return Classified::Bool(b);
        }
        if let Some(n) = self.as_number() {
            return Classified::Number(n);
        }

        match self.heap_ref() {
            Some(HeapRef::String(s)) => Classified::String(s.clone()),
            Some(HeapRef::Symbol(s)) => Classified::Symbol(s.clone()),
            Some(HeapRef::BigInt(b)) => Classified::BigInt(b.clone()),
            Some(HeapRef::Function(f)) => Classified::Function(f.clone()),
            Some(HeapRef::Object(_) | HeapRef::Array(_)) => Classified::Object(self.clone()),
            // The primitive tags are handled above; remaining bits always
            // carry a heap payload
            None => unreachable!("NaN-boxed bits without a heap payload"),
        }
    }
}
