//! Dynamic values with NaN-boxing
//!
//! NaN-boxing encodes values in 64 bits using the IEEE 754 NaN space.
//! This allows storing small primitives and special values without
//! additional allocation.
//!
//! ## Encoding Scheme
//!
//! ```text
//! 64 bits: SEEEEEEE EEEEMMMM MMMMMMMM ... MMMMMMMM
//!          S = sign bit
//!          E = exponent (11 bits)
//!          M = mantissa (52 bits)
//!
//! Regular doubles: When exponent != 0x7FF (NaN)
//! NaN-boxed values: When exponent == 0x7FF and mantissa != 0 (quiet NaN)
//!
//! Encoding:
//! - Double:     stored directly (except NaN)
//! - NaN:        0x7FFA_0000_0000_0000 (canonical NaN, distinct from undefined)
//! - Integer:    0x7FF8_0001_XXXX_XXXX (32-bit signed in lower bits)
//! - Heap:       0x7FFC_XXXX_XXXX_XXXX (48-bit payload address)
//! - Undefined:  0x7FF8_0000_0000_0000
//! - Null:       0x7FF8_0000_0000_0001
//! - True:       0x7FF8_0000_0000_0002
//! - False:      0x7FF8_0000_0000_0003
//! ```

use crate::array::JsArray;
use crate::error::CoreResult;
use crate::object::JsObject;
use crate::string::JsString;
use num_bigint::BigInt;
use num_traits::Zero;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

// NaN-boxing constants
const QUIET_NAN: u64 = 0x7FF8_0000_0000_0000;
const PAYLOAD_MASK: u64 = 0x0000_FFFF_FFFF_FFFF;

// Tags (in the upper 16 bits after the quiet NaN prefix)
const TAG_UNDEFINED: u64 = 0x7FF8_0000_0000_0000;
const TAG_NULL: u64 = 0x7FF8_0000_0000_0001;
const TAG_TRUE: u64 = 0x7FF8_0000_0000_0002;
const TAG_FALSE: u64 = 0x7FF8_0000_0000_0003;
const TAG_NAN: u64 = 0x7FFA_0000_0000_0000; // Canonical NaN (distinct from undefined)
const TAG_INT32: u64 = 0x7FF8_0001_0000_0000;
const TAG_POINTER: u64 = 0x7FFC_0000_0000_0000;

/// A dynamically-typed value using NaN-boxing for efficient storage
///
/// This type is `Send + Sync` because all heap-allocated data is behind `Arc`.
#[derive(Clone)]
pub struct Value {
    bits: u64,
    /// Heap payload, Some only for heap kinds (String, Object, ...)
    heap_ref: Option<HeapRef>,
}

/// Native function handler type
pub type NativeFn = Arc<dyn Fn(&[Value]) -> CoreResult<Value> + Send + Sync>;

/// Reference to heap-allocated data
#[derive(Clone)]
pub(crate) enum HeapRef {
    /// String value
    String(Arc<JsString>),
    /// Object value
    Object(Arc<JsObject>),
    /// Array value
    Array(Arc<JsArray>),
    /// Callable value
    Function(Arc<NativeFunction>),
    /// Symbol
    Symbol(Arc<JsSymbol>),
    /// BigInt
    BigInt(Arc<BigInt>),
}

/// A callable implemented as a Rust closure
pub struct NativeFunction {
    /// Function name, if any
    pub name: Option<Arc<JsString>>,
    func: NativeFn,
}

impl NativeFunction {
    /// Create a named native function
    pub fn new<F>(name: &str, f: F) -> Arc<Self>
    where
        F: Fn(&[Value]) -> CoreResult<Value> + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: Some(JsString::intern(name)),
            func: Arc::new(f),
        })
    }

    /// Create an anonymous native function
    pub fn anonymous<F>(f: F) -> Arc<Self>
    where
        F: Fn(&[Value]) -> CoreResult<Value> + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: None,
            func: Arc::new(f),
        })
    }

    /// Invoke the function
    pub fn call(&self, args: &[Value]) -> CoreResult<Value> {
        (self.func)(args)
    }
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "[Function: {}]", name),
            None => write!(f, "[Function (anonymous)]"),
        }
    }
}

/// Symbol id counter
static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// A unique symbol
#[derive(Debug)]
pub struct JsSymbol {
    /// Symbol description
    pub description: Option<String>,
    /// Unique ID
    pub id: u64,
}

impl JsSymbol {
    /// Create a fresh symbol with an optional description
    pub fn new(description: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            description: description.map(str::to_string),
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
        })
    }
}

fn boxed_ptr<T>(ptr: *const T) -> u64 {
    TAG_POINTER | (ptr as u64 & PAYLOAD_MASK)
}

impl Value {
    /// Create undefined value
    #[inline]
    pub const fn undefined() -> Self {
        Self {
            bits: TAG_UNDEFINED,
            heap_ref: None,
        }
    }

    /// Create null value
    #[inline]
    pub const fn null() -> Self {
        Self {
            bits: TAG_NULL,
            heap_ref: None,
        }
    }

    /// Create boolean value
    #[inline]
    pub const fn boolean(b: bool) -> Self {
        Self {
            bits: if b { TAG_TRUE } else { TAG_FALSE },
            heap_ref: None,
        }
    }

    /// Create 32-bit integer value
    #[inline]
    pub fn int32(n: i32) -> Self {
        Self {
            bits: TAG_INT32 | (n as u32 as u64),
            heap_ref: None,
        }
    }

    /// Create number (f64) value
    #[inline]
    pub fn number(n: f64) -> Self {
        // Handle NaN specially to avoid collision with undefined
        if n.is_nan() {
            return Self {
                bits: TAG_NAN,
                heap_ref: None,
            };
        }

        // Check if it fits in i32 for the compact encoding, but preserve -0.0
        // Use 1.0/n to distinguish +0 (gives +inf) from -0 (gives -inf)
        if n.fract() == 0.0
            && n >= i32::MIN as f64
            && n <= i32::MAX as f64
            && (n != 0.0 || (1.0_f64 / n).is_sign_positive())
        {
            return Self::int32(n as i32);
        }

        Self {
            bits: n.to_bits(),
            heap_ref: None,
        }
    }

    /// Create NaN value explicitly
    #[inline]
    pub const fn nan() -> Self {
        Self {
            bits: TAG_NAN,
            heap_ref: None,
        }
    }

    /// Create string value
    pub fn string(s: Arc<JsString>) -> Self {
        Self {
            bits: boxed_ptr(Arc::as_ptr(&s)),
            heap_ref: Some(HeapRef::String(s)),
        }
    }

    /// Create object value
    pub fn object(obj: Arc<JsObject>) -> Self {
        Self {
            bits: boxed_ptr(Arc::as_ptr(&obj)),
            heap_ref: Some(HeapRef::Object(obj)),
        }
    }

    /// Create array value
    pub fn array(arr: Arc<JsArray>) -> Self {
        Self {
            bits: boxed_ptr(Arc::as_ptr(&arr)),
            heap_ref: Some(HeapRef::Array(arr)),
        }
    }

    /// Create function value
    pub fn function(func: Arc<NativeFunction>) -> Self {
        Self {
            bits: boxed_ptr(Arc::as_ptr(&func)),
            heap_ref: Some(HeapRef::Function(func)),
        }
    }

    /// Create symbol value
    pub fn symbol(sym: Arc<JsSymbol>) -> Self {
        Self {
            bits: boxed_ptr(Arc::as_ptr(&sym)),
            heap_ref: Some(HeapRef::Symbol(sym)),
        }
    }

    /// Create BigInt value
    pub fn bigint(value: BigInt) -> Self {
        let bi = Arc::new(value);
        Self {
            bits: boxed_ptr(Arc::as_ptr(&bi)),
            heap_ref: Some(HeapRef::BigInt(bi)),
        }
    }

    /// Check if value is undefined
    #[inline]
    pub fn is_undefined(&self) -> bool {
        self.bits == TAG_UNDEFINED
    }

    /// Check if value is null
    #[inline]
    pub fn is_null(&self) -> bool {
        self.bits == TAG_NULL
    }

    /// Check if value is null or undefined
    #[inline]
    pub fn is_nullish(&self) -> bool {
        self.bits == TAG_UNDEFINED || self.bits == TAG_NULL
    }

    /// Check if value is a boolean
    #[inline]
    pub fn is_boolean(&self) -> bool {
        self.bits == TAG_TRUE || self.bits == TAG_FALSE
    }

    /// Check if value is an integer
    #[inline]
    pub fn is_int32(&self) -> bool {
        (self.bits & 0xFFFF_FFFF_0000_0000) == TAG_INT32
    }

    /// Check if value is NaN
    #[inline]
    pub fn is_nan(&self) -> bool {
        self.bits == TAG_NAN
    }

    /// Check if value is a number (including int32 and NaN)
    #[inline]
    pub fn is_number(&self) -> bool {
        self.is_int32() || self.is_nan() || !self.is_nan_boxed()
    }

    /// Check if value is a string
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(&self.heap_ref, Some(HeapRef::String(_)))
    }

    /// Check if value is a plain object
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(&self.heap_ref, Some(HeapRef::Object(_)))
    }

    /// Check if value is an array (the "indexed sequence" structural test)
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(&self.heap_ref, Some(HeapRef::Array(_)))
    }

    /// Check if value is callable
    #[inline]
    pub fn is_callable(&self) -> bool {
        matches!(&self.heap_ref, Some(HeapRef::Function(_)))
    }

    /// Check if value is a symbol
    #[inline]
    pub fn is_symbol(&self) -> bool {
        matches!(&self.heap_ref, Some(HeapRef::Symbol(_)))
    }

    /// Check if value is a BigInt
    #[inline]
    pub fn is_bigint(&self) -> bool {
        matches!(&self.heap_ref, Some(HeapRef::BigInt(_)))
    }

    /// Check if this is a NaN-boxed value (vs regular double)
    #[inline]
    fn is_nan_boxed(&self) -> bool {
        // Quiet NaN pattern: exponent all 1s, quiet bit set
        (self.bits & QUIET_NAN) == QUIET_NAN
    }

    /// Get as boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self.bits {
            TAG_TRUE => Some(true),
            TAG_FALSE => Some(false),
            _ => None,
        }
    }

    /// Get as 32-bit integer
    pub fn as_int32(&self) -> Option<i32> {
        if self.is_int32() {
            Some((self.bits & 0xFFFF_FFFF) as i32)
        } else {
            None
        }
    }

    /// Get as number (f64)
    pub fn as_number(&self) -> Option<f64> {
        if self.is_int32() {
            Some((self.bits & 0xFFFF_FFFF) as i32 as f64)
        } else if self.bits == TAG_NAN {
            Some(f64::NAN)
        } else if !self.is_nan_boxed() {
            Some(f64::from_bits(self.bits))
        } else {
            None
        }
    }

    /// Get as string
    pub fn as_string(&self) -> Option<Arc<JsString>> {
        match &self.heap_ref {
            Some(HeapRef::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Get as object
    pub fn as_object(&self) -> Option<Arc<JsObject>> {
        match &self.heap_ref {
            Some(HeapRef::Object(o)) => Some(o.clone()),
            _ => None,
        }
    }

    /// Get as array
    pub fn as_array(&self) -> Option<Arc<JsArray>> {
        match &self.heap_ref {
            Some(HeapRef::Array(a)) => Some(a.clone()),
            _ => None,
        }
    }

    /// Get as function
    pub fn as_function(&self) -> Option<Arc<NativeFunction>> {
        match &self.heap_ref {
            Some(HeapRef::Function(f)) => Some(f.clone()),
            _ => None,
        }
    }

    /// Get as symbol
    pub fn as_symbol(&self) -> Option<Arc<JsSymbol>> {
        match &self.heap_ref {
            Some(HeapRef::Symbol(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Get as BigInt
    pub fn as_bigint(&self) -> Option<Arc<BigInt>> {
        match &self.heap_ref {
            Some(HeapRef::BigInt(b)) => Some(b.clone()),
            _ => None,
        }
    }

    pub(crate) fn heap_ref(&self) -> Option<&HeapRef> {
        self.heap_ref.as_ref()
    }

    /// Convert to boolean (ToBoolean)
    pub fn to_boolean(&self) -> bool {
        match self.bits {
            TAG_UNDEFINED | TAG_NULL | TAG_FALSE | TAG_NAN => false, // NaN is falsy
            TAG_TRUE => true,
            _ if self.is_int32() => self.as_int32().is_some_and(|n| n != 0),
            _ if !self.is_nan_boxed() => {
                let n = f64::from_bits(self.bits);
                !n.is_nan() && n != 0.0
            }
            _ => match &self.heap_ref {
                // Empty string is falsy; 0n is falsy
                Some(HeapRef::String(s)) => !s.is_empty(),
                Some(HeapRef::BigInt(b)) => !b.is_zero(),
                // Objects, arrays, functions, symbols are always truthy
                _ => true,
            },
        }
    }

    /// Get the type name (for typeof)
    pub fn type_of(&self) -> &'static str {
        match self.bits {
            TAG_UNDEFINED => "undefined",
            TAG_NULL => "object", // typeof null === "object" (historical quirk)
            TAG_TRUE | TAG_FALSE => "boolean",
            TAG_NAN => "number", // NaN is a number
            _ if self.is_int32() || !self.is_nan_boxed() => "number",
            _ => match &self.heap_ref {
                Some(HeapRef::String(_)) => "string",
                Some(HeapRef::Function(_)) => "function",
                Some(HeapRef::Symbol(_)) => "symbol",
                Some(HeapRef::BigInt(_)) => "bigint",
                Some(HeapRef::Object(_) | HeapRef::Array(_)) => "object",
                // The tag partition is closed: pointer bits always carry a payload
                None => unreachable!("NaN-boxed bits without a heap payload"),
            },
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::undefined()
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.bits {
            TAG_UNDEFINED => write!(f, "undefined"),
            TAG_NULL => write!(f, "null"),
            TAG_TRUE => write!(f, "true"),
            TAG_FALSE => write!(f, "false"),
            TAG_NAN => write!(f, "NaN"),
            _ if self.is_int32() => write!(f, "{}", (self.bits & 0xFFFF_FFFF) as i32),
            _ if !self.is_nan_boxed() => write!(f, "{}", f64::from_bits(self.bits)),
            _ => match &self.heap_ref {
                Some(HeapRef::String(s)) => write!(f, "{:?}", s.as_str()),
                Some(HeapRef::Object(_)) => write!(f, "[object Object]"),
                Some(HeapRef::Array(_)) => write!(f, "[object Array]"),
                Some(HeapRef::Function(func)) => write!(f, "{:?}", func),
                Some(HeapRef::Symbol(s)) => match &s.description {
                    Some(desc) => write!(f, "Symbol({})", desc),
                    None => write!(f, "Symbol()"),
                },
                Some(HeapRef::BigInt(b)) => write!(f, "{}n", b),
                None => write!(f, "<unknown>"),
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        // NaN != NaN (IEEE 754)
        if self.bits == TAG_NAN || other.bits == TAG_NAN {
            return false;
        }

        // Fast path: same bits (same primitive, or same heap payload)
        if self.bits == other.bits {
            return true;
        }

        // Numbers compare numerically across encodings (int32 vs double)
        if self.is_number() && other.is_number() {
            return self.as_number() == other.as_number();
        }

        // Strings compare by content
        if let (Some(a), Some(b)) = (self.as_string(), other.as_string()) {
            return a == b;
        }

        // BigInt equality
        if let (Some(HeapRef::BigInt(a)), Some(HeapRef::BigInt(b))) =
            (self.heap_ref(), other.heap_ref())
        {
            return a == b;
        }

        false
    }
}
