//! Interned JavaScript-style strings
//!
//! Strings are immutable and interned for deduplication. Equal content yields
//! the same `Arc`, so equality checks hit the pointer fast path.

use dashmap::DashMap;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Global string intern table
static STRING_TABLE: std::sync::LazyLock<DashMap<u64, Arc<JsString>>> =
    std::sync::LazyLock::new(DashMap::new);

/// An immutable interned string
pub struct JsString {
    data: Arc<str>,
    hash: u64,
}

impl JsString {
    /// Intern a string, returning the shared handle for its content
    pub fn intern(s: &str) -> Arc<JsString> {
        let hash = JsString::compute_hash(s);

        // Check if already interned
        if let Some(existing) = STRING_TABLE.get(&hash)
            && existing.data.as_ref() == s
        {
            return existing.clone();
        }

        let js_str = Arc::new(JsString {
            data: Arc::from(s),
            hash,
        });
        STRING_TABLE.insert(hash, js_str.clone());
        js_str
    }

    fn compute_hash(s: &str) -> u64 {
        let mut hasher = FxHasher::default();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Get the string contents
    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the string is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl PartialEq for JsString {
    fn eq(&self, other: &Self) -> bool {
        // Interned strings with equal content share storage
        std::ptr::eq(self.data.as_ptr(), other.data.as_ptr()) || self.data == other.data
    }
}

impl Eq for JsString {}

impl Hash for JsString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl std::fmt::Display for JsString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.data)
    }
}

impl std::fmt::Debug for JsString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.data.as_ref())
    }
}
