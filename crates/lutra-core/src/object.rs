//! String-keyed objects with insertion-ordered properties
//!
//! Property order is observable (JSON key order, enumeration), so storage is
//! an `IndexMap`: first insertion fixes a key's position, overwrites keep it.

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;

use crate::string::JsString;
use crate::value::Value;

type PropertyMap = IndexMap<Arc<JsString>, Value, FxBuildHasher>;

/// A mutable object with insertion-ordered string properties
pub struct JsObject {
    properties: RwLock<PropertyMap>,
}

impl JsObject {
    /// Create an empty object
    pub fn new() -> Self {
        Self {
            properties: RwLock::new(PropertyMap::with_hasher(FxBuildHasher)),
        }
    }

    /// Get a property value
    pub fn get(&self, key: &str) -> Option<Value> {
        self.properties.read().get(&JsString::intern(key)).cloned()
    }

    /// Set a property. A new key appends; an existing key overwrites in place.
    pub fn set(&self, key: &str, value: Value) {
        self.properties.write().insert(JsString::intern(key), value);
    }

    /// Delete a property, preserving the relative order of the survivors.
    /// Returns whether the key was present.
    pub fn delete(&self, key: &str) -> bool {
        self.properties
            .write()
            .shift_remove(&JsString::intern(key))
            .is_some()
    }

    /// Check for a property without cloning its value
    pub fn has(&self, key: &str) -> bool {
        self.properties.read().contains_key(&JsString::intern(key))
    }

    /// Property keys in insertion order
    pub fn keys(&self) -> Vec<Arc<JsString>> {
        self.properties.read().keys().cloned().collect()
    }

    /// Snapshot of (key, value) pairs in insertion order
    pub fn entries(&self) -> Vec<(Arc<JsString>, Value)> {
        self.properties
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.properties.read().len()
    }

    /// Check if the object has no properties
    pub fn is_empty(&self) -> bool {
        self.properties.read().is_empty()
    }
}

impl Default for JsObject {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for JsObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let props = self.properties.read();
        let mut map = f.debug_map();
        for (k, v) in props.iter() {
            map.entry(&k.as_str(), v);
        }
        map.finish()
    }
}
