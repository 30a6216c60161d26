//! Dense array storage
//!
//! Arrays are a distinct heap type rather than index-keyed objects: the
//! array/object distinction is structural, and JSON classification relies on
//! asking "is this an indexed sequence" directly.

use parking_lot::RwLock;

use crate::value::Value;

/// A mutable dense array of values
pub struct JsArray {
    elements: RwLock<Vec<Value>>,
}

impl JsArray {
    /// Create an empty array
    pub fn new() -> Self {
        Self {
            elements: RwLock::new(Vec::new()),
        }
    }

    /// Create an array from existing elements
    pub fn from_vec(elements: Vec<Value>) -> Self {
        Self {
            elements: RwLock::new(elements),
        }
    }

    /// Get the element at `index`
    pub fn get(&self, index: usize) -> Option<Value> {
        self.elements.read().get(index).cloned()
    }

    /// Set the element at `index`, padding any gap with `undefined`
    pub fn set(&self, index: usize, value: Value) {
        let mut elements = self.elements.write();
        if index >= elements.len() {
            elements.resize_with(index + 1, Value::undefined);
        }
        elements[index] = value;
    }

    /// Append an element
    pub fn push(&self, value: Value) {
        self.elements.write().push(value);
    }

    /// Snapshot of the elements in order
    pub fn elements(&self) -> Vec<Value> {
        self.elements.read().clone()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    /// Check if the array has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.read().is_empty()
    }
}

impl Default for JsArray {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for JsArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.elements.read().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_get() {
        let arr = JsArray::new();
        arr.push(Value::number(1.0));
        arr.push(Value::boolean(true));
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.get(0).unwrap().as_number(), Some(1.0));
        assert_eq!(arr.get(1).unwrap().as_boolean(), Some(true));
        assert!(arr.get(2).is_none());
    }

    #[test]
    fn test_set_pads_with_undefined() {
        let arr = JsArray::new();
        arr.set(2, Value::number(3.0));
        assert_eq!(arr.len(), 3);
        assert!(arr.get(0).unwrap().is_undefined());
        assert!(arr.get(1).unwrap().is_undefined());
        assert_eq!(arr.get(2).unwrap().as_number(), Some(3.0));
    }
}
