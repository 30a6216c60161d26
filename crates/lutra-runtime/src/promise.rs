//! Promise settlement cells over Lutra values
//!
//! A [`JsPromise`] settles exactly once; later settlements are no-ops.
//! Callbacks come in two flavors: the plain forms run immediately when the
//! promise is (or becomes) settled, and the `*_with_enqueue` forms defer
//! every callback through a caller-supplied hook, which paired with
//! [`crate::MicrotaskQueue`] gives deferred callback ordering.
//!
//! ## Rust API
//!
//! Create promises with detached handles using `with_resolvers()`:
//!
//! ```
//! use lutra_core::Value;
//! use lutra_runtime::JsPromise;
//!
//! let resolvers = JsPromise::with_resolvers();
//! resolvers.promise.then(|v| assert_eq!(v.as_number(), Some(42.0)));
//! (resolvers.resolve)(Value::number(42.0));
//! assert!(resolvers.promise.is_fulfilled());
//! ```

use lutra_core::{JsArray, Value};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Promise state
#[derive(Debug, Clone)]
pub enum PromiseState {
    /// Not yet settled
    Pending,
    /// Resolved with value
    Fulfilled(Value),
    /// Rejected with error
    Rejected(Value),
}

impl PromiseState {
    /// Check if settled (fulfilled or rejected)
    pub fn is_settled(&self) -> bool {
        !matches!(self, PromiseState::Pending)
    }
}

/// Callback for promise settlement
type SettleCallback = Box<dyn FnOnce(Value) + Send>;

/// A promise over dynamic values
pub struct JsPromise {
    /// Current state
    state: Mutex<PromiseState>,
    /// Callbacks to run on fulfillment
    on_fulfilled: Mutex<Vec<SettleCallback>>,
    /// Callbacks to run on rejection
    on_rejected: Mutex<Vec<SettleCallback>>,
    /// Callbacks to run on settlement (finally)
    on_finally: Mutex<Vec<Box<dyn FnOnce() + Send>>>,
}

/// Result of [`JsPromise::with_resolvers`]
///
/// Provides a promise along with its resolve and reject functions for manual
/// control.
pub struct PromiseWithResolvers {
    /// The promise
    pub promise: Arc<JsPromise>,
    /// Function to resolve the promise
    pub resolve: Arc<dyn Fn(Value) + Send + Sync>,
    /// Function to reject the promise
    pub reject: Arc<dyn Fn(Value) + Send + Sync>,
}

impl JsPromise {
    /// Create a new pending promise
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create an already resolved promise
    pub fn resolved(value: Value) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(PromiseState::Fulfilled(value)),
            ..Self::default()
        })
    }

    /// Create an already rejected promise
    pub fn rejected(error: Value) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(PromiseState::Rejected(error)),
            ..Self::default()
        })
    }

    /// Create a promise with resolve/reject handles
    ///
    /// This is the way to create promises when you need to settle them later
    /// (e.g., from callbacks or async operations).
    pub fn with_resolvers() -> PromiseWithResolvers {
        let promise = JsPromise::new();

        let resolve = {
            let p = promise.clone();
            Arc::new(move |v: Value| p.resolve(v)) as Arc<dyn Fn(Value) + Send + Sync>
        };
        let reject = {
            let p = promise.clone();
            Arc::new(move |e: Value| p.reject(e)) as Arc<dyn Fn(Value) + Send + Sync>
        };

        PromiseWithResolvers {
            promise,
            resolve,
            reject,
        }
    }

    /// Resolve the promise with a value
    ///
    /// If the promise is already settled, this is a no-op. Callbacks
    /// registered via `then()` are called synchronously; for deferred
    /// ordering use `resolve_with_enqueue()`.
    pub fn resolve(&self, value: Value) {
        let mut state = self.state.lock();
        if matches!(*state, PromiseState::Pending) {
            *state = PromiseState::Fulfilled(value.clone());
            drop(state);

            let callbacks = std::mem::take(&mut *self.on_fulfilled.lock());
            for callback in callbacks {
                callback(value.clone());
            }

            let finally_callbacks = std::mem::take(&mut *self.on_finally.lock());
            for callback in finally_callbacks {
                callback();
            }
        }
    }

    /// Resolve the promise, enqueueing callbacks via the provided function
    pub fn resolve_with_enqueue<E>(&self, value: Value, enqueue: E)
    where
        E: Fn(Box<dyn FnOnce() + Send>),
    {
        let mut state = self.state.lock();
        if matches!(*state, PromiseState::Pending) {
            *state = PromiseState::Fulfilled(value.clone());
            drop(state);

            let callbacks = std::mem::take(&mut *self.on_fulfilled.lock());
            for callback in callbacks {
                let v = value.clone();
                enqueue(Box::new(move || callback(v)));
            }

            let finally_callbacks = std::mem::take(&mut *self.on_finally.lock());
            for callback in finally_callbacks {
                enqueue(Box::new(callback));
            }
        }
    }

    /// Reject the promise with an error
    ///
    /// If the promise is already settled, this is a no-op.
    pub fn reject(&self, error: Value) {
        let mut state = self.state.lock();
        if matches!(*state, PromiseState::Pending) {
            *state = PromiseState::Rejected(error.clone());
            drop(state);

            let callbacks = std::mem::take(&mut *self.on_rejected.lock());
            for callback in callbacks {
                callback(error.clone());
            }

            let finally_callbacks = std::mem::take(&mut *self.on_finally.lock());
            for callback in finally_callbacks {
                callback();
            }
        }
    }

    /// Reject the promise, enqueueing callbacks via the provided function
    pub fn reject_with_enqueue<E>(&self, error: Value, enqueue: E)
    where
        E: Fn(Box<dyn FnOnce() + Send>),
    {
        let mut state = self.state.lock();
        if matches!(*state, PromiseState::Pending) {
            *state = PromiseState::Rejected(error.clone());
            drop(state);

            let callbacks = std::mem::take(&mut *self.on_rejected.lock());
            for callback in callbacks {
                let e = error.clone();
                enqueue(Box::new(move || callback(e)));
            }

            let finally_callbacks = std::mem::take(&mut *self.on_finally.lock());
            for callback in finally_callbacks {
                enqueue(Box::new(callback));
            }
        }
    }

    /// Register a fulfillment callback
    ///
    /// If the promise is already fulfilled, the callback is called
    /// immediately.
    pub fn then<F>(&self, callback: F)
    where
        F: FnOnce(Value) + Send + 'static,
    {
        let state = self.state.lock().clone();
        match state {
            PromiseState::Fulfilled(value) => callback(value),
            PromiseState::Pending => {
                self.on_fulfilled.lock().push(Box::new(callback));
            }
            PromiseState::Rejected(_) => {}
        }
    }

    /// Register a fulfillment callback with deferred enqueueing
    ///
    /// If the promise is already fulfilled, the callback is enqueued rather
    /// than called immediately.
    pub fn then_with_enqueue<F, E>(&self, callback: F, enqueue: E)
    where
        F: FnOnce(Value) + Send + 'static,
        E: Fn(Box<dyn FnOnce() + Send>),
    {
        let state = self.state.lock().clone();
        match state {
            PromiseState::Fulfilled(value) => {
                enqueue(Box::new(move || callback(value)));
            }
            PromiseState::Pending => {
                self.on_fulfilled.lock().push(Box::new(callback));
            }
            PromiseState::Rejected(_) => {}
        }
    }

    /// Register a rejection callback
    ///
    /// If the promise is already rejected, the callback is called
    /// immediately.
    pub fn catch<F>(&self, callback: F)
    where
        F: FnOnce(Value) + Send + 'static,
    {
        let state = self.state.lock().clone();
        match state {
            PromiseState::Rejected(error) => callback(error),
            PromiseState::Pending => {
                self.on_rejected.lock().push(Box::new(callback));
            }
            PromiseState::Fulfilled(_) => {}
        }
    }

    /// Register a rejection callback with deferred enqueueing
    pub fn catch_with_enqueue<F, E>(&self, callback: F, enqueue: E)
    where
        F: FnOnce(Value) + Send + 'static,
        E: Fn(Box<dyn FnOnce() + Send>),
    {
        let state = self.state.lock().clone();
        match state {
            PromiseState::Rejected(error) => {
                enqueue(Box::new(move || callback(error)));
            }
            PromiseState::Pending => {
                self.on_rejected.lock().push(Box::new(callback));
            }
            PromiseState::Fulfilled(_) => {}
        }
    }

    /// Register a finally callback (runs on either fulfillment or rejection)
    ///
    /// If the promise is already settled, the callback is called immediately.
    pub fn finally<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let state = self.state.lock().clone();
        match state {
            PromiseState::Fulfilled(_) | PromiseState::Rejected(_) => callback(),
            PromiseState::Pending => {
                self.on_finally.lock().push(Box::new(callback));
            }
        }
    }

    /// Register a finally callback with deferred enqueueing
    pub fn finally_with_enqueue<F, E>(&self, callback: F, enqueue: E)
    where
        F: FnOnce() + Send + 'static,
        E: Fn(Box<dyn FnOnce() + Send>),
    {
        let state = self.state.lock().clone();
        match state {
            PromiseState::Fulfilled(_) | PromiseState::Rejected(_) => {
                enqueue(Box::new(callback));
            }
            PromiseState::Pending => {
                self.on_finally.lock().push(Box::new(callback));
            }
        }
    }

    /// Get current state
    pub fn state(&self) -> PromiseState {
        self.state.lock().clone()
    }

    /// Check if promise is pending
    pub fn is_pending(&self) -> bool {
        matches!(*self.state.lock(), PromiseState::Pending)
    }

    /// Check if promise is fulfilled
    pub fn is_fulfilled(&self) -> bool {
        matches!(*self.state.lock(), PromiseState::Fulfilled(_))
    }

    /// Check if promise is rejected
    pub fn is_rejected(&self) -> bool {
        matches!(*self.state.lock(), PromiseState::Rejected(_))
    }

    /// Check if promise is settled (fulfilled or rejected)
    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    /// Join promises: fulfills with an array of all results in input order,
    /// or rejects with the first rejection
    pub fn all(promises: impl IntoIterator<Item = Arc<JsPromise>>) -> Arc<JsPromise> {
        let promises: Vec<_> = promises.into_iter().collect();
        let result = JsPromise::new();

        if promises.is_empty() {
            result.resolve(Value::array(Arc::new(JsArray::new())));
            return result;
        }

        let results = Arc::new(Mutex::new(vec![Value::undefined(); promises.len()]));
        let remaining = Arc::new(AtomicUsize::new(promises.len()));

        for (index, promise) in promises.into_iter().enumerate() {
            let results = results.clone();
            let remaining = remaining.clone();
            let result_ok = result.clone();
            promise.then(move |v| {
                results.lock()[index] = v;
                if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                    let collected = std::mem::take(&mut *results.lock());
                    result_ok.resolve(Value::array(Arc::new(JsArray::from_vec(collected))));
                }
            });

            let result_err = result.clone();
            promise.catch(move |e| result_err.reject(e));
        }

        result
    }

    /// Race promises: settles like whichever input settles first
    pub fn race(promises: impl IntoIterator<Item = Arc<JsPromise>>) -> Arc<JsPromise> {
        let result = JsPromise::new();

        for promise in promises {
            let result_ok = result.clone();
            promise.then(move |v| result_ok.resolve(v));

            let result_err = result.clone();
            promise.catch(move |e| result_err.reject(e));
        }

        result
    }
}

impl Default for JsPromise {
    fn default() -> Self {
        Self {
            state: Mutex::new(PromiseState::Pending),
            on_fulfilled: Mutex::new(Vec::new()),
            on_rejected: Mutex::new(Vec::new()),
            on_finally: Mutex::new(Vec::new()),
        }
    }
}

impl std::fmt::Debug for JsPromise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        match &*state {
            PromiseState::Pending => write!(f, "Promise {{ <pending> }}"),
            PromiseState::Fulfilled(v) => write!(f, "Promise {{ <fulfilled>: {:?} }}", v),
            PromiseState::Rejected(v) => write!(f, "Promise {{ <rejected>: {:?} }}", v),
        }
    }
}
