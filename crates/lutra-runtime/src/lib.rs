//! # Lutra Runtime
//!
//! Asynchrony surfaces for the Lutra value core:
//! - Promise settlement cells with then/catch/finally registration
//! - A FIFO microtask queue for deferred callback ordering

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod microtask;
pub mod promise;

pub use microtask::{Microtask, MicrotaskQueue};
pub use promise::{JsPromise, PromiseState, PromiseWithResolvers};
