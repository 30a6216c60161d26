//! # Lutra Core
//!
//! Dynamic value model for embedding JavaScript-style data in Rust hosts.
//!
//! ## Design Principles
//!
//! - **Thread-safe**: Values are `Send + Sync`; heap payloads live behind `Arc`
//! - **NaN-boxing**: Efficient 64-bit value representation
//! - **Closed classification**: runtime kinds map onto exhaustive sum types
//!   ([`Classified`], [`Json`]) so call sites pattern-match without wildcards

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod array;
pub mod classify;
pub mod error;
pub mod json;
pub mod object;
pub mod string;
pub mod value;

pub use array::JsArray;
pub use classify::Classified;
pub use error::{CoreError, CoreResult};
pub use json::Json;
pub use object::JsObject;
pub use string::JsString;
pub use value::{JsSymbol, NativeFn, NativeFunction, Value};
