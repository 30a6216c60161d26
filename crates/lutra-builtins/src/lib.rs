//! # Lutra Builtins
//!
//! Built-in surfaces over the Lutra value core. Currently the JSON codec:
//! text decoding delegates to `serde_json`; serialization control (replacer,
//! indentation, circular detection, number formatting) lives here.

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod json;
