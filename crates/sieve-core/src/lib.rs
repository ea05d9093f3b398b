//! Structural codecs for sieve
//!
//! This crate provides the codec tree the rest of the workspace is built on:
//!
//! - **Codec**: a shared, immutable node (objects, unions, intersections,
//!   refinements, primitives, custom implementations) with a display name
//! - **Decoding**: `decode`/`validate` returning every failure with the
//!   root-to-leaf context that produced it
//! - **Encoding** and **type guards** for already decoded values
//! - **Merge**: shallow record merging used by intersections
//!
//! # Example
//!
//! ```rust
//! use sieve_core::{props, Codec};
//! use serde_json::json;
//!
//! let config = Codec::type_of(props! {
//!     "host" => Codec::string(),
//!     "port" => Codec::number_from_string(),
//! });
//!
//! let decoded = config.decode(&json!({"host": "localhost", "port": "8080"})).unwrap();
//! assert_eq!(decoded, json!({"host": "localhost", "port": 8080}));
//!
//! let errors = config.decode(&json!({"host": 1, "port": "x"})).unwrap_err();
//! assert_eq!(errors.len(), 2);
//! ```

pub mod codec;
pub mod context;
mod decode;
pub mod errors;
pub mod merge;

pub use codec::{name_from_props, Codec, CustomCodec, Node, Predicate, Props};
pub use context::{Context, ContextEntry};
pub use errors::{failure, failure_with_message, Validation, ValidationError, ValidationErrors};
pub use merge::{merge_decoded, Merge, Record};
