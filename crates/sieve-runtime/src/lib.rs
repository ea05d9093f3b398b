//! Sieve Runtime Library
//!
//! Combinators on top of [`sieve_core`] codecs:
//!
//! - **excess**: exact decoding that rejects undeclared properties
//! - **format**: verbose and one-line reports of validation errors
//! - **env**: typed configuration assembled from environment variables
//! - **constructor**: decode-or-error boundary using the verbose report
//! - **from_enum**: codecs for fixed sets of strings
//!
//! # Example
//!
//! ```rust
//! use sieve_core::{props, Codec};
//! use sieve_runtime::{create_format_errors, excess, FormatErrorOptions};
//! use serde_json::json;
//!
//! let codec = excess(&Codec::type_of(props! { "name" => Codec::string() })).unwrap();
//! let errors = codec.decode(&json!({"name": "x", "nmae": "y"})).unwrap_err();
//!
//! let report = create_format_errors(FormatErrorOptions::verbose())(&errors);
//! assert!(report.contains("excess key \"nmae\" found"));
//! ```

mod constructor;
mod env;
mod error;
mod excess;
mod format;
mod from_enum;
mod shape;

pub use constructor::{create_constructor, Constructor};
pub use env::{parse_env, parse_env_w, EnvParser, EnvSource, MapEnv, ProcessEnv, PropsTree};
pub use error::{ConstructorError, RuntimeError};
pub use excess::{excess, excess_named};
#[allow(deprecated)]
pub use format::{report_error, report_errors};
pub use format::{
    create_format_error, create_format_errors, format_error, format_errors, format_path,
    FormatErrorOptions, FormatStyle,
};
pub use from_enum::{from_enum, from_enum_variants};
pub use shape::{get_props, Shape};
