use thiserror::Error;

/// Construction-time errors: the caller handed over something the
/// combinators cannot work with. These never occur while decoding.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Codec \"{codec}\" needs to be of type: {expected}")]
    UnsupportedShape {
        codec: String,
        expected: &'static str,
    },

    #[error("Invalid defaults: {0}")]
    InvalidDefaults(String),

    #[error("Invalid enum member: {0}")]
    InvalidEnumMember(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Raised by [`Constructor`](crate::Constructor) when a value is rejected.
#[derive(Error, Debug)]
pub enum ConstructorError {
    /// The formatted validation errors.
    #[error("{0}")]
    Rejected(String),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}
