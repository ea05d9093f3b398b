//! Decode-or-error boundary.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sieve_core::Codec;

use crate::error::ConstructorError;
use crate::format::{format_errors, FormatStyle};

/// Pair `codec` with a constructor that raises on invalid input.
pub fn create_constructor(codec: &Codec) -> Constructor {
    Constructor {
        codec: codec.clone(),
    }
}

/// A codec together with its constructor.
#[derive(Debug, Clone)]
pub struct Constructor {
    codec: Codec,
}

impl Constructor {
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Decode `value`, rejecting it with the verbose report on failure.
    pub fn parse(&self, value: &Value) -> Result<Value, ConstructorError> {
        self.codec.decode(value).map_err(|errors| {
            tracing::debug!(codec = %self.codec.name(), errors = errors.len(), "constructor rejected value");
            ConstructorError::Rejected(format_errors(&errors, FormatStyle::Verbose))
        })
    }

    /// Decode `value` and deserialize the result into `T`.
    pub fn parse_into<T: DeserializeOwned>(&self, value: &Value) -> Result<T, ConstructorError> {
        let decoded = self.parse(value)?;
        Ok(serde_json::from_value(decoded)?)
    }

    /// Validate an already typed value by passing it through the codec.
    pub fn from<T>(&self, value: &T) -> Result<T, ConstructorError>
    where
        T: Serialize + DeserializeOwned,
    {
        let value = serde_json::to_value(value)?;
        self.parse_into(&value)
    }
}
