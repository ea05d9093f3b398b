//! Validation error types for sieve codecs.
//!
//! A failed decode yields one [`ValidationError`] per independent
//! root-to-leaf failure, collected in a [`ValidationErrors`] in the order the
//! combinators attempted branches and properties.

use std::fmt;

use serde_json::Value;

use crate::context::Context;

/// Result of validating or decoding with a codec.
pub type Validation<T> = Result<T, ValidationErrors>;

/// Every failure of one decode, in the order the combinators found them.
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Append the failures of a later branch or property.
    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "decode failed without errors"),
            [only] => write!(f, "{}", only),
            all => {
                write!(f, "decode failed with {} errors", all.len())?;
                for error in all {
                    write!(f, "\n- {}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl FromIterator<ValidationError> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// A single point of disagreement between a value and a codec.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The offending value.
    pub value: Value,

    /// Frames from the decode root to the failure.
    pub context: Context,

    /// Optional human-readable message, e.g. `excess key "bar" found`.
    pub message: Option<String>,
}

impl ValidationError {
    pub fn new(value: Value, context: Context) -> Self {
        Self {
            value,
            context,
            message: None,
        }
    }

    /// Replace the generic description with `message`.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}", message),
            None => write!(
                f,
                "Invalid value {} supplied to {}",
                self.value,
                self.context.describe()
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Fail with a single error at `context`.
pub fn failure<T>(value: &Value, context: &Context) -> Validation<T> {
    Err(ValidationError::new(value.clone(), context.clone()).into())
}

/// Fail with a single error at `context` carrying `message`.
pub fn failure_with_message<T>(
    value: &Value,
    context: &Context,
    message: impl Into<String>,
) -> Validation<T> {
    Err(ValidationError::new(value.clone(), context.clone())
        .with_message(message)
        .into())
}
