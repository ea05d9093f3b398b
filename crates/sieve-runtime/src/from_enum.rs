//! Codecs for string enums.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;
use sieve_core::{failure, Codec, Context, CustomCodec, Validation};

use crate::error::RuntimeError;

/// Codec accepting exactly the given strings.
pub fn from_enum<I, S>(values: I, name: impl Into<String>) -> Codec
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Codec::custom(
        name,
        EnumCodec {
            members: values.into_iter().map(Into::into).collect(),
        },
    )
}

/// Codec accepting the serialized form of each variant of a unit-only enum.
///
/// Every variant must serialize to a string.
pub fn from_enum_variants<E: Serialize>(
    variants: &[E],
    name: impl Into<String>,
) -> Result<Codec, RuntimeError> {
    let members = variants
        .iter()
        .map(|variant| match serde_json::to_value(variant)? {
            Value::String(member) => Ok(member),
            other => Err(RuntimeError::InvalidEnumMember(format!(
                "expected a string, got {}",
                other
            ))),
        })
        .collect::<Result<Vec<_>, RuntimeError>>()?;
    Ok(from_enum(members, name))
}

struct EnumCodec {
    members: BTreeSet<String>,
}

impl CustomCodec for EnumCodec {
    fn is(&self, value: &Value) -> bool {
        value
            .as_str()
            .is_some_and(|member| self.members.contains(member))
    }

    fn validate(&self, value: &Value, context: &Context) -> Validation<Value> {
        if self.is(value) {
            Ok(value.clone())
        } else {
            failure(value, context)
        }
    }

    fn encode(&self, value: &Value) -> Value {
        value.clone()
    }
}
