//! Decoding, encoding and type guards for every codec node.

use serde_json::{Number, Value};

use crate::codec::{Codec, Node, Props};
use crate::context::Context;
use crate::errors::{failure, Validation, ValidationErrors};
use crate::merge::{merge_decoded, Record};

/// How an object node treats its declared keys.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ObjectMode {
    Total,
    Strict,
    Partial,
}

impl Codec {
    /// Decode `value` from the root.
    pub fn decode(&self, value: &Value) -> Validation<Value> {
        self.validate(value, &Context::root(self, value))
    }

    /// Validate `value` under an existing context.
    ///
    /// The last frame of `context` is expected to name this codec; nested
    /// codecs receive a context extended with their own frame.
    pub fn validate(&self, value: &Value, context: &Context) -> Validation<Value> {
        match self.node() {
            Node::String => accept_if(value.is_string(), value, context),
            Node::Number => accept_if(value.is_number(), value, context),
            Node::Boolean => accept_if(value.is_boolean(), value, context),
            Node::Null => accept_if(value.is_null(), value, context),
            Node::Unknown => Ok(value.clone()),
            Node::UnknownRecord => accept_if(value.is_object(), value, context),
            Node::NumberFromString => match value.as_str().and_then(number_from_str) {
                Some(number) => Ok(Value::Number(number)),
                None => failure(value, context),
            },
            Node::Literal(expected) => accept_if(value == expected, value, context),
            Node::Array(item) => validate_array(item, value, context),
            Node::Interface(props) => validate_object(props, ObjectMode::Total, value, context),
            Node::Strict(props) => validate_object(props, ObjectMode::Strict, value, context),
            Node::Partial(props) => validate_object(props, ObjectMode::Partial, value, context),
            Node::Union(members) => validate_union(members, value, context),
            Node::Intersection(members) => validate_intersection(members, value, context),
            Node::Refinement { inner, predicate } => {
                let decoded = inner.validate(value, context)?;
                if predicate(&decoded) {
                    Ok(decoded)
                } else {
                    failure(&decoded, context)
                }
            }
            Node::Readonly(inner) => inner.validate(value, context),
            Node::Custom(custom) => custom.validate(value, context),
        }
    }

    /// Type guard: whether `value` already has the decoded shape.
    pub fn is(&self, value: &Value) -> bool {
        match self.node() {
            Node::String => value.is_string(),
            Node::Number | Node::NumberFromString => value.is_number(),
            Node::Boolean => value.is_boolean(),
            Node::Null => value.is_null(),
            Node::Unknown => true,
            Node::UnknownRecord => value.is_object(),
            Node::Literal(expected) => value == expected,
            Node::Array(item) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|v| item.is(v))),
            Node::Interface(props) | Node::Strict(props) => value.as_object().is_some_and(|record| {
                props
                    .iter()
                    .all(|(key, codec)| codec.is(record.get(key).unwrap_or(&Value::Null)))
            }),
            Node::Partial(props) => value.as_object().is_some_and(|record| {
                props.iter().all(|(key, codec)| match record.get(key) {
                    Some(v) => codec.is(v),
                    None => true,
                })
            }),
            Node::Union(members) => members.iter().any(|member| member.is(value)),
            Node::Intersection(members) => members.iter().all(|member| member.is(value)),
            Node::Refinement { inner, predicate } => inner.is(value) && predicate(value),
            Node::Readonly(inner) => inner.is(value),
            Node::Custom(custom) => custom.is(value),
        }
    }

    /// Encode an already decoded value.
    pub fn encode(&self, value: &Value) -> Value {
        match self.node() {
            Node::String
            | Node::Number
            | Node::Boolean
            | Node::Null
            | Node::Unknown
            | Node::UnknownRecord
            | Node::Literal(_) => value.clone(),
            Node::NumberFromString => match value {
                Value::Number(number) => Value::String(number.to_string()),
                other => other.clone(),
            },
            Node::Array(item) => match value {
                Value::Array(items) => Value::Array(items.iter().map(|v| item.encode(v)).collect()),
                other => other.clone(),
            },
            Node::Interface(props) | Node::Partial(props) => encode_object(props, value, false),
            Node::Strict(props) => encode_object(props, value, true),
            Node::Union(members) => match members.iter().find(|member| member.is(value)) {
                Some(member) => member.encode(value),
                None => {
                    tracing::debug!(codec = %self.name(), "no union member accepts value, encoding as is");
                    value.clone()
                }
            },
            Node::Intersection(members) => merge_decoded(
                value,
                members.iter().map(|member| member.encode(value)).collect(),
            ),
            Node::Refinement { inner, .. } | Node::Readonly(inner) => inner.encode(value),
            Node::Custom(custom) => custom.encode(value),
        }
    }
}

fn accept_if(accepted: bool, value: &Value, context: &Context) -> Validation<Value> {
    if accepted {
        Ok(value.clone())
    } else {
        failure(value, context)
    }
}

/// Parse a trimmed decimal string into a JSON number.
///
/// Integers stay integers; anything else must be a finite float.
fn number_from_str(input: &str) -> Option<Number> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Number::from(int));
    }
    let float = trimmed.parse::<f64>().ok()?;
    // Whole floats outside the i64 range, e.g. "1e19", stay floats.
    if float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
        return Some(Number::from(float as i64));
    }
    Number::from_f64(float)
}

fn validate_array(item: &Codec, value: &Value, context: &Context) -> Validation<Value> {
    let Some(items) = value.as_array() else {
        return failure(value, context);
    };

    let mut errors = ValidationErrors::new();
    let mut decoded = Vec::with_capacity(items.len());
    for (index, element) in items.iter().enumerate() {
        match item.validate(element, &context.append(index.to_string(), item, element)) {
            Ok(v) => decoded.push(v),
            Err(e) => errors.merge(e),
        }
    }

    if errors.is_empty() {
        Ok(Value::Array(decoded))
    } else {
        Err(errors)
    }
}

fn validate_object(
    props: &Props,
    mode: ObjectMode,
    value: &Value,
    context: &Context,
) -> Validation<Value> {
    let Some(record) = value.as_object() else {
        return failure(value, context);
    };

    let mut errors = ValidationErrors::new();
    let mut output: Record = record.clone();

    for (key, codec) in props {
        let present = record.get(key);
        if present.is_none() && mode == ObjectMode::Partial {
            continue;
        }

        // A missing required key is checked as null.
        let actual = present.unwrap_or(&Value::Null);
        match codec.validate(actual, &context.append(key.as_str(), codec, actual)) {
            Ok(decoded) => {
                if present.is_some() || !decoded.is_null() {
                    output.insert(key.clone(), decoded);
                }
            }
            Err(e) => errors.merge(e),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    if mode == ObjectMode::Strict {
        output.retain(|key, _| props.contains_key(key));
    }
    Ok(Value::Object(output))
}

fn validate_union(members: &[Codec], value: &Value, context: &Context) -> Validation<Value> {
    let mut errors = ValidationErrors::new();
    for (index, member) in members.iter().enumerate() {
        match member.validate(value, &context.append(index.to_string(), member, value)) {
            Ok(decoded) => return Ok(decoded),
            Err(e) => errors.merge(e),
        }
    }

    if errors.is_empty() {
        failure(value, context)
    } else {
        Err(errors)
    }
}

fn validate_intersection(
    members: &[Codec],
    value: &Value,
    context: &Context,
) -> Validation<Value> {
    let mut errors = ValidationErrors::new();
    let mut results = Vec::with_capacity(members.len());
    for (index, member) in members.iter().enumerate() {
        match member.validate(value, &context.append(index.to_string(), member, value)) {
            Ok(decoded) => results.push(decoded),
            Err(e) => errors.merge(e),
        }
    }

    if errors.is_empty() {
        Ok(merge_decoded(value, results))
    } else {
        Err(errors)
    }
}

fn encode_object(props: &Props, value: &Value, strict: bool) -> Value {
    let Value::Object(record) = value else {
        return value.clone();
    };

    let mut output = Record::new();
    for (key, v) in record {
        match props.get(key) {
            Some(codec) => {
                output.insert(key.clone(), codec.encode(v));
            }
            None if !strict => {
                output.insert(key.clone(), v.clone());
            }
            None => {}
        }
    }
    Value::Object(output)
}
