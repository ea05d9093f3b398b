//! Excess-free decoding.
//!
//! [`excess`] derives a codec that behaves like the given one but also fails
//! when a decoded object carries property names the codec never declared.
//!
//! ```rust
//! use sieve_core::{props, Codec};
//! use sieve_runtime::excess;
//! use serde_json::json;
//!
//! let loose = Codec::type_of(props! { "a" => Codec::string() });
//! let exact = excess(&loose).unwrap();
//!
//! assert!(loose.decode(&json!({"a": "foo", "b": "bar"})).is_ok());
//! assert!(exact.decode(&json!({"a": "foo", "b": "bar"})).is_err());
//! ```

use serde_json::Value;
use sieve_core::{name_from_props, Codec, Context, CustomCodec, Props, Record, Validation};
use sieve_core::{failure, ValidationError, ValidationErrors};

use crate::error::RuntimeError;
use crate::shape::{get_props, Shape};

/// Derive an excess-free codec with a generated name.
///
/// Fails if `codec` is not built from object shapes, refinements, read-only
/// wrappers, intersections and unions.
pub fn excess(codec: &Codec) -> Result<Codec, RuntimeError> {
    derive(codec, None)
}

/// Derive an excess-free codec with an explicit display name.
pub fn excess_named(codec: &Codec, name: impl Into<String>) -> Result<Codec, RuntimeError> {
    derive(codec, Some(name.into()))
}

fn derive(codec: &Codec, name: Option<String>) -> Result<Codec, RuntimeError> {
    let name = name.unwrap_or_else(|| excess_name(codec));
    match Shape::of(codec) {
        Shape::Union(members) => {
            // Logged only; each branch gets its own exact boundary below.
            let reachable = get_props(codec)?;
            tracing::debug!(
                codec = %codec.name(),
                branches = members.len(),
                reachable = reachable.len(),
                "deriving excess union"
            );

            let wrapped = members
                .iter()
                .map(excess)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Codec::union_named(wrapped, name))
        }
        _ => {
            let props = get_props(codec)?;
            tracing::debug!(codec = %codec.name(), props = props.len(), "deriving excess codec");

            Ok(Codec::custom(
                name,
                ExcessCodec {
                    underlying: codec.clone(),
                    props,
                },
            ))
        }
    }
}

fn excess_name(codec: &Codec) -> String {
    match Shape::of(codec) {
        Shape::TotalObject(props) => format!("{{| {} |}}", name_from_props(props)),
        Shape::PartialObject(props) => format!("Partial<{{| {} |}}>", name_from_props(props)),
        _ => format!("Excess<{}>", codec.name()),
    }
}

/// Keys of `record` that `props` does not declare, in record order.
fn excess_keys<'a>(record: &'a Record, props: &Props) -> Vec<&'a String> {
    record
        .keys()
        .filter(|key| !props.contains_key(key.as_str()))
        .collect()
}

struct ExcessCodec {
    underlying: Codec,
    props: Props,
}

impl CustomCodec for ExcessCodec {
    fn is(&self, value: &Value) -> bool {
        match value.as_object() {
            Some(record) => {
                excess_keys(record, &self.props).is_empty() && self.underlying.is(value)
            }
            None => false,
        }
    }

    fn validate(&self, value: &Value, context: &Context) -> Validation<Value> {
        let Some(record) = value.as_object() else {
            return failure(value, context);
        };

        // Keys are checked on the input: strict members drop unknown keys while decoding.
        let decoded = self.underlying.validate(value, context)?;
        let errors: ValidationErrors = excess_keys(record, &self.props)
            .into_iter()
            .map(|key| {
                ValidationError::new(record[key.as_str()].clone(), context.clone())
                    .with_message(format!("excess key \"{}\" found", key))
            })
            .collect();

        if errors.is_empty() {
            Ok(decoded)
        } else {
            Err(errors)
        }
    }

    fn encode(&self, value: &Value) -> Value {
        match value {
            Value::Object(record) => {
                let leftover = excess_keys(record, &self.props);
                debug_assert!(leftover.is_empty(), "encoding a value with excess keys: {:?}", leftover);

                let stripped: Record = record
                    .iter()
                    .filter(|(key, _)| self.props.contains_key(key.as_str()))
                    .map(|(key, v)| (key.clone(), v.clone()))
                    .collect();
                self.underlying.encode(&Value::Object(stripped))
            }
            other => self.underlying.encode(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sieve_core::props;

    #[test]
    fn test_generated_names() {
        let object = Codec::type_of(props! { "a" => Codec::string(), "b" => Codec::number() });
        assert_eq!(excess(&object).unwrap().name(), "{| a: string, b: number |}");

        let partial = Codec::partial(props! { "a" => Codec::string() });
        assert_eq!(excess(&partial).unwrap().name(), "Partial<{| a: string |}>");

        let intersection = Codec::intersection(vec![object.clone(), partial.clone()]);
        assert_eq!(
            excess(&intersection).unwrap().name(),
            format!("Excess<{}>", intersection.name())
        );

        let union = Codec::union(vec![object, partial]);
        let derived = excess(&union).unwrap();
        assert_eq!(derived.name(), format!("Excess<{}>", union.name()));
        assert_eq!(
            derived.name(),
            "Excess<({ a: string, b: number } | Partial<{ a: string }>)>"
        );
    }

    #[test]
    fn test_explicit_name() {
        let object = Codec::type_of(props! { "a" => Codec::string() });
        assert_eq!(excess_named(&object, "Exact").unwrap().name(), "Exact");
    }

    #[test]
    fn test_union_branches_are_wrapped_independently() {
        let union = Codec::union(vec![
            Codec::type_of(props! { "a" => Codec::string() }),
            Codec::partial(props! { "b" => Codec::number() }),
        ]);
        let derived = excess(&union).unwrap();

        let Shape::Union(members) = Shape::of(&derived) else {
            panic!("expected a union, got {:?}", derived);
        };
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name(), "{| a: string |}");
        assert_eq!(members[1].name(), "Partial<{| b: number |}>");
        assert!(members.iter().all(|m| matches!(Shape::of(m), Shape::Other)));
    }

    #[test]
    fn test_excess_key_errors() {
        let codec = excess(&Codec::type_of(props! { "foo" => Codec::string() })).unwrap();
        let errors = codec
            .decode(&json!({"foo": "a", "bar": "b", "baz": 1}))
            .unwrap_err();

        let messages: Vec<_> = errors.iter().filter_map(|e| e.message.clone()).collect();
        assert_eq!(
            messages,
            vec!["excess key \"bar\" found", "excess key \"baz\" found"]
        );
        assert_eq!(errors.errors[0].value, json!("b"));
        assert_eq!(errors.errors[1].value, json!(1));
        assert_eq!(errors.errors[0].context.len(), 1);
    }

    #[test]
    fn test_strict_objects_report_input_keys() {
        let codec = excess(&Codec::strict(props! { "foo" => Codec::string() })).unwrap();
        let input = json!({"foo": "a", "bar": "b"});

        let errors = codec.decode(&input).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].message.as_deref(), Some("excess key \"bar\" found"));
        assert_eq!(errors.errors[0].value, json!("b"));
        assert!(!codec.is(&input));
    }

    #[test]
    fn test_shape_errors_win_over_excess_keys() {
        let codec = excess(&Codec::type_of(props! { "foo" => Codec::string() })).unwrap();
        let errors = codec.decode(&json!({"foo": 1, "bar": "b"})).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors.errors[0].message.is_none());
        assert_eq!(errors.errors[0].context.last().unwrap().key, "foo");
    }

    #[test]
    fn test_non_records_are_rejected() {
        let codec = excess(&Codec::partial(props! { "foo" => Codec::string() })).unwrap();
        assert!(codec.decode(&json!("foo")).is_err());
        assert!(codec.decode(&json!(["foo"])).is_err());
        assert!(!codec.is(&json!(null)));
    }

    #[test]
    fn test_is_checks_keys_and_shape() {
        let codec = excess(&Codec::type_of(props! { "foo" => Codec::string() })).unwrap();
        assert!(codec.is(&json!({"foo": "a"})));
        assert!(!codec.is(&json!({"foo": "a", "bar": "b"})));
        assert!(!codec.is(&json!({"foo": 1})));
    }

    #[test]
    fn test_encode_delegates_to_underlying() {
        let codec = excess(&Codec::type_of(props! {
            "port" => Codec::number_from_string(),
        }))
        .unwrap();
        let decoded = codec.decode(&json!({"port": "8080"})).unwrap();
        assert_eq!(decoded, json!({"port": 8080}));
        assert_eq!(codec.encode(&decoded), json!({"port": "8080"}));
    }

    #[test]
    fn test_unsupported_shapes() {
        for codec in [
            Codec::string(),
            Codec::array(Codec::type_of(props! { "a" => Codec::string() })),
            Codec::union(vec![Codec::string(), Codec::number()]),
        ] {
            let err = excess(&codec).unwrap_err();
            assert!(
                matches!(err, RuntimeError::UnsupportedShape { .. }),
                "{} should be rejected",
                codec.name()
            );
        }
    }

    #[test]
    fn test_excess_of_excess_is_rejected() {
        let exact = excess(&Codec::type_of(props! { "a" => Codec::string() })).unwrap();
        assert!(excess(&exact).is_err());
    }
}
