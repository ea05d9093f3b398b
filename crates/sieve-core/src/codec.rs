//! Structural codecs using algebraic data types
//!
//! A [`Codec`] pairs a validator with an encoder for one value shape. Codecs
//! are immutable trees shared behind an [`Arc`], so wrapping a codec in a
//! combinator never copies it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::errors::Validation;

/// Declared properties of an object shape, keyed by property name.
pub type Props = BTreeMap<String, Codec>;

/// Predicate used by refinement codecs.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Extension seam for codecs that are not one of the built-in shapes.
///
/// Implementors see the context whose last frame is the custom codec itself
/// and must never panic on malformed input; failures are returned as values.
pub trait CustomCodec: Send + Sync {
    /// Type guard: does `value` already have the decoded shape?
    fn is(&self, value: &Value) -> bool;

    /// Validate and decode `value` under `context`.
    fn validate(&self, value: &Value, context: &Context) -> Validation<Value>;

    /// Encode an already decoded value.
    fn encode(&self, value: &Value) -> Value;
}

/// Core codec representation
#[derive(Clone)]
pub enum Node {
    /// Primitive types
    String,
    Number,
    Boolean,
    Null,
    Unknown,
    UnknownRecord,

    /// A string carrying a number, decoded into that number
    NumberFromString,

    /// Exactly one value
    Literal(Value),

    /// Compound types
    Array(Codec),

    /// Object where every declared key is required
    Interface(Props),

    /// Object where every declared key is required and undeclared keys are dropped
    Strict(Props),

    /// Object where every declared key is optional
    Partial(Props),

    /// Matches at least one of the members, tried in order
    Union(Vec<Codec>),

    /// Matches every member, results are merged
    Intersection(Vec<Codec>),

    /// Inner codec plus a predicate on the decoded value
    Refinement { inner: Codec, predicate: Predicate },

    /// Read-only view of the inner codec
    Readonly(Codec),

    /// User supplied implementation
    Custom(Arc<dyn CustomCodec>),
}

impl Node {
    /// Structural tag of this node, used in diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            Node::String => "StringType",
            Node::Number => "NumberType",
            Node::Boolean => "BooleanType",
            Node::Null => "NullType",
            Node::Unknown => "UnknownType",
            Node::UnknownRecord => "UnknownRecordType",
            Node::NumberFromString => "NumberFromStringType",
            Node::Literal(_) => "LiteralType",
            Node::Array(_) => "ArrayType",
            Node::Interface(_) => "InterfaceType",
            Node::Strict(_) => "StrictType",
            Node::Partial(_) => "PartialType",
            Node::Union(_) => "UnionType",
            Node::Intersection(_) => "IntersectionType",
            Node::Refinement { .. } => "RefinementType",
            Node::Readonly(_) => "ReadonlyType",
            Node::Custom(_) => "CustomType",
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

struct CodecInner {
    name: String,
    node: Node,
}

/// A shared, immutable codec.
#[derive(Clone)]
pub struct Codec {
    inner: Arc<CodecInner>,
}

impl Codec {
    /// Build a codec from a node and a display name.
    pub fn new(name: impl Into<String>, node: Node) -> Self {
        Self {
            inner: Arc::new(CodecInner {
                name: name.into(),
                node,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn node(&self) -> &Node {
        &self.inner.node
    }

    /// Whether two handles point at the same codec.
    pub fn ptr_eq(&self, other: &Codec) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // --- Primitive constructors ---

    pub fn string() -> Self {
        Self::new("string", Node::String)
    }

    pub fn number() -> Self {
        Self::new("number", Node::Number)
    }

    pub fn boolean() -> Self {
        Self::new("boolean", Node::Boolean)
    }

    pub fn null() -> Self {
        Self::new("null", Node::Null)
    }

    pub fn unknown() -> Self {
        Self::new("unknown", Node::Unknown)
    }

    /// Any JSON object, regardless of its keys.
    pub fn unknown_record() -> Self {
        Self::new("{ [K in string]: unknown }", Node::UnknownRecord)
    }

    /// Decodes a numeric string such as `"42"` or `"1.5"` into a number.
    pub fn number_from_string() -> Self {
        Self::new("NumberFromString", Node::NumberFromString)
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::new(value.to_string(), Node::Literal(value))
    }

    // --- Compound constructors ---

    pub fn array(item: Codec) -> Self {
        Self::new(format!("Array<{}>", item.name()), Node::Array(item))
    }

    /// Object with required keys.
    pub fn type_of(props: Props) -> Self {
        let name = format!("{{ {} }}", name_from_props(&props));
        Self::new(name, Node::Interface(props))
    }

    pub fn type_named(props: Props, name: impl Into<String>) -> Self {
        Self::new(name, Node::Interface(props))
    }

    /// Object with required keys whose decoded value keeps only declared keys.
    pub fn strict(props: Props) -> Self {
        let name = format!("{{| {} |}}", name_from_props(&props));
        Self::new(name, Node::Strict(props))
    }

    /// Object with optional keys.
    pub fn partial(props: Props) -> Self {
        let name = format!("Partial<{{ {} }}>", name_from_props(&props));
        Self::new(name, Node::Partial(props))
    }

    pub fn partial_named(props: Props, name: impl Into<String>) -> Self {
        Self::new(name, Node::Partial(props))
    }

    pub fn union(members: Vec<Codec>) -> Self {
        let name = format!("({})", join_names(&members, " | "));
        Self::new(name, Node::Union(members))
    }

    pub fn union_named(members: Vec<Codec>, name: impl Into<String>) -> Self {
        Self::new(name, Node::Union(members))
    }

    pub fn intersection(members: Vec<Codec>) -> Self {
        let name = format!("({})", join_names(&members, " & "));
        Self::new(name, Node::Intersection(members))
    }

    pub fn intersection_named(members: Vec<Codec>, name: impl Into<String>) -> Self {
        Self::new(name, Node::Intersection(members))
    }

    /// Narrow `inner` to the decoded values accepted by `predicate`.
    pub fn refinement<F>(inner: Codec, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::new(
            name,
            Node::Refinement {
                inner,
                predicate: Arc::new(predicate),
            },
        )
    }

    pub fn readonly(inner: Codec) -> Self {
        let name = format!("Readonly<{}>", inner.name());
        Self::new(name, Node::Readonly(inner))
    }

    pub fn custom(name: impl Into<String>, codec: impl CustomCodec + 'static) -> Self {
        Self::new(name, Node::Custom(Arc::new(codec)))
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("name", &self.name())
            .field("node", self.node())
            .finish()
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Render props as `k1: T1, k2: T2`.
pub fn name_from_props(props: &Props) -> String {
    props
        .iter()
        .map(|(key, codec)| format!("{}: {}", key, codec.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_names(codecs: &[Codec], separator: &str) -> String {
    codecs
        .iter()
        .map(|codec| codec.name())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Build a [`Props`] map from `key => codec` pairs.
///
/// ```
/// use sieve_core::{props, Codec};
///
/// let codec = Codec::type_of(props! { "foo" => Codec::string() });
/// assert_eq!(codec.name(), "{ foo: string }");
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::Props::new()
    };
    ($($key:expr => $codec:expr),+ $(,)?) => {{
        let mut props = $crate::Props::new();
        $(
            props.insert(::std::string::String::from($key), $codec);
        )+
        props
    }};
}
