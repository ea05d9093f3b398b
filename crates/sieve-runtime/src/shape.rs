//! Shape introspection.
//!
//! Classifies a codec by its structural tag and recovers the flattened set of
//! property names an arbitrary nesting of object shapes declares.

use sieve_core::{Codec, Node, Props};

use crate::error::RuntimeError;

/// Structural view of a codec, as far as property traversal is concerned.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    TotalObject(&'a Props),
    StrictObject(&'a Props),
    PartialObject(&'a Props),
    Union(&'a [Codec]),
    Intersection(&'a [Codec]),
    Refinement(&'a Codec),
    Readonly(&'a Codec),
    Other,
}

impl<'a> Shape<'a> {
    pub fn of(codec: &'a Codec) -> Self {
        match codec.node() {
            Node::Interface(props) => Shape::TotalObject(props),
            Node::Strict(props) => Shape::StrictObject(props),
            Node::Partial(props) => Shape::PartialObject(props),
            Node::Union(members) => Shape::Union(members),
            Node::Intersection(members) => Shape::Intersection(members),
            Node::Refinement { inner, .. } => Shape::Refinement(inner),
            Node::Readonly(inner) => Shape::Readonly(inner),
            Node::String
            | Node::Number
            | Node::Boolean
            | Node::Null
            | Node::Unknown
            | Node::UnknownRecord
            | Node::NumberFromString
            | Node::Literal(_)
            | Node::Array(_)
            | Node::Custom(_) => Shape::Other,
        }
    }

    /// Declared props of a leaf object shape.
    pub fn props(&self) -> Option<&'a Props> {
        match *self {
            Shape::TotalObject(props) | Shape::StrictObject(props) | Shape::PartialObject(props) => {
                Some(props)
            }
            _ => None,
        }
    }

    pub fn is_union(&self) -> bool {
        matches!(self, Shape::Union(_))
    }
}

pub(crate) const HAS_PROPS: &str =
    "Interface | Strict | Partial | Refinement | Readonly | Intersection | Union";

/// Flattened props of `codec`.
///
/// Refinements and read-only wrappers are transparent, intersections merge
/// their members (later members win on a name collision) and unions add up
/// the props of every branch.
pub fn get_props(codec: &Codec) -> Result<Props, RuntimeError> {
    match Shape::of(codec) {
        Shape::Refinement(inner) | Shape::Readonly(inner) => get_props(inner),
        Shape::TotalObject(props) | Shape::StrictObject(props) | Shape::PartialObject(props) => {
            Ok(props.clone())
        }
        Shape::Intersection(members) | Shape::Union(members) => {
            members.iter().try_fold(Props::new(), |mut acc, member| -> Result<Props, RuntimeError> {
                acc.extend(get_props(member)?);
                Ok(acc)
            })
        }
        Shape::Other => {
            tracing::warn!(codec = %codec.name(), tag = codec.node().tag(), "codec has no props");
            Err(RuntimeError::UnsupportedShape {
                codec: codec.name().to_string(),
                expected: HAS_PROPS,
            })
        }
    }
}
