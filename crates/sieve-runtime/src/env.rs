//! Configuration from environment variables.
//!
//! [`parse_env`] takes a codec built from object shapes, unions and
//! intersections, and returns an [`EnvParser`]. Nothing is read until the
//! parser runs; every run takes a fresh snapshot of the environment, picks the
//! variables the codec declares (falling back to defaults), and decodes them.
//!
//! ```rust
//! use sieve_core::{props, Codec};
//! use sieve_runtime::{parse_env, MapEnv};
//! use serde_json::json;
//!
//! let parser = parse_env(&Codec::type_of(props! {
//!     "PORT" => Codec::number_from_string(),
//! }))
//! .unwrap()
//! .with_defaults(&json!({"PORT": "8080"}))
//! .unwrap();
//!
//! let env = MapEnv::new().with("PORT", "3000").with("HOME", "/root");
//! assert_eq!(parser.run_with(&env).unwrap(), json!({"PORT": 3000}));
//! assert_eq!(parser.run_with(&MapEnv::new()).unwrap(), json!({"PORT": 8080}));
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sieve_core::{Codec, Context, Merge, Record, Validation, ValidationError};

use crate::error::RuntimeError;
use crate::shape::Shape;

const ENV_SHAPES: &str = "sieve.parse_env: codec must be Interface, Partial, Intersection or Union";

/// Source of environment variables.
pub trait EnvSource {
    /// Snapshot of every variable visible to this source.
    fn snapshot(&self) -> BTreeMap<String, String>;
}

/// The live process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn snapshot(&self) -> BTreeMap<String, String> {
        std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }
}

/// In-memory environment, mostly for tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }
}

impl EnvSource for MapEnv {
    fn snapshot(&self) -> BTreeMap<String, String> {
        self.vars.clone()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Property names a codec reads from the environment, by composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropsTree {
    /// Keys of a total or partial object.
    Leaf(Vec<String>),
    Union(Vec<PropsTree>),
    Intersection(Vec<PropsTree>),
}

impl PropsTree {
    /// Build the tree for `codec`, rejecting any other shape.
    pub fn from_codec(codec: &Codec) -> Result<Self, RuntimeError> {
        match Shape::of(codec) {
            Shape::TotalObject(props) | Shape::PartialObject(props) => {
                Ok(PropsTree::Leaf(props.keys().cloned().collect()))
            }
            Shape::Union(members) => Ok(PropsTree::Union(Self::children(members)?)),
            Shape::Intersection(members) => Ok(PropsTree::Intersection(Self::children(members)?)),
            Shape::StrictObject(_) | Shape::Refinement(_) | Shape::Readonly(_) | Shape::Other => {
                tracing::warn!(codec = %codec.name(), tag = codec.node().tag(), "unsupported codec for parse_env");
                Err(RuntimeError::UnsupportedShape {
                    codec: codec.name().to_string(),
                    expected: ENV_SHAPES,
                })
            }
        }
    }

    fn children(members: &[Codec]) -> Result<Vec<PropsTree>, RuntimeError> {
        members.iter().map(Self::from_codec).collect()
    }

    /// Every key reachable through any branch.
    pub fn keys(&self) -> BTreeSet<&str> {
        match self {
            PropsTree::Leaf(keys) => keys.iter().map(String::as_str).collect(),
            PropsTree::Union(children) | PropsTree::Intersection(children) => {
                children.iter().flat_map(PropsTree::keys).collect()
            }
        }
    }

    /// Pick the declared keys out of `source`. Missing keys stay missing.
    pub fn project(&self, source: &Record) -> Record {
        match self {
            PropsTree::Leaf(keys) => keys
                .iter()
                .filter_map(|key| Some((key.clone(), source.get(key)?.clone())))
                .collect(),
            PropsTree::Union(children) | PropsTree::Intersection(children) => Record::new()
                .merge_all(children.iter().map(|child| child.project(source))),
        }
    }
}

/// Create a parser for `codec` without defaults.
pub fn parse_env(codec: &Codec) -> Result<EnvParser, RuntimeError> {
    Ok(EnvParser {
        codec: codec.clone(),
        tree: PropsTree::from_codec(codec)?,
        defaults: Record::new(),
    })
}

/// Create a parser with untyped defaults, e.g. loaded from a JSON file.
pub fn parse_env_w(codec: &Codec, defaults: Option<Record>) -> Result<EnvParser, RuntimeError> {
    let mut parser = parse_env(codec)?;
    parser.defaults = defaults.unwrap_or_default();
    Ok(parser)
}

/// Deferred decoder of environment variables.
#[derive(Debug, Clone)]
pub struct EnvParser {
    codec: Codec,
    tree: PropsTree,
    defaults: Record,
}

impl EnvParser {
    /// Use the fields of `defaults` for variables that are not set.
    ///
    /// `defaults` must serialize to an object.
    pub fn with_defaults<T: Serialize + ?Sized>(mut self, defaults: &T) -> Result<Self, RuntimeError> {
        match serde_json::to_value(defaults)? {
            Value::Object(record) => {
                self.defaults = record;
                Ok(self)
            }
            other => Err(RuntimeError::InvalidDefaults(format!(
                "expected an object, got {}",
                other
            ))),
        }
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn tree(&self) -> &PropsTree {
        &self.tree
    }

    pub fn defaults(&self) -> &Record {
        &self.defaults
    }

    /// Decode from the live process environment.
    pub fn run(&self) -> Validation<Value> {
        self.run_with(&ProcessEnv)
    }

    /// Decode from `env`.
    pub fn run_with<E: EnvSource + ?Sized>(&self, env: &E) -> Validation<Value> {
        let record = self.record_from(env);
        tracing::debug!(
            codec = %self.codec.name(),
            selected = record.len(),
            declared = self.tree.keys().len(),
            "decoding environment"
        );
        self.codec.decode(&Value::Object(record))
    }

    /// Decode from the live process environment into `T`.
    pub fn run_as<T: DeserializeOwned>(&self) -> Validation<T> {
        self.run_as_with(&ProcessEnv)
    }

    /// Decode from `env` into `T`.
    ///
    /// A value the codec accepts but `T` cannot represent is reported as a
    /// single error at the root.
    pub fn run_as_with<T, E>(&self, env: &E) -> Validation<T>
    where
        T: DeserializeOwned,
        E: EnvSource + ?Sized,
    {
        let decoded = self.run_with(env)?;
        serde_json::from_value(decoded.clone()).map_err(|e| {
            ValidationError::new(decoded.clone(), Context::root(&self.codec, &decoded))
                .with_message(format!("cannot deserialize configuration: {}", e))
                .into()
        })
    }

    /// The parser as a zero-argument callable reading the process environment.
    pub fn as_fn(&self) -> impl Fn() -> Validation<Value> + '_ {
        move || self.run()
    }

    /// Defaults overlaid with the environment, restricted to declared keys.
    fn record_from<E: EnvSource + ?Sized>(&self, env: &E) -> Record {
        let live: Record = env
            .snapshot()
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        let merged = self.defaults.clone().merge(live);
        self.tree.project(&merged)
    }
}
