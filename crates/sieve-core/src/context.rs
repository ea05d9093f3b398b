//! Decode context frames.
//!
//! Every combinator that descends into a value appends a frame naming the
//! key it followed, the codec it handed the value to, and the value itself.
//! Failures keep a copy of the context so the full root-to-leaf trail is
//! available when reporting.

use serde_json::Value;

use crate::codec::Codec;

/// One step from the decode root towards a failure.
#[derive(Debug, Clone)]
pub struct ContextEntry {
    /// Property name, or the stringified index for arrays and for
    /// union/intersection members. Empty for the root frame.
    pub key: String,
    /// Codec active at this frame.
    pub codec: Codec,
    /// Value seen at this frame.
    pub actual: Value,
}

/// Ordered frames from the decode root down to the current position.
#[derive(Debug, Clone, Default)]
pub struct Context {
    entries: Vec<ContextEntry>,
}

impl Context {
    /// Create the root context for decoding `actual` with `codec`.
    pub fn root(codec: &Codec, actual: &Value) -> Self {
        Self {
            entries: vec![ContextEntry {
                key: String::new(),
                codec: codec.clone(),
                actual: actual.clone(),
            }],
        }
    }

    /// Return a new context with one more frame.
    pub fn append(&self, key: impl Into<String>, codec: &Codec, actual: &Value) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.extend(self.entries.iter().cloned());
        entries.push(ContextEntry {
            key: key.into(),
            codec: codec.clone(),
            actual: actual.clone(),
        });
        Self { entries }
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    /// The root frame.
    pub fn first(&self) -> Option<&ContextEntry> {
        self.entries.first()
    }

    /// The deepest frame.
    pub fn last(&self) -> Option<&ContextEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContextEntry> {
        self.entries.iter()
    }

    /// `key: name` pairs joined by `/`, e.g. `: Config/port: number`.
    pub fn describe(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}: {}", entry.key, entry.codec.name()))
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl<'a> IntoIterator for &'a Context {
    type Item = &'a ContextEntry;
    type IntoIter = std::slice::Iter<'a, ContextEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
