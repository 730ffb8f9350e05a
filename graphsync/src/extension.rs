//! Protocol extensions.
//!
//! An extension is a named, opaque payload attached to a request or
//! response, used for out-of-band negotiation between peers. Names are
//! unique within a message and namespaced by convention, eg.
//! `"vendor/feature"`.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of an extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionName(String);

impl ExtensionName {
    /// Metadata about the blocks of a response.
    pub const RESPONSE_METADATA: &'static str = "graphsync/response-metadata";
    /// Links the requester already has, and should not be sent.
    pub const DO_NOT_SEND_CIDS: &'static str = "graphsync/do-not-send-cids";
    /// Key under which requests are de-duplicated.
    pub const DEDUP_BY_KEY: &'static str = "graphsync/dedup-by-key";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for ExtensionName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for ExtensionName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<ExtensionName> for String {
    fn from(ExtensionName(name): ExtensionName) -> Self {
        name
    }
}

impl fmt::Display for ExtensionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named extension payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extension {
    pub name: ExtensionName,
    pub data: Vec<u8>,
}

impl Extension {
    pub fn new(name: impl Into<ExtensionName>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// The extensions carried by a single message, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions(BTreeMap<ExtensionName, Vec<u8>>);

impl Extensions {
    /// Get the payload of the extension with the given name.
    pub fn get(&self, name: &ExtensionName) -> Option<&[u8]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &ExtensionName) -> bool {
        self.0.contains_key(name)
    }

    /// Insert an extension, returning the payload it replaced, if any.
    pub fn insert(&mut self, extension: Extension) -> Option<Vec<u8>> {
        self.0.insert(extension.name, extension.data)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExtensionName, &[u8])> {
        self.0.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Extension> for Extensions {
    fn from_iter<I: IntoIterator<Item = Extension>>(iter: I) -> Self {
        let mut extensions = Self::default();
        extensions.extend(iter);
        extensions
    }
}

impl Extend<Extension> for Extensions {
    fn extend<I: IntoIterator<Item = Extension>>(&mut self, iter: I) {
        for ext in iter {
            self.insert(ext);
        }
    }
}

impl From<Extension> for Extensions {
    fn from(extension: Extension) -> Self {
        Self::from_iter([extension])
    }
}

impl IntoIterator for Extensions {
    type Item = Extension;
    type IntoIter = std::iter::Map<
        std::collections::btree_map::IntoIter<ExtensionName, Vec<u8>>,
        fn((ExtensionName, Vec<u8>)) -> Extension,
    >;

    fn into_iter(self) -> Self::IntoIter {
        fn extension((name, data): (ExtensionName, Vec<u8>)) -> Extension {
            Extension { name, data }
        }
        self.0.into_iter().map(extension as fn(_) -> _)
    }
}
