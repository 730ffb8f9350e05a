use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error decoding a [`Link`].
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("link cannot be empty")]
    Empty,
    #[error("invalid multibase string: {0}")]
    Multibase(#[from] multibase::Error),
}

/// Content identifier of a graph node, eg. the root of a request.
///
/// Kept as raw bytes: parsing identifiers is the concern of the block layer.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Link(Vec<u8>);

impl Link {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, LinkError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(LinkError::Empty);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Link {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, bytes) = multibase::decode(s)?;

        Self::new(bytes)
    }
}

impl TryFrom<String> for Link {
    type Error = LinkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl From<Link> for String {
    fn from(other: Link) -> Self {
        other.to_string()
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", multibase::encode(multibase::Base::Base32Lower, &self.0))
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link({self})")
    }
}

/// An encoded selector. The traversal engine decodes and evaluates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Selector(Vec<u8>);

impl Selector {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Selector {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Selector {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// Codec used to decode the block behind a link into a node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Codec {
    Raw,
    DagPb,
    DagCbor,
    DagJson,
    /// Any other codec, by multicodec code.
    Other(u64),
}

impl Codec {
    /// The multicodec code of this codec.
    pub fn code(&self) -> u64 {
        match self {
            Self::Raw => 0x55,
            Self::DagPb => 0x70,
            Self::DagCbor => 0x71,
            Self::DagJson => 0x0129,
            Self::Other(code) => *code,
        }
    }
}

impl From<u64> for Codec {
    fn from(code: u64) -> Self {
        match code {
            0x55 => Self::Raw,
            0x70 => Self::DagPb,
            0x71 => Self::DagCbor,
            0x0129 => Self::DagJson,
            other => Self::Other(other),
        }
    }
}

/// Strategy choosing how nodes behind a link are decoded.
///
/// Cheap to clone and shareable across sessions.
#[derive(Clone)]
pub struct NodeBuilderChooser(Arc<dyn Fn(&Link) -> Codec + Send + Sync>);

impl NodeBuilderChooser {
    pub fn new<F>(chooser: F) -> Self
    where
        F: Fn(&Link) -> Codec + Send + Sync + 'static,
    {
        Self(Arc::new(chooser))
    }

    /// Choose the codec for the given link.
    pub fn choose(&self, link: &Link) -> Codec {
        (self.0)(link)
    }

    /// Whether both choosers are the same strategy instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeBuilderChooser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NodeBuilderChooser(..)")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use qcheck_macros::quickcheck;

    #[quickcheck]
    fn prop_from_str(input: Link) {
        let encoded = input.to_string();
        let decoded = Link::from_str(&encoded).unwrap();

        assert!(encoded.starts_with('b'));
        assert_eq!(input, decoded);
    }

    #[quickcheck]
    fn prop_codec_code(code: u64) {
        assert_eq!(Codec::from(code).code(), code);
    }

    #[test]
    fn test_empty_link() {
        assert!(matches!(Link::new(vec![]), Err(LinkError::Empty)));
    }

    #[test]
    fn test_chooser() {
        let link = Link::new(vec![0x01, 0x71, 0x12]).unwrap();
        let chooser = NodeBuilderChooser::new(|_| Codec::DagCbor);
        let other = chooser.clone();

        assert_eq!(chooser.choose(&link), Codec::DagCbor);
        assert!(chooser.ptr_eq(&other));
        assert!(!chooser.ptr_eq(&NodeBuilderChooser::new(|_| Codec::DagCbor)));
    }
}
