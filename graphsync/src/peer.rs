use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error decoding a [`PeerId`].
#[derive(Debug, Error)]
pub enum PeerIdError {
    #[error("invalid length {0}")]
    InvalidLength(usize),
    #[error("invalid multibase string: {0}")]
    Multibase(#[from] multibase::Error),
}

/// Identity of a remote peer.
///
/// The engine never interprets the bytes; they are whatever the transport
/// layer authenticated the session with.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeerId([u8; PeerId::BYTES]);

impl PeerId {
    /// Size of a peer identity, in bytes.
    pub const BYTES: usize = 32;

    /// Encode the peer id as a human-readable multibase string.
    pub fn to_human(&self) -> String {
        multibase::encode(multibase::Base::Base58Btc, self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; PeerId::BYTES]> for PeerId {
    fn from(bytes: [u8; PeerId::BYTES]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for PeerId {
    type Error = PeerIdError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; PeerId::BYTES]>::try_from(bytes)
            .map(Self)
            .map_err(|_| PeerIdError::InvalidLength(bytes.len()))
    }
}

impl FromStr for PeerId {
    type Err = PeerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, bytes) = multibase::decode(s)?;

        Self::try_from(bytes.as_slice())
    }
}

impl TryFrom<String> for PeerId {
    type Error = PeerIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl From<PeerId> for String {
    fn from(other: PeerId) -> Self {
        other.to_human()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human())
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({self})")
    }
}
