use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extension::{ExtensionName, Extensions};
use crate::link::{Link, Selector};

/// Identifier of a request, unique per requesting peer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(i32);

impl From<i32> for RequestId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<RequestId> for i32 {
    fn from(RequestId(id): RequestId) -> Self {
        id
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Priority of a request. Higher is more urgent.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Priority(i32);

impl From<i32> for Priority {
    fn from(priority: i32) -> Self {
        Self(priority)
    }
}

impl From<Priority> for i32 {
    fn from(Priority(priority): Priority) -> Self {
        priority
    }
}

/// Unknown response status code.
#[derive(Debug, Error)]
#[error("unknown response status code {0}")]
pub struct StatusCodeError(pub i32);

/// Status of a response.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResponseStatusCode {
    /// The request was received and is being worked on.
    RequestAcknowledged,
    /// Other peers may also have the requested content.
    AdditionalPeers,
    /// The requester must pay more before the request continues.
    NotEnoughGas,
    /// The content is better retrieved over another protocol.
    OtherProtocol,
    /// Some blocks of the request are included.
    PartialResponse,
    /// All blocks were sent.
    RequestCompletedFull,
    /// The request completed, but some blocks were missing.
    RequestCompletedPartial,
    /// The responder refused the request.
    RequestRejected,
    /// The responder is too busy.
    RequestFailedBusy,
    /// The request failed for an unknown reason.
    RequestFailedUnknown,
    /// The request failed for legal reasons.
    RequestFailedLegal,
    /// The responder does not have the content.
    RequestFailedContentNotFound,
}

impl ResponseStatusCode {
    /// Wire code of the status.
    pub fn code(&self) -> i32 {
        match self {
            Self::RequestAcknowledged => 10,
            Self::AdditionalPeers => 11,
            Self::NotEnoughGas => 12,
            Self::OtherProtocol => 13,
            Self::PartialResponse => 14,
            Self::RequestCompletedFull => 20,
            Self::RequestCompletedPartial => 21,
            Self::RequestRejected => 30,
            Self::RequestFailedBusy => 31,
            Self::RequestFailedUnknown => 32,
            Self::RequestFailedLegal => 33,
            Self::RequestFailedContentNotFound => 34,
        }
    }

    /// Whether no further responses follow for the request.
    pub fn is_terminal(&self) -> bool {
        self.is_success() || self.is_failure()
    }

    /// Whether the request completed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::RequestCompletedFull | Self::RequestCompletedPartial)
    }

    /// Whether the request failed.
    pub fn is_failure(&self) -> bool {
        self.code() >= 30
    }
}

impl TryFrom<i32> for ResponseStatusCode {
    type Error = StatusCodeError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            10 => Ok(Self::RequestAcknowledged),
            11 => Ok(Self::AdditionalPeers),
            12 => Ok(Self::NotEnoughGas),
            13 => Ok(Self::OtherProtocol),
            14 => Ok(Self::PartialResponse),
            20 => Ok(Self::RequestCompletedFull),
            21 => Ok(Self::RequestCompletedPartial),
            30 => Ok(Self::RequestRejected),
            31 => Ok(Self::RequestFailedBusy),
            32 => Ok(Self::RequestFailedUnknown),
            33 => Ok(Self::RequestFailedLegal),
            34 => Ok(Self::RequestFailedContentNotFound),
            _ => Err(StatusCodeError(code)),
        }
    }
}

impl fmt::Display for ResponseStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::RequestAcknowledged => "request-acknowledged",
            Self::AdditionalPeers => "additional-peers",
            Self::NotEnoughGas => "not-enough-gas",
            Self::OtherProtocol => "other-protocol",
            Self::PartialResponse => "partial-response",
            Self::RequestCompletedFull => "request-completed-full",
            Self::RequestCompletedPartial => "request-completed-partial",
            Self::RequestRejected => "request-rejected",
            Self::RequestFailedBusy => "request-failed-busy",
            Self::RequestFailedUnknown => "request-failed-unknown",
            Self::RequestFailedLegal => "request-failed-legal",
            Self::RequestFailedContentNotFound => "request-failed-content-not-found",
        };
        write!(f, "{s} ({})", self.code())
    }
}

/// Read-only view of an outgoing request, as seen by request hooks.
pub trait RequestData {
    fn id(&self) -> RequestId;
    fn root(&self) -> Option<&Link>;
    fn selector(&self) -> &Selector;
    fn priority(&self) -> Priority;
    /// Payload of the named extension, if the request carries it.
    fn extension(&self, name: &ExtensionName) -> Option<&[u8]>;
    fn is_cancel(&self) -> bool;
    fn is_update(&self) -> bool;
}

/// Read-only view of an incoming response, as seen by response hooks.
pub trait ResponseData {
    fn id(&self) -> RequestId;
    fn status(&self) -> ResponseStatusCode;
    /// Payload of the named extension, if the response carries it.
    fn extension(&self, name: &ExtensionName) -> Option<&[u8]>;
}

/// A graphsync request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    id: RequestId,
    root: Option<Link>,
    selector: Selector,
    priority: Priority,
    extensions: Extensions,
    cancel: bool,
    update: bool,
}

impl Request {
    /// A new request for the graph at `root`, as matched by `selector`.
    pub fn new(
        id: RequestId,
        root: Link,
        selector: Selector,
        priority: Priority,
        extensions: impl Into<Extensions>,
    ) -> Self {
        Self {
            id,
            root: Some(root),
            selector,
            priority,
            extensions: extensions.into(),
            cancel: false,
            update: false,
        }
    }

    /// Cancel an in-progress request.
    pub fn cancel(id: RequestId) -> Self {
        Self {
            id,
            root: None,
            selector: Selector::default(),
            priority: Priority::default(),
            extensions: Extensions::default(),
            cancel: true,
            update: false,
        }
    }

    /// Send new extensions for an in-progress request.
    pub fn update(id: RequestId, extensions: impl Into<Extensions>) -> Self {
        Self {
            id,
            root: None,
            selector: Selector::default(),
            priority: Priority::default(),
            extensions: extensions.into(),
            cancel: false,
            update: true,
        }
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }
}

impl RequestData for Request {
    fn id(&self) -> RequestId {
        self.id
    }

    fn root(&self) -> Option<&Link> {
        self.root.as_ref()
    }

    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn extension(&self, name: &ExtensionName) -> Option<&[u8]> {
        self.extensions.get(name)
    }

    fn is_cancel(&self) -> bool {
        self.cancel
    }

    fn is_update(&self) -> bool {
        self.update
    }
}

/// A graphsync response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    id: RequestId,
    status: ResponseStatusCode,
    extensions: Extensions,
}

impl Response {
    pub fn new(
        id: RequestId,
        status: ResponseStatusCode,
        extensions: impl Into<Extensions>,
    ) -> Self {
        Self {
            id,
            status,
            extensions: extensions.into(),
        }
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }
}

impl ResponseData for Response {
    fn id(&self) -> RequestId {
        self.id
    }

    fn status(&self) -> ResponseStatusCode {
        self.status
    }

    fn extension(&self, name: &ExtensionName) -> Option<&[u8]> {
        self.extensions.get(name)
    }
}
