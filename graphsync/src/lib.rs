#![cfg_attr(not(test), warn(clippy::unwrap_used))]

pub mod extension;
pub mod link;
#[cfg(feature = "logger")]
pub mod logger;
pub mod message;
pub mod peer;

pub use extension::{Extension, ExtensionName, Extensions};
pub use link::{Codec, Link, NodeBuilderChooser, Selector};
pub use message::{
    Priority, Request, RequestData, RequestId, Response, ResponseData, ResponseStatusCode,
};
pub use peer::PeerId;
