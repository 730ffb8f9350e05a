//! Results of a dispatch, and the handles hooks use to shape them.
//!
//! A handle is created fresh for every hook invocation and mutably borrows
//! the dispatch's result, so it cannot be kept past the invocation. Handles
//! only expose setters: hooks cannot observe each other's decisions.
use std::fmt;
use std::str::FromStr;

use graphsync::{Extension, NodeBuilderChooser};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::Error;

/// Error a response hook aborts an exchange with.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Name of a persistence backend. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersistenceOption(String);

impl PersistenceOption {
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyPersistenceOption);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for PersistenceOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PersistenceOption {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PersistenceOption> for String {
    fn from(PersistenceOption(name): PersistenceOption) -> Self {
        name
    }
}

impl fmt::Display for PersistenceOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of running the request hooks for one outgoing request.
#[derive(Debug, Default, Clone)]
pub struct RequestResult {
    /// Chooser to decode nodes with, instead of the engine's default.
    pub custom_chooser: Option<NodeBuilderChooser>,
    /// Backend to persist the request's blocks in, instead of the default.
    pub persistence_option: Option<PersistenceOption>,
}

/// Outcome of running the response hooks for one incoming response.
#[derive(Debug, Default)]
pub struct ResponseResult {
    /// Extensions to send to the responder in a request update, in the order
    /// hooks added them.
    pub extensions: Vec<Extension>,
    /// Set if a hook aborted the exchange.
    pub err: Option<HookError>,
}

impl ResponseResult {
    pub fn is_aborted(&self) -> bool {
        self.err.is_some()
    }
}

/// Actions available to a request hook.
pub struct OutgoingRequestHookActions<'a> {
    result: &'a mut RequestResult,
    config: &'a Config,
}

impl<'a> OutgoingRequestHookActions<'a> {
    pub(crate) fn new(result: &'a mut RequestResult, config: &'a Config) -> Self {
        Self { result, config }
    }

    /// Decode the request's nodes with `chooser`. Replaces any chooser set by
    /// an earlier hook.
    pub fn use_node_builder_chooser(&mut self, chooser: NodeBuilderChooser) {
        self.result.custom_chooser = Some(chooser);
    }

    /// Persist the request's blocks in the named backend. Replaces any option
    /// set by an earlier hook.
    ///
    /// If persistence options are configured, `option` must be one of them,
    /// otherwise the result is left as is.
    pub fn use_persistence_option(&mut self, option: PersistenceOption) -> Result<(), Error> {
        if !self.config.is_allowed(&option) {
            log::warn!(target: "hooks", "Rejected unknown persistence option '{option}'");
            return Err(Error::UnknownPersistenceOption(option));
        }
        self.result.persistence_option = Some(option);

        Ok(())
    }
}

/// Actions available to a response hook.
pub struct IncomingResponseHookActions<'a> {
    result: &'a mut ResponseResult,
}

impl<'a> IncomingResponseHookActions<'a> {
    pub(crate) fn new(result: &'a mut ResponseResult) -> Self {
        Self { result }
    }

    /// Send the given extensions back to the responder, after those added by
    /// earlier hooks.
    pub fn update_request_with_extensions(
        &mut self,
        extensions: impl IntoIterator<Item = Extension>,
    ) {
        self.result.extensions.extend(extensions);
    }

    /// Abort the exchange with `err`. No further hooks run. Only the first
    /// error is kept.
    pub fn terminate_with_error(&mut self, err: impl Into<HookError>) {
        if self.result.err.is_none() {
            self.result.err = Some(err.into());
        }
    }
}
