//! Request and response hooks for graphsync.
//!
//! Applications register hooks to inspect outgoing requests and incoming
//! responses, and to influence how the protocol engine handles them: which
//! chooser decodes a request's nodes, which backend persists its blocks,
//! which extensions are sent back to a responder, and whether an exchange
//! is aborted. Hooks don't know about each other; [`Hooks`] runs them in
//! registration order and folds their decisions into a single result.
#![cfg_attr(not(test), warn(clippy::unwrap_used))]

pub mod actions;
pub mod config;
pub mod registry;


use std::sync::Arc;

use graphsync::{PeerId, RequestData, ResponseData};
use thiserror::Error;

pub use actions::{
    HookError, IncomingResponseHookActions, OutgoingRequestHookActions, PersistenceOption,
    RequestResult, ResponseResult,
};
pub use config::Config;
pub use registry::{HookId, Registry, Unregister};

/// A hook run for every outgoing request.
pub type RequestHook =
    Arc<dyn Fn(&PeerId, &dyn RequestData, &mut OutgoingRequestHookActions<'_>) + Send + Sync>;

/// A hook run for every incoming response.
pub type ResponseHook =
    Arc<dyn Fn(&PeerId, &dyn ResponseData, &mut IncomingResponseHookActions<'_>) + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("persistence option cannot be empty")]
    EmptyPersistenceOption,
    #[error("unknown persistence option '{0}'")]
    UnknownPersistenceOption(PersistenceOption),
}

/// The registered hooks of a graphsync instance.
///
/// Cloning is cheap and clones share their registrations. Hooks may be
/// registered and unregistered from any thread, including from within a
/// hook, while dispatches are in progress.
#[derive(Debug, Clone)]
pub struct Hooks {
    request: Registry<RequestHook>,
    response: Registry<ResponseHook>,
    config: Arc<Config>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self::new()
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            request: Registry::new("request"),
            response: Registry::new("response"),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a hook to run for every outgoing request.
    pub fn register_request_hook<F>(&self, hook: F) -> Unregister
    where
        F: Fn(&PeerId, &dyn RequestData, &mut OutgoingRequestHookActions<'_>)
            + Send
            + Sync
            + 'static,
    {
        self.request.register(Arc::new(hook))
    }

    /// Register a hook to run for every incoming response.
    pub fn register_response_hook<F>(&self, hook: F) -> Unregister
    where
        F: Fn(&PeerId, &dyn ResponseData, &mut IncomingResponseHookActions<'_>)
            + Send
            + Sync
            + 'static,
    {
        self.response.register(Arc::new(hook))
    }

    /// Run the request hooks for a request about to be sent to `peer`.
    ///
    /// Every hook runs. When several hooks set the same field of the result,
    /// the last one wins.
    pub fn process_request_hooks(
        &self,
        peer: &PeerId,
        request: &dyn RequestData,
    ) -> RequestResult {
        let mut result = RequestResult::default();
        let hooks = self.request.snapshot();

        for hook in hooks.iter() {
            hook(
                peer,
                request,
                &mut OutgoingRequestHookActions::new(&mut result, &self.config),
            );
        }
        log::trace!(
            target: "hooks",
            "Processed {} request hook(s) for request {} to {peer}",
            hooks.len(),
            request.id()
        );
        result
    }

    /// Run the response hooks for a response received from `peer`.
    ///
    /// Hooks run in order until one of them aborts. Extensions added up to
    /// and including the aborting hook are kept; later hooks don't run.
    pub fn process_response_hooks(
        &self,
        peer: &PeerId,
        response: &dyn ResponseData,
    ) -> ResponseResult {
        let mut result = ResponseResult::default();
        let hooks = self.response.snapshot();

        for (i, hook) in hooks.iter().enumerate() {
            hook(
                peer,
                response,
                &mut IncomingResponseHookActions::new(&mut result),
            );

            if let Some(err) = &result.err {
                log::debug!(
                    target: "hooks",
                    "Response hook {}/{} aborted request {} from {peer}: {err}",
                    i + 1,
                    hooks.len(),
                    response.id()
                );
                break;
            }
        }
        result
    }
}
