//! The provider trait and its materialisation contract (C2).
//!
//! A [`Provider`] is a stateful extension: it declares which
//! [`crate::event::EventKind`]s it subscribes to and handles a dispatch
//! by optionally returning a [`crate::patch::ContextPatch`]. A
//! [`ProviderFactory`] builds one from a [`neuron_runtime::ProviderConfig`]
//! — the manager never constructs a concrete provider type directly, so
//! new provider kinds register a factory rather than requiring changes
//! to `neuron-providers` itself.

use async_trait::async_trait;
use neuron_runtime::ProviderConfig;
use thiserror::Error;

use crate::event::{Event, EventKind};
use crate::patch::ContextPatch;

/// Errors from provider construction or handling.
///
/// A handler that returns `Err` is logged and skipped (§4.3 Failure
/// semantics); the event is not retried and subsequent handlers still
/// run. Only factory failures during materialisation are fatal — they
/// surface as `RunError::Config` before the loop starts.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No factory is registered for this configuration's `kind`.
    #[error("no provider factory registered for kind: {0}")]
    UnknownKind(String),

    /// The factory rejected the configuration's `params`.
    #[error("invalid provider configuration: {0}")]
    InvalidConfig(String),

    /// A handler raised while processing an event.
    #[error("provider handler failed: {0}")]
    HandlerFailed(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// A stateful lifecycle-event extension (§3 Provider instance, §4.3).
///
/// Implementations hold their own private state behind interior
/// mutability (a `Mutex`/`RwLock`/atomic) since `handle` takes `&self` —
/// the manager shares one instance across every event it's subscribed
/// to for the lifetime of its scope (§3 invariant 5).
#[async_trait]
pub trait Provider: Send + Sync {
    /// Which event kinds this instance wants to see. Declared once and
    /// assumed stable for the instance's lifetime.
    fn subscribed_events(&self) -> &[EventKind];

    /// Handle one dispatched event, optionally returning a patch.
    ///
    /// Returning `Err` does not propagate past the manager: it is
    /// logged and treated as "no patch" (§4.3 Failure semantics).
    async fn handle(&self, event: &Event<'_>) -> Result<Option<ContextPatch>, ProviderError>;
}

/// Builds a live [`Provider`] instance from a [`ProviderConfig`].
///
/// Registered with the manager per `kind` string (`ProviderManager::register_factory`).
/// A factory is called once per instance the manager needs to
/// materialise — for `Global`/`Scoped` scopes, once per distinct scope
/// key; for `Jit`, once per event dispatch.
pub trait ProviderFactory: Send + Sync {
    /// Construct a provider instance from its configuration.
    fn create(&self, config: &ProviderConfig) -> Result<std::sync::Arc<dyn Provider>, ProviderError>;
}

impl<F> ProviderFactory for F
where
    F: Fn(&ProviderConfig) -> Result<std::sync::Arc<dyn Provider>, ProviderError> + Send + Sync,
{
    fn create(&self, config: &ProviderConfig) -> Result<std::sync::Arc<dyn Provider>, ProviderError> {
        self(config)
    }
}
