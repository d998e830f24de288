//! Model client trait — the §6 model adapter contract.
//!
//! The [`ModelClient`] trait uses RPITIT (return-position `impl Trait`
//! in traits) and is intentionally NOT object-safe: `neuron-orchestrator`
//! is generic over `C: ModelClient`, not a trait-object boundary. This
//! is named `ModelClient` rather than `Provider` to avoid colliding with
//! `neuron-providers::Provider`, the unrelated lifecycle-event extension
//! concept from spec §3/§4.3 (see DESIGN.md).

use crate::types::{ModelRequest, ModelResponse};
use std::future::Future;
use thiserror::Error;

/// Errors from model-client backends.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ModelClientError {
    /// HTTP or network request failed.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// Backend rate-limited the request.
    #[error("rate limited")]
    RateLimited,

    /// Authentication/authorization failed.
    #[error("auth failed: {0}")]
    AuthFailed(String),

    /// Could not parse the backend's response (§7 `ModelError`).
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ModelClientError {
    /// Whether retrying this request might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ModelClientError::RateLimited | ModelClientError::RequestFailed(_)
        )
    }
}

/// The model-adapter contract (§6): `complete(messages, tools) →
/// assistant message`.
///
/// Each backend (Anthropic, OpenAI, Ollama, a deterministic test double)
/// implements this trait. Backend-native features (truncation, caching,
/// thinking blocks) are handled by the impl using `ModelRequest.extra`.
///
/// This trait uses RPITIT and is NOT object-safe. That's intentional —
/// the orchestrator is generic over its model client, never boxes it.
pub trait ModelClient: Send + Sync {
    /// Send a completion request and return the aggregated response.
    ///
    /// A streaming backend may publish chunks as they arrive through
    /// whatever sink it was constructed with (e.g. a captured
    /// `neuron_control::ControlHandle`), but the value returned here must
    /// still be the final aggregated message (§6, §9 "Streaming vs
    /// history") — streamed chunks never enter conversation history
    /// directly, only the orchestrator's call to this method does.
    fn complete(
        &self,
        request: ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, ModelClientError>> + Send;
}
