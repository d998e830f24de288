//! Memory provider — injects recalled facts via a context-variable patch.
//!
//! Subscribes to `Instruct`. The embedding/vector-memory service that
//! would back real recall is the out-of-scope external collaborator
//! named in §1; this provider models the seam by taking a pre-supplied
//! lookup function and writing its result under a conventional context
//! variable (`recalled_memory`) that a `Dynamic` instruction producer
//! can read when composing the system prompt (§9 "Instruction producers").

use async_trait::async_trait;
use neuron_runtime::ContextVariables;
use serde_json::json;

use crate::event::{Event, EventKind};
use crate::patch::ContextPatch;
use crate::provider::{Provider, ProviderError};

/// Conventional context-variable key a [`MemoryProvider`] writes recalled
/// facts under.
pub const RECALLED_MEMORY_KEY: &str = "recalled_memory";

const SUBSCRIBED: &[EventKind] = &[EventKind::Instruct];

/// Looks up relevant facts for the current agent/context and patches
/// them into `contextVariables` ahead of instruction materialisation.
///
/// `lookup` stands in for a call to the (out-of-scope) embedding store:
/// it takes the current agent name and returns recalled text, or `None`
/// if nothing is relevant.
pub struct MemoryProvider<F> {
    lookup: F,
}

impl<F> MemoryProvider<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    /// Build a memory provider backed by `lookup`.
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl<F> Provider for MemoryProvider<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn subscribed_events(&self) -> &[EventKind] {
        SUBSCRIBED
    }

    async fn handle(&self, event: &Event<'_>) -> Result<Option<ContextPatch>, ProviderError> {
        let Some(recalled) = (self.lookup)(&event.context.current_agent) else {
            return Ok(None);
        };
        let mut vars = ContextVariables::new();
        vars.insert(RECALLED_MEMORY_KEY, json!(recalled));
        Ok(Some(ContextPatch::with_variables(vars)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuron_runtime::RunContext;

    #[tokio::test]
    async fn recalls_facts_for_known_agent() {
        let provider = MemoryProvider::new(|agent: &str| {
            if agent == "support" {
                Some("user prefers email contact".to_string())
            } else {
                None
            }
        });
        let ctx = RunContext::new("support", 10);
        let event = Event::new(EventKind::Instruct, &ctx);
        let patch = provider.handle(&event).await.unwrap().unwrap();
        assert_eq!(
            patch.context_variables.unwrap().get(RECALLED_MEMORY_KEY),
            Some(&json!("user prefers email contact"))
        );
    }

    #[tokio::test]
    async fn silent_when_nothing_recalled() {
        let provider = MemoryProvider::new(|_: &str| None);
        let ctx = RunContext::new("support", 10);
        let event = Event::new(EventKind::Instruct, &ctx);
        let patch = provider.handle(&event).await.unwrap();
        assert!(patch.is_none());
    }
}
