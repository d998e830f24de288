//! Budget provider — accumulates per-run spend and enforces a ceiling.
//!
//! Subscribes to `PostMessageCompletion`; reads `Message.info.cost` off
//! the run-context's last assistant message (§4.1 step 6 appends it
//! before firing this event) and accumulates it. Crossing the
//! configured ceiling either logs a warning or requests termination,
//! matching §7's `BudgetExceeded` taxonomy entry (`warn` → log only;
//! `error` → force termination with reason `explicit`).

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Mutex;
use tracing::warn;

use crate::event::{Event, EventKind};
use crate::patch::ContextPatch;
use crate::provider::{Provider, ProviderError};

/// What a [`BudgetProvider`] does when cumulative spend crosses its
/// ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetEffect {
    /// Log a warning; the run continues.
    Warn,
    /// Request termination (`terminationReason = explicit`).
    Error,
}

const SUBSCRIBED: &[EventKind] = &[EventKind::PostMessageCompletion];

/// Tracks cumulative cost across a run and enforces a ceiling.
pub struct BudgetProvider {
    ceiling: Decimal,
    effect: BudgetEffect,
    spent: Mutex<Decimal>,
}

impl BudgetProvider {
    /// Build a budget provider with the given ceiling and overflow effect.
    pub fn new(ceiling: Decimal, effect: BudgetEffect) -> Self {
        Self {
            ceiling,
            effect,
            spent: Mutex::new(Decimal::ZERO),
        }
    }

    /// Cumulative spend recorded so far.
    pub fn spent(&self) -> Decimal {
        *self.spent.lock().unwrap()
    }
}

#[async_trait]
impl Provider for BudgetProvider {
    fn subscribed_events(&self) -> &[EventKind] {
        SUBSCRIBED
    }

    async fn handle(&self, event: &Event<'_>) -> Result<Option<ContextPatch>, ProviderError> {
        let Some(message) = &event.context.last_assistant_message else {
            return Ok(None);
        };
        let Some(cost) = message.info.as_ref().and_then(|i| i.cost) else {
            return Ok(None);
        };
        let cost = Decimal::try_from(cost).map_err(|e| ProviderError::Other(Box::new(e)))?;

        let mut spent = self.spent.lock().unwrap();
        *spent += cost;

        if *spent > self.ceiling {
            match self.effect {
                BudgetEffect::Warn => {
                    warn!(spent = %spent, ceiling = %self.ceiling, "budget ceiling exceeded");
                    Ok(None)
                }
                BudgetEffect::Error => Ok(Some(ContextPatch::terminate())),
            }
        } else {
            Ok(None)
        }
    }
}
