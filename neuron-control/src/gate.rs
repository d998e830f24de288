//! The pause/step/breakpoint gate (§4.5).
//!
//! [`PauseGate::gate`] is the single checkpoint the orchestrator calls at
//! the top of every turn and again right after every lifecycle event it
//! dispatches. It blocks cooperatively on a `tokio::sync::Notify` — no
//! busy-waiting — and re-checks its condition after every wake, since the
//! wake might have been a `SetStep` rather than a resume.

use std::collections::HashSet;
use std::sync::Mutex;

use tokio::sync::Notify;

use crate::outbound::BreakStatus;

struct GateState {
    paused: bool,
    step_remaining: u64,
    breakpoints: HashSet<String>,
}

/// Cooperative pause/step/breakpoint checkpoint, shared between the
/// orchestrator (which calls [`Self::gate`]) and whatever inbound
/// channel applies [`crate::inbound::InboundMessage`]s to it.
pub struct PauseGate {
    state: Mutex<GateState>,
    notify: Notify,
}

impl PauseGate {
    /// A gate that starts unpaused, with no step budget or breakpoints.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                paused: false,
                step_remaining: 0,
                breakpoints: HashSet::new(),
            }),
            notify: Notify::new(),
        }
    }

    /// Pause or resume. Idempotent — setting the same value twice is a
    /// no-op beyond waking any waiters.
    pub fn set_paused(&self, paused: bool) {
        {
            let mut state = self.state.lock().unwrap();
            state.paused = paused;
        }
        self.notify.notify_waiters();
    }

    /// Allow `n` more turns through the gate while paused. Additive.
    pub fn set_step(&self, n: u64) {
        {
            let mut state = self.state.lock().unwrap();
            state.step_remaining = state.step_remaining.saturating_add(n);
        }
        self.notify.notify_waiters();
    }

    /// Force a pause the next time `event` is checked. Idempotent.
    pub fn set_breakpoint(&self, event: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.breakpoints.insert(event.into());
    }

    /// Remove a previously set breakpoint, if any.
    pub fn clear_breakpoint(&self, event: &str) {
        let mut state = self.state.lock().unwrap();
        state.breakpoints.remove(event);
    }

    /// Current pause state, for `BreakStatus` reporting.
    pub fn status(&self) -> BreakStatus {
        BreakStatus {
            paused: self.state.lock().unwrap().paused,
        }
    }

    /// Block until it is safe to proceed past `event_name`.
    ///
    /// A matching breakpoint forces a pause even if the gate was not
    /// already paused. While paused, a positive step budget consumes one
    /// step and lets exactly one call through; once the budget is spent,
    /// the call blocks until `set_paused(false)` or another `set_step`.
    pub async fn gate(&self, event_name: &str) {
        self.gate_with(event_name, || {}, || {}).await
    }

    /// Same checkpoint as [`Self::gate`], additionally invoking
    /// `on_block` the moment this call decides it must wait (before the
    /// first suspend) and `on_resume` once it is released, but only if
    /// `on_block` actually ran — a call that never blocks notifies
    /// neither (§4.5 "When paused, the orchestrator publishes
    /// `BreakStatus{true}` and waits ... any inbound `SetPaused{false}`
    /// wakes it").
    pub async fn gate_with(&self, event_name: &str, on_block: impl Fn(), on_resume: impl Fn()) {
        let mut blocked = false;
        loop {
            let should_wait = {
                let mut state = self.state.lock().unwrap();
                if state.breakpoints.contains(event_name) {
                    state.paused = true;
                }
                if !state.paused {
                    false
                } else if state.step_remaining > 0 {
                    state.step_remaining -= 1;
                    false
                } else {
                    true
                }
            };
            if !should_wait {
                if blocked {
                    on_resume();
                }
                return;
            }
            if !blocked {
                on_block();
                blocked = true;
            }
            self.notify.notified().await;
        }
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}
