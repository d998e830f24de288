#![deny(missing_docs)]
//! Control-plane wire types and the pause/step/breakpoint gate (C7) for
//! the neuron orchestration runtime.
//!
//! [`gate::PauseGate`] is the cooperative checkpoint the orchestrator
//! calls at the top of every turn and after every lifecycle event;
//! [`handle::ControlHandle`] bundles it with an outbound span/status
//! channel and an inbound message dispatcher. Transport (sockets,
//! WebSocket framing) is supplied by the caller — this crate only types
//! the messages and provides the gate.

pub mod gate;
pub mod handle;
pub mod inbound;
pub mod outbound;

pub use gate::PauseGate;
pub use handle::{ControlHandle, SpanGuard};
pub use inbound::{InboundMessage, SetBreakpoint, SetPaused, SetStep, UserInput};
pub use outbound::{BreakStatus, ChatStatus, OutboundMessage, Span, StreamChunk};
