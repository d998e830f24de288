//! Illustrative provider implementations (§4.3 supplemented).
//!
//! These exercise the [`crate::provider::Provider`] trait end to end;
//! they are not new protocol surface. Each corresponds to one of the
//! provider categories §1's purpose statement names (budget tracking,
//! long-term memory, debugging/telemetry).

pub mod budget;
pub mod debug;
pub mod memory;

pub use budget::{BudgetEffect, BudgetProvider};
pub use debug::DebugProvider;
pub use memory::MemoryProvider;
