//! Provider configuration — the data half of a lifecycle-event provider.
//!
//! [`ProviderConfig`] is the tagged record an [`crate::agent::Agent`]
//! carries; `neuron-providers` gives it behaviour by materialising a
//! live provider instance from it. One configuration produces at most
//! one live instance per [`Scope`] key (§3 invariant 5).

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Lifetime rule for a provider instance.
///
/// - `Global` — one instance process-wide, shared across every agent
///   that references an equal configuration.
/// - `Scoped` — one instance per `(agent name, configuration)` pair.
/// - `Jit` — a fresh instance is built, invoked, and discarded for every
///   single event dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// One instance for the whole process.
    Global,
    /// One instance per agent per run.
    Scoped,
    /// A fresh instance per event.
    Jit,
}

/// A provider configuration: which provider class to instantiate, at
/// what scope, in what priority order, with what subtype-specific
/// parameters.
///
/// Equality and hashing are structural over the declared fields (`kind`,
/// `scope`, `priority`, `params`) — there is no interior runtime state to
/// exclude, since `ProviderConfig` carries none. Two configurations equal
/// by these fields map to the same scope key (§3 invariant 5; this is
/// the resolution to the Open Question in spec §9 on scope equality).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Identifies which provider class to instantiate (e.g. `"budget"`,
    /// `"memory"`).
    pub kind: String,
    /// The instance's lifetime rule.
    pub scope: Scope,
    /// Dispatch order among providers active for an event; lower runs
    /// earlier. Ties are broken by declaration order (stable sort).
    #[serde(default)]
    pub priority: i32,
    /// Subtype-specific fields, opaque to the manager.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl ProviderConfig {
    /// Build a provider configuration.
    pub fn new(kind: impl Into<String>, scope: Scope) -> Self {
        Self {
            kind: kind.into(),
            scope,
            priority: 0,
            params: serde_json::Value::Null,
        }
    }

    /// Set the dispatch priority (lower runs earlier).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the subtype-specific parameters.
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }
}

impl PartialEq for ProviderConfig {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.scope == other.scope
            && self.priority == other.priority
            && self.params == other.params
    }
}

impl Eq for ProviderConfig {}

impl Hash for ProviderConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.scope.hash(state);
        self.priority.hash(state);
        // serde_json::Value has no Hash impl; its canonical string
        // serialization is stable (objects serialize in insertion order
        // without the `preserve_order` feature turned on for a BTreeMap,
        // i.e. key-sorted) so it is a sound structural-equality witness.
        serde_json::to_string(&self.params).unwrap_or_default().hash(state);
    }
}
