//! The provider manager (C3): scope-keyed instance maps, lazy
//! materialisation, and priority-ordered event dispatch (§4.3).
//!
//! Two persistent maps back [`neuron_runtime::Scope::Global`] and
//! [`neuron_runtime::Scope::Scoped`] instances; `Jit` never persists —
//! a fresh instance is built, invoked, and dropped for every dispatch
//! that reaches it. [`ProviderConfig`] is structurally `Eq + Hash`
//! (`neuron-runtime`), which is exactly the scope-key equality spec §9
//! resolves on: two configurations equal by their declared fields share
//! an instance; there is no interior runtime state to exclude.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use neuron_runtime::{ProviderConfig, RunContext, Scope};
use tracing::warn;

use crate::event::{Event, EventKind};
use crate::patch::ContextPatch;
use crate::provider::{Provider, ProviderError, ProviderFactory};

/// One scope's persistent instance, paired with the configuration that
/// produced it (needed to read back its `priority` at dispatch time).
type Instance = (ProviderConfig, Arc<dyn Provider>);

/// Newly materialised provider instances from one `ensure_agent_providers`
/// call — the set `RunStart` must be fired to (§4.3).
#[derive(Default)]
pub struct MaterializeResult {
    /// Instances created by this call, in declaration order.
    pub new_instances: Vec<Instance>,
}

/// Owns provider instances keyed by scope and fans lifecycle events out
/// to subscribers in priority order (C3/C4).
pub struct ProviderManager {
    factories: RwLock<HashMap<String, Arc<dyn ProviderFactory>>>,
    global: RwLock<HashMap<ProviderConfig, Arc<dyn Provider>>>,
    scoped: RwLock<HashMap<(String, ProviderConfig), Arc<dyn Provider>>>,
}

impl ProviderManager {
    /// An empty manager with no registered factories or instances.
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
            global: RwLock::new(HashMap::new()),
            scoped: RwLock::new(HashMap::new()),
        }
    }

    /// Register the factory that builds instances for `kind`. A later
    /// registration for the same `kind` replaces the earlier one.
    pub fn register_factory(&self, kind: impl Into<String>, factory: Arc<dyn ProviderFactory>) {
        self.factories.write().unwrap().insert(kind.into(), factory);
    }

    fn build(&self, config: &ProviderConfig) -> Result<Arc<dyn Provider>, ProviderError> {
        let factories = self.factories.read().unwrap();
        let factory = factories
            .get(&config.kind)
            .ok_or_else(|| ProviderError::UnknownKind(config.kind.clone()))?;
        factory.create(config)
    }

    /// Walk `configs` (an agent's declared provider configurations) and
    /// create any `Global`/`Scoped` instances not yet materialised for
    /// `agent_name`. `Jit` configs never persist and are not created here.
    ///
    /// Returns the instances created by this call specifically, so the
    /// caller can fire `RunStart` to only the new ones (§4.3).
    pub fn ensure_agent_providers(
        &self,
        agent_name: &str,
        configs: &[ProviderConfig],
    ) -> Result<MaterializeResult, ProviderError> {
        let mut new_instances = Vec::new();

        for config in configs {
            match config.scope {
                Scope::Global => {
                    let already_present = self.global.read().unwrap().contains_key(config);
                    if !already_present {
                        let instance = self.build(config)?;
                        self.global
                            .write()
                            .unwrap()
                            .insert(config.clone(), instance.clone());
                        new_instances.push((config.clone(), instance));
                    }
                }
                Scope::Scoped => {
                    let key = (agent_name.to_string(), config.clone());
                    let already_present = self.scoped.read().unwrap().contains_key(&key);
                    if !already_present {
                        let instance = self.build(config)?;
                        self.scoped
                            .write()
                            .unwrap()
                            .insert(key, instance.clone());
                        new_instances.push((config.clone(), instance));
                    }
                }
                Scope::Jit => {
                    // Never persisted; nothing to materialise up front.
                }
            }
        }

        Ok(MaterializeResult { new_instances })
    }

    /// Resolve the live instance for `config` under `agent_name`,
    /// building a fresh one for `Jit` scope. Returns `Ok(None)` only if
    /// a `Global`/`Scoped` instance was expected but never materialised
    /// (defensive — `ensure_agent_providers` should have run first).
    fn resolve(
        &self,
        agent_name: &str,
        config: &ProviderConfig,
    ) -> Result<Option<Arc<dyn Provider>>, ProviderError> {
        match config.scope {
            Scope::Global => Ok(self.global.read().unwrap().get(config).cloned()),
            Scope::Scoped => {
                let key = (agent_name.to_string(), config.clone());
                Ok(self.scoped.read().unwrap().get(&key).cloned())
            }
            Scope::Jit => self.build(config).map(Some),
        }
    }

    /// Dispatch `kind` to every provider instance the current agent's
    /// turn touches: **all** materialised `Global` instances (regardless
    /// of which agent originally declared their configuration), this
    /// agent's own `Scoped` instances, and a fresh instance per `Jit`
    /// configuration the agent declares — in priority-ascending stable
    /// order, folding the patches they return (§4.3 Dispatch order:
    /// "all globals, all scoped entries for this agent, a fresh jit for
    /// each jit config").
    ///
    /// `configs` is the current agent's own declared provider
    /// configurations, used only to resolve its `Scoped`/`Jit`
    /// instances — `Global` entries within it are skipped here since
    /// every live `Global` instance is already picked up from the
    /// process-wide map, agent-declared or not; a `Global` provider
    /// materialised by a different agent must keep receiving events
    /// after a handoff away from that agent (§3 invariant 5).
    ///
    /// A handler that errors is logged via `tracing::warn!` and skipped;
    /// subsequent handlers still run (§4.3 Failure semantics).
    pub async fn dispatch(
        &self,
        kind: EventKind,
        agent_name: &str,
        configs: &[ProviderConfig],
        ctx: &RunContext,
    ) -> ContextPatch {
        let mut active: Vec<Instance> = self.global.read().unwrap().clone().into_iter().collect();

        for config in configs {
            match config.scope {
                Scope::Global => continue,
                Scope::Scoped | Scope::Jit => match self.resolve(agent_name, config) {
                    Ok(Some(instance)) => active.push((config.clone(), instance)),
                    Ok(None) => {
                        warn!(
                            kind = %kind,
                            provider_kind = %config.kind,
                            "provider instance not materialised; skipping dispatch"
                        );
                    }
                    Err(err) => {
                        warn!(kind = %kind, provider_kind = %config.kind, error = %err, "failed to build jit provider");
                    }
                },
            }
        }

        let active: Vec<Instance> = active
            .into_iter()
            .filter(|(_, instance)| instance.subscribed_events().contains(&kind))
            .collect();

        self.fire_to_instances(kind, &active, ctx).await
    }

    /// Dispatch `kind` to exactly the given instances, in
    /// priority-ascending stable order, folding their patches.
    ///
    /// Used directly for `RunStart`, which fires only to newly
    /// materialised instances (§4.3), and internally by [`Self::dispatch`].
    pub async fn fire_to_instances(
        &self,
        kind: EventKind,
        instances: &[Instance],
        ctx: &RunContext,
    ) -> ContextPatch {
        let mut ordered = instances.to_vec();
        ordered.sort_by_key(|(config, _)| config.priority);

        let event = Event::new(kind, ctx);
        let mut merged = ContextPatch::empty();
        for (config, instance) in &ordered {
            match instance.handle(&event).await {
                Ok(Some(patch)) => merged.merge(patch),
                Ok(None) => {}
                Err(err) => {
                    warn!(kind = %kind, provider_kind = %config.kind, error = %err, "provider handler failed; skipping");
                }
            }
        }
        merged
    }
}

impl Default for ProviderManager {
    fn default() -> Self {
        Self::new()
    }
}
