//! Capability resolution
//!
//! Closes the requested module set over its prerequisites and validates it.
//!
//! ## Algorithm
//!
//! 1. **Seed**: every requested module is looked up in the registry, in
//!    request order. Unknown ids and duplicate genome entries become conflicts.
//! 2. **Closure** (worklist): dependency ids that are not present are added
//!    from the registry. Once no dependency is pending, each module's required
//!    capabilities are checked; a capability with no present provider and a
//!    single registry provider pulls that provider in. New modules go back on
//!    the worklist.
//! 3. **Binding**: with the final set, every requirement is bound to the
//!    present providers. Zero providers, or several for a single-provider
//!    requirement, is an error conflict with suggestions.
//! 4. **Checks**: incompatible pairs, more than one framework, and modules
//!    that do not support the project framework.
//!
//! Conflicts are collected rather than returned early, so one run reports
//! everything wrong with a genome.

use std::collections::HashMap;

use crate::domain::{
    CapabilityRequirement, Conflict, ConflictKind, ModuleCategory, ModuleOrigin, ResolvedModule,
};
use crate::error::{Result, resolution::failed as resolution_failed};
use crate::registry::ModuleRegistry;

use super::Seed;

/// Confidence of a provider added because it was the only candidate
pub const SOLE_PROVIDER_CONFIDENCE: u8 = 80;

/// Confidence of a module added as an explicit dependency
pub const DEPENDENCY_CONFIDENCE: u8 = 100;

/// Output of capability resolution
#[derive(Debug, Default)]
pub struct Resolution {
    /// Resolved modules in insertion order, which seeds planner tie-breaks
    pub modules: Vec<ResolvedModule>,
    pub conflicts: Vec<Conflict>,
}

impl Resolution {
    pub fn get(&self, id: &str) -> Option<&ResolvedModule> {
        self.modules.iter().find(|m| m.id() == id)
    }

    /// Module ids in insertion order
    pub fn execution_order(&self) -> Vec<&str> {
        self.modules.iter().map(ResolvedModule::id).collect()
    }

    pub fn errors(&self) -> Vec<&Conflict> {
        self.conflicts.iter().filter(|c| c.is_error()).collect()
    }

    pub fn warnings(&self) -> Vec<&Conflict> {
        self.conflicts.iter().filter(|c| !c.is_error()).collect()
    }

    pub fn has_errors(&self) -> bool {
        self.conflicts.iter().any(Conflict::is_error)
    }

    /// Fail with every error conflict aggregated, if there are any
    pub fn ensure_no_errors(&self) -> Result<()> {
        if self.has_errors() {
            Err(resolution_failed(&self.errors()))
        } else {
            Ok(())
        }
    }
}

/// Resolves module prerequisites against a registry
pub struct CapabilityResolver<'a> {
    registry: &'a ModuleRegistry,
}

/// Mutable state of one resolution run
struct ResolveState {
    modules: Vec<ResolvedModule>,
    by_id: HashMap<String, usize>,
    conflicts: Vec<Conflict>,
}

impl ResolveState {
    fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    fn push(&mut self, module: ResolvedModule) {
        self.by_id.insert(module.id().to_string(), self.modules.len());
        self.modules.push(module);
    }

    /// Present providers of a capability, excluding the consumer itself
    fn present_providers(&self, capability: &str, consumer: &str) -> Vec<String> {
        self.modules
            .iter()
            .filter(|m| m.id() != consumer && m.module.provides.contains(capability))
            .map(|m| m.id().to_string())
            .collect()
    }
}

impl<'a> CapabilityResolver<'a> {
    pub fn new(registry: &'a ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Resolve seeds into a closed, validated module set
    pub fn resolve(&self, framework: &str, seeds: Vec<Seed>) -> Resolution {
        let mut state = ResolveState {
            modules: Vec::new(),
            by_id: HashMap::new(),
            conflicts: Vec::new(),
        };

        self.add_seeds(&mut state, seeds);
        self.close(&mut state);
        self.bind(&mut state);
        check_incompatible(&mut state);
        check_frameworks(&mut state, framework);

        tracing::debug!(
            modules = state.modules.len(),
            conflicts = state.conflicts.len(),
            "capability resolution finished"
        );
        Resolution {
            modules: state.modules,
            conflicts: state.conflicts,
        }
    }

    fn add_seeds(&self, state: &mut ResolveState, seeds: Vec<Seed>) {
        for seed in seeds {
            if let Some(&idx) = state.by_id.get(&seed.id) {
                let existing = &mut state.modules[idx];
                if seed.origin == ModuleOrigin::Explicit && existing.origin == ModuleOrigin::Explicit {
                    state.conflicts.push(
                        Conflict::warning(
                            ConflictKind::Duplicate,
                            seed.id.as_str(),
                            "listed more than once in the genome; the first entry is used",
                        )
                        .with_suggestions([format!("remove the duplicate {} entry", seed.id)]),
                    );
                } else {
                    existing.trace(seed.reason);
                }
                continue;
            }

            match self.registry.get(&seed.id) {
                Some(module) => {
                    let mut resolved = ResolvedModule::new(module.clone(), seed.origin, seed.confidence);
                    resolved.override_parameters(&seed.parameters);
                    resolved.trace(seed.reason);
                    state.push(resolved);
                }
                None => {
                    let mut suggestions: Vec<String> = self
                        .registry
                        .similar_ids(&seed.id)
                        .into_iter()
                        .map(|id| format!("use {id}"))
                        .collect();
                    suggestions.push(format!("remove {}", seed.id));
                    state.conflicts.push(
                        Conflict::error(
                            ConflictKind::UnknownModule,
                            seed.id.as_str(),
                            "module is not in the registry",
                        )
                        .with_suggestions(suggestions),
                    );
                }
            }
        }
    }

    /// Worklist closure over dependencies and sole capability providers
    fn close(&self, state: &mut ResolveState) {
        let mut deps_done = 0;
        let mut caps_done = 0;

        while caps_done < state.modules.len() {
            while deps_done < state.modules.len() {
                self.add_dependencies(state, deps_done);
                deps_done += 1;
            }
            self.add_sole_providers(state, caps_done);
            caps_done += 1;
        }
    }

    fn add_dependencies(&self, state: &mut ResolveState, idx: usize) {
        let consumer = state.modules[idx].id().to_string();
        let dependencies = state.modules[idx].module.dependencies.clone();

        for dep in dependencies {
            if state.contains(&dep) {
                continue;
            }
            if let Some(module) = self.registry.get(&dep) {
                let mut resolved =
                    ResolvedModule::new(module.clone(), ModuleOrigin::Dependency, DEPENDENCY_CONFIDENCE);
                resolved.trace(format!("added as dependency of {consumer}"));
                tracing::debug!(module = %dep, dependent = %consumer, "added dependency");
                state.push(resolved);
            } else if !self.registry.is_capability(&dep) {
                let mut suggestions: Vec<String> = self
                    .registry
                    .similar_ids(&dep)
                    .into_iter()
                    .map(|id| format!("depend on {id}"))
                    .collect();
                suggestions.push(format!("remove {consumer}"));
                state.conflicts.push(
                    Conflict::error(
                        ConflictKind::MissingDependency,
                        consumer.as_str(),
                        format!("depends on '{dep}', which is neither a module nor a capability"),
                    )
                    .with_suggestions(suggestions),
                );
            }
            // Capability-named dependencies are bound as requirements later
        }
    }

    fn add_sole_providers(&self, state: &mut ResolveState, idx: usize) {
        let consumer = state.modules[idx].id().to_string();
        for requirement in self.requirements(&state.modules[idx]) {
            let capability = requirement.capability();
            if !state.present_providers(capability, &consumer).is_empty() {
                continue;
            }
            let candidates: Vec<&String> = self
                .registry
                .providers(capability)
                .iter()
                .filter(|id| **id != consumer)
                .collect();
            if let [only] = candidates.as_slice() {
                if let Some(module) = self.registry.get(only) {
                    let mut resolved = ResolvedModule::new(
                        module.clone(),
                        ModuleOrigin::Capability,
                        SOLE_PROVIDER_CONFIDENCE,
                    );
                    resolved.trace(format!(
                        "added as sole provider of '{capability}' for {consumer}"
                    ));
                    tracing::debug!(module = %only, capability, consumer = %consumer, "added sole provider");
                    state.push(resolved);
                }
            }
        }
    }

    /// Bind each requirement to the present providers, reporting failures
    fn bind(&self, state: &mut ResolveState) {
        for idx in 0..state.modules.len() {
            let consumer = state.modules[idx].id().to_string();
            for requirement in self.requirements(&state.modules[idx]) {
                let capability = requirement.capability().to_string();
                let providers = state.present_providers(&capability, &consumer);

                match providers.len() {
                    0 => {
                        let mut suggestions: Vec<String> = self
                            .registry
                            .providers(&capability)
                            .iter()
                            .filter(|id| **id != consumer)
                            .map(|id| format!("add {id}"))
                            .collect();
                        suggestions.push(format!("remove {consumer}"));
                        state.conflicts.push(
                            Conflict::error(
                                ConflictKind::MissingCapability,
                                consumer.as_str(),
                                format!("requires capability '{capability}' but no module provides it"),
                            )
                            .with_capability(capability.as_str())
                            .with_suggestions(suggestions),
                        );
                    }
                    1 => {}
                    _ if requirement.accepts_multiple() => {}
                    _ => {
                        state.conflicts.push(
                            Conflict::error(
                                ConflictKind::AmbiguousProvider,
                                consumer.as_str(),
                                format!(
                                    "requires exactly one provider of '{capability}' but found: {}",
                                    providers.join(", ")
                                ),
                            )
                            .with_capability(capability.as_str())
                            .with_suggestions(providers.iter().map(|p| format!("remove {p}"))),
                        );
                        continue;
                    }
                }

                if !providers.is_empty() {
                    let module = &mut state.modules[idx];
                    module.trace(format!(
                        "capability '{capability}' bound to {}",
                        providers.join(", ")
                    ));
                    module.capabilities.insert(capability, providers);
                }
            }
        }
    }

    /// Declared requirements plus dependencies that name capabilities
    fn requirements(&self, module: &ResolvedModule) -> Vec<CapabilityRequirement> {
        let mut requirements = module.module.requires.clone();
        for dep in &module.module.dependencies {
            if !self.registry.contains(dep) && self.registry.is_capability(dep) {
                requirements.push(CapabilityRequirement::Exactly(dep.clone()));
            }
        }
        requirements
    }
}

fn check_incompatible(state: &mut ResolveState) {
    let mut found = Vec::new();
    for (i, a) in state.modules.iter().enumerate() {
        for b in &state.modules[i + 1..] {
            if a.module.incompatible_with.contains(b.id()) || b.module.incompatible_with.contains(a.id()) {
                found.push(
                    Conflict::error(
                        ConflictKind::Incompatible,
                        a.id(),
                        format!("cannot be used together with {}", b.id()),
                    )
                    .with_suggestions([format!("remove {}", a.id()), format!("remove {}", b.id())]),
                );
            }
        }
    }
    state.conflicts.extend(found);
}

fn check_frameworks(state: &mut ResolveState, framework: &str) {
    let frameworks: Vec<&ResolvedModule> = state
        .modules
        .iter()
        .filter(|m| m.category() == ModuleCategory::Framework)
        .collect();
    let mut found = Vec::new();

    if frameworks.len() > 1 {
        let ids: Vec<&str> = frameworks.iter().map(|m| m.id()).collect();
        for extra in &frameworks[1..] {
            found.push(
                Conflict::error(
                    ConflictKind::MultipleFrameworks,
                    extra.id(),
                    format!("only one framework module is allowed, found: {}", ids.join(", ")),
                )
                .with_suggestions([format!("remove {}", extra.id())]),
            );
        }
    }

    for module in &state.modules {
        if !module.module.supports_framework(framework) {
            found.push(
                Conflict::error(
                    ConflictKind::UnsupportedFramework,
                    module.id(),
                    format!(
                        "supports {} but the project uses {framework}",
                        module.module.frameworks.join(", ")
                    ),
                )
                .with_suggestions([format!("remove {}", module.id())]),
            );
        }
    }
    state.conflicts.extend(found);
}
