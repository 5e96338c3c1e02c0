//! Feature expansion
//!
//! A feature request such as `auth` is realised by whichever registry module
//! declares `feature: auth` and whose `when` conditions match the detected
//! stack. The stack is `framework = <project framework>` plus, for every
//! module already requested, `<capability> = <module name>` for each
//! capability it provides:
//!
//! ```text
//! adapter/drizzle provides database-orm  ->  database-orm = drizzle
//! ```
//!
//! The candidate with the most matching conditions wins. A conditioned match
//! gets full confidence, a generic one (no conditions) a reduced one.

use std::collections::BTreeMap;

use crate::config::Genome;
use crate::domain::{Conflict, ConflictKind, Module, ModuleOrigin};
use crate::registry::ModuleRegistry;

use super::Seed;

/// Confidence of a feature module chosen on matching conditions
pub const CONDITIONED_CONFIDENCE: u8 = 100;

/// Confidence of a feature module without conditions
pub const GENERIC_CONFIDENCE: u8 = 60;

/// Result of expanding every feature request
#[derive(Debug, Default)]
pub struct FeatureExpansion {
    pub seeds: Vec<Seed>,
    pub conflicts: Vec<Conflict>,
}

/// Key/value description of the stack the requested modules form
pub fn detect_stack(registry: &ModuleRegistry, framework: &str, seeds: &[Seed]) -> BTreeMap<String, String> {
    let mut stack = BTreeMap::new();
    stack.insert("framework".to_string(), framework.to_string());
    for module in seeds.iter().filter_map(|seed| registry.get(&seed.id)) {
        for capability in &module.provides {
            stack
                .entry(capability.clone())
                .or_insert_with(|| module.name().to_string());
        }
    }
    stack
}

/// Expand the genome's feature requests into seeds
pub fn expand_features(registry: &ModuleRegistry, genome: &Genome, seeds: &[Seed]) -> FeatureExpansion {
    let framework = genome.project.framework.as_str();
    let stack = detect_stack(registry, framework, seeds);
    let mut expansion = FeatureExpansion::default();

    for feature in &genome.features {
        let candidates: Vec<&Module> = registry
            .feature_candidates(feature)
            .into_iter()
            .filter(|m| m.supports_framework(framework) && conditions_match(m, &stack))
            .collect();

        let Some(best) = candidates.iter().map(|m| m.when.len()).max() else {
            let known = registry.features();
            expansion.conflicts.push(
                Conflict::warning(
                    ConflictKind::FeatureExpansion,
                    feature.as_str(),
                    format!("no module realises feature '{feature}' for this stack"),
                )
                .with_suggestions(known.iter().map(|f| format!("use feature {f}"))),
            );
            continue;
        };

        // Candidates are sorted by id, so the first of the most specific wins ties
        let top: Vec<&Module> = candidates
            .into_iter()
            .filter(|m| m.when.len() == best)
            .collect();
        let chosen = top[0];
        if top.len() > 1 {
            let others: Vec<&str> = top[1..].iter().map(|m| m.id.as_str()).collect();
            expansion.conflicts.push(
                Conflict::warning(
                    ConflictKind::FeatureExpansion,
                    chosen.id.as_str(),
                    format!(
                        "feature '{feature}' matched {} equally specific modules, chose '{}'",
                        top.len(),
                        chosen.id
                    ),
                )
                .with_suggestions(others.iter().map(|id| format!("list {id} in the genome instead"))),
            );
        }

        let (confidence, reason) = if chosen.when.is_empty() {
            (
                GENERIC_CONFIDENCE,
                format!("feature '{feature}' matched generic module"),
            )
        } else {
            let conditions: Vec<String> = chosen
                .when
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            (
                CONDITIONED_CONFIDENCE,
                format!("feature '{feature}' matched on {}", conditions.join(", ")),
            )
        };
        tracing::debug!(feature = %feature, module = %chosen.id, confidence, "feature expanded");
        expansion
            .seeds
            .push(Seed::new(&chosen.id, ModuleOrigin::Feature, confidence, reason));
    }

    expansion
}

fn conditions_match(module: &Module, stack: &BTreeMap<String, String>) -> bool {
    module
        .when
        .iter()
        .all(|(key, value)| stack.get(key) == Some(value))
}
