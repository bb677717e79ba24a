//! Rule resolution
//!
//! The per-tier state machine: starting from the tier's full item set
//! (`pending`), enabled rules consume items in document order, each
//! producing up to two match groups (one per match mode). Whatever is left
//! becomes the base group(s). Every item of the tier ends up in exactly one
//! group: no loss, no duplication.

use filtergen_common::docs::{
    MappingDocument, MatchMode, OverrideRule, SoundCatalog, SoundSpec, StyleOverrides,
    TierDocument,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Where a match group came from; drives header rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockSource {
    /// An explicit user rule (numbered per emitted block within the tier)
    Rule { number: usize },
    /// An implicit rule injected from the sound catalog
    AutoSound { item: String },
    /// The unruled remainder of the tier
    Base,
}

/// One group of items sharing a rule, match mode, and styling.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchGroup {
    pub items: Vec<String>,
    pub mode: MatchMode,
    pub source: BlockSource,
    pub overrides: StyleOverrides,
    pub conditions: BTreeMap<String, Value>,
    pub raw: Option<String>,
    pub comment: Option<String>,
}

/// Log rules whose tier-override names a tier label the category does not
/// define. Such rules can never apply; silently ignoring them hides author
/// mistakes, so they are surfaced once per category.
pub fn check_dangling_tier_refs(mapping: &MappingDocument, tiers: &TierDocument) {
    for (position, rule) in mapping.rules.iter().enumerate() {
        if let Some(target_tier) = rule.overrides.tier.as_deref() {
            if !tiers.tiers.contains_key(target_tier) {
                warn!(
                    category = %tiers.category,
                    rule = position,
                    tier = %target_tier,
                    "Rule tier-override references an undefined tier"
                );
            }
        }
    }
}

/// Resolve all match groups for one (category, tier) pass.
pub fn resolve_tier(
    tier_label: &str,
    items: &[String],
    mapping: &MappingDocument,
    catalog: &SoundCatalog,
) -> Vec<MatchGroup> {
    let auto_rules = synthesize_sound_rules(items, &mapping.rules, catalog);

    let mut pending: BTreeSet<String> = items.iter().cloned().collect();
    let mut groups = Vec::new();
    let mut rule_counter = 0usize;

    let user_rules = mapping
        .rules
        .iter()
        .map(|rule| (rule, None))
        .chain(auto_rules.iter().map(|(item, rule)| (rule, Some(item))));

    for (rule, auto_item) in user_rules {
        if rule.disabled {
            continue;
        }

        let matches: Vec<String> = match rule.overrides.tier.as_deref() {
            Some(target_tier) => {
                if target_tier != tier_label {
                    continue;
                }
                if rule.apply_to_tier {
                    pending.iter().cloned().collect()
                } else if !rule.targets.is_empty() {
                    // Restricted to items still pending in this tier, so the
                    // per-tier partition stays exact.
                    rule.targets
                        .iter()
                        .filter(|t| pending.contains(*t))
                        .cloned()
                        .collect()
                } else {
                    continue;
                }
            }
            None => {
                if rule.targets.is_empty() {
                    continue;
                }
                rule.targets
                    .iter()
                    .filter(|t| pending.contains(*t))
                    .cloned()
                    .collect()
            }
        };
        if matches.is_empty() {
            continue;
        }

        let (exact, partial) = partition(
            &matches,
            |item| resolve_match_mode(item, Some(&rule.target_match_modes), mapping),
        );
        for (subgroup, mode) in [(exact, MatchMode::Exact), (partial, MatchMode::Partial)] {
            if subgroup.is_empty() {
                continue;
            }
            let source = match auto_item {
                Some(item) => BlockSource::AutoSound { item: item.clone() },
                None => {
                    rule_counter += 1;
                    BlockSource::Rule {
                        number: rule_counter,
                    }
                }
            };
            groups.push(MatchGroup {
                items: subgroup,
                mode,
                source,
                overrides: rule.overrides.clone(),
                conditions: rule.conditions.clone(),
                raw: rule.raw.clone(),
                comment: rule.comment.clone(),
            });
        }

        for matched in &matches {
            pending.remove(matched);
        }
    }

    if !pending.is_empty() {
        debug!(
            tier = %tier_label,
            remaining = pending.len(),
            "Emitting base blocks for unruled items"
        );
        let remaining: Vec<String> = pending.into_iter().collect();
        let (exact, partial) = partition(&remaining, |item| resolve_match_mode(item, None, mapping));
        for (subgroup, mode) in [(exact, MatchMode::Exact), (partial, MatchMode::Partial)] {
            if subgroup.is_empty() {
                continue;
            }
            groups.push(MatchGroup {
                items: subgroup,
                mode,
                source: BlockSource::Base,
                overrides: StyleOverrides::default(),
                conditions: BTreeMap::new(),
                raw: None,
                comment: None,
            });
        }
    }

    groups
}

/// Unified match-mode resolution: rule-level table first, then the
/// document-level table, defaulting to exact.
fn resolve_match_mode(
    item: &str,
    rule_modes: Option<&BTreeMap<String, MatchMode>>,
    mapping: &MappingDocument,
) -> MatchMode {
    rule_modes
        .and_then(|modes| modes.get(item))
        .or_else(|| mapping.meta.match_modes.get(item))
        .copied()
        .unwrap_or_default()
}

fn partition<F>(items: &[String], mode_of: F) -> (Vec<String>, Vec<String>)
where
    F: Fn(&str) -> MatchMode,
{
    let mut exact = Vec::new();
    let mut partial = Vec::new();
    for item in items {
        match mode_of(item) {
            MatchMode::Exact => exact.push(item.clone()),
            MatchMode::Partial => partial.push(item.clone()),
        }
    }
    (exact, partial)
}

/// Synthesize implicit single-target rules for tier items that have a
/// catalog sound but are not targeted by any explicit rule.
fn synthesize_sound_rules(
    items: &[String],
    rules: &[OverrideRule],
    catalog: &SoundCatalog,
) -> Vec<(String, OverrideRule)> {
    let mut synthesized = Vec::new();
    for item in items {
        let Some(sound) = catalog.basetype_sounds.get(item) else {
            continue;
        };
        let explicitly_targeted = rules.iter().any(|rule| rule.targets.iter().any(|t| t == item));
        if explicitly_targeted {
            continue;
        }
        debug!(item = %item, "Injecting auto-sound rule");
        synthesized.push((
            item.clone(),
            OverrideRule {
                targets: vec![item.clone()],
                overrides: StyleOverrides {
                    sound: Some(SoundSpec(sound.file.clone(), sound.volume)),
                    ..Default::default()
                },
                ..Default::default()
            },
        ));
    }
    synthesized
}
