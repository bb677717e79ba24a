//! Item-tier index
//!
//! Derives, per mapping document, the tier-label → item-set association and
//! the deterministic tier processing order. List-valued assignments expand
//! into every listed tier: an item may belong to several tiers at once and
//! will then appear under each of them.

use filtergen_common::docs::{MappingDocument, TierDocument};
use filtergen_common::TierRank;
use std::collections::BTreeMap;
use tracing::warn;

/// Per-category index of tier membership and processing order.
#[derive(Debug, Clone, Default)]
pub struct TierIndex {
    /// Tier label → sorted, deduplicated item set
    pub items_by_tier: BTreeMap<String, Vec<String>>,
    /// Tiers to process, in order: explicit `tier_order` entries first,
    /// then remaining used tiers by rank with the hide tier last
    pub tier_order: Vec<String>,
}

impl TierIndex {
    /// Build the index for one mapping/tier-definition pair.
    ///
    /// Items assigned to a tier label the category does not define are
    /// logged and excluded; tiers defined but assigned no items are
    /// skipped.
    pub fn build(mapping: &MappingDocument, tiers: &TierDocument) -> TierIndex {
        let mut items_by_tier: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (item, assignment) in &mapping.mapping {
            for label in assignment.labels() {
                if !tiers.tiers.contains_key(label) {
                    warn!(
                        category = %tiers.category,
                        item = %item,
                        tier = %label,
                        "Item mapped to undefined tier, excluded"
                    );
                    continue;
                }
                items_by_tier
                    .entry(label.to_string())
                    .or_default()
                    .push(item.clone());
            }
        }
        for items in items_by_tier.values_mut() {
            items.sort();
            items.dedup();
        }

        let mut tier_order: Vec<String> = mapping
            .meta
            .tier_order
            .iter()
            .filter(|label| items_by_tier.contains_key(label.as_str()))
            .cloned()
            .collect();
        let mut remaining: Vec<&String> = items_by_tier
            .keys()
            .filter(|label| !tier_order.contains(label))
            .collect();
        remaining.sort_by_key(|label| TierRank::parse(label));
        tier_order.extend(remaining.into_iter().cloned());

        TierIndex {
            items_by_tier,
            tier_order,
        }
    }
}
