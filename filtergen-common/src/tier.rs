//! Tier label ranking and deterministic ordering
//!
//! Tier labels are free-form strings like `"Tier 1 General"` or
//! `"Hide Currency"`. Processing order is derived from the label: labels
//! containing `"Tier 0"` sort first, numeric `"Tier N"` labels sort by N,
//! and any label containing `"Hide"` sorts last, irrespective of input
//! order.

/// Rank parsed from a tier label.
///
/// The derived `Ord` sorts hide tiers after everything else (the `hide`
/// field comes first), then by numeric rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TierRank {
    hide: bool,
    rank: u8,
}

/// Rank assigned to labels that carry no recognizable tier number.
pub const UNRANKED: u8 = 99;

impl TierRank {
    /// Parse a tier label into its ordering rank.
    pub fn parse(label: &str) -> Self {
        if label.contains("Tier 0") {
            return TierRank { hide: false, rank: 0 };
        }
        if label.contains("Hide") {
            return TierRank { hide: true, rank: 9 };
        }
        let rank = label
            .split_once("Tier ")
            .and_then(|(_, rest)| {
                let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse::<u8>().ok()
            })
            .unwrap_or(UNRANKED);
        TierRank { hide: false, rank }
    }

    /// Whether this is the hide tier.
    pub fn is_hide(&self) -> bool {
        self.hide
    }

    /// Numeric rank shown in headers and used for theme lookup
    /// (0 = top, 9 = hide tier, else N).
    pub fn display(&self) -> u8 {
        self.rank
    }

    /// Theme table key for this rank (`"Tier {N}"`).
    pub fn theme_key(&self) -> String {
        format!("Tier {}", self.rank)
    }
}
