//! Configuration document models
//!
//! The configuration store is a set of loosely-typed JSON documents edited
//! by an external tool. They are modeled here as explicit record types with
//! defaults for every optional field, so validation happens once at load
//! time and the compiler core works on typed data only.
//!
//! Conventions shared by all document kinds:
//! - keys starting with `"//"` are author comments and are skipped
//! - `_meta` carries category metadata and localization tables

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::color::ColorSpec;
use crate::error::{Error, Result};

/// Whether a basetype condition requires exact string equality or looser
/// substring matching in the output rule language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Exact,
    Partial,
}

/// An item's tier assignment: a single label or an ordered list of labels.
/// An item may legitimately belong to several tiers at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TierAssignment {
    One(String),
    Many(Vec<String>),
}

impl TierAssignment {
    /// All tier labels this assignment expands to, in document order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        match self {
            TierAssignment::One(label) => std::slice::from_ref(label).iter(),
            TierAssignment::Many(labels) => labels.iter(),
        }
        .map(String::as_str)
    }
}

/// A name that is either plain or localized per language
/// (e.g. `"Stackable Currency"` vs `{"en": "...", "ch": "..."}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    PerLanguage(BTreeMap<String, String>),
}

impl LocalizedText {
    /// Canonical (English) form, used for emitted conditions.
    pub fn canonical<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            LocalizedText::Plain(s) => s,
            LocalizedText::PerLanguage(map) => map.get("en").map(String::as_str).unwrap_or(fallback),
        }
    }

    /// Display form for the requested language key, falling back to the
    /// canonical form.
    pub fn display<'a>(&'a self, language: &str, fallback: &'a str) -> &'a str {
        match self {
            LocalizedText::Plain(s) => s,
            LocalizedText::PerLanguage(map) => map
                .get(language)
                .or_else(|| map.get("en"))
                .map(String::as_str)
                .unwrap_or(fallback),
        }
    }
}

/// A per-language localization table on a mapping document: either just the
/// translated category name, or a per-item table that also carries the
/// category name under `__class_name__`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocaleTable {
    Name(String),
    Items(BTreeMap<String, String>),
}

/// Key carrying the translated category name inside an item table.
pub const CLASS_NAME_KEY: &str = "__class_name__";

impl LocaleTable {
    /// Translated category name, if present.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            LocaleTable::Name(s) => Some(s),
            LocaleTable::Items(map) => map.get(CLASS_NAME_KEY).map(String::as_str),
        }
    }

    /// Translated item name, if present.
    pub fn item(&self, name: &str) -> Option<&str> {
        match self {
            LocaleTable::Name(_) => None,
            LocaleTable::Items(map) => map.get(name).map(String::as_str),
        }
    }
}

/// Category metadata carried in a mapping document's `_meta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryMeta {
    /// Item class for emitted `Class` conditions (plain or localized)
    pub item_class: Option<LocalizedText>,
    /// Key into the theme document; falls back to the category key
    pub theme_category: Option<String>,
    /// Explicit tier processing order; wins over rank sorting
    pub tier_order: Vec<String>,
    /// Document-level per-item match-mode table
    pub match_modes: BTreeMap<String, MatchMode>,
    /// Per-language localization tables
    pub localization: BTreeMap<String, LocaleTable>,
}

/// A sound override as `[file, volume]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundSpec(pub String, pub u32);

/// Style overrides carried by a rule. Every field is optional; absent
/// fields fall through to the tier theme, then the global default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverrides {
    /// Tier-override: the rule applies only when compiling this tier
    #[serde(rename = "Tier")]
    pub tier: Option<String>,
    #[serde(rename = "FontSize")]
    pub font_size: Option<u32>,
    #[serde(rename = "TextColor")]
    pub text_color: Option<ColorSpec>,
    #[serde(rename = "BorderColor")]
    pub border_color: Option<ColorSpec>,
    #[serde(rename = "BackgroundColor")]
    pub background_color: Option<ColorSpec>,
    #[serde(rename = "PlayEffect")]
    pub play_effect: Option<String>,
    #[serde(rename = "MinimapIcon")]
    pub minimap_icon: Option<String>,
    #[serde(rename = "PlayAlertSound")]
    pub sound: Option<SoundSpec>,
}

/// A targeted override rule on a mapping document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideRule {
    /// Target item list; empty means tier-wide (with `apply_to_tier`)
    pub targets: Vec<String>,
    pub overrides: StyleOverrides,
    /// With a tier-override: consume the tier's whole pending set
    #[serde(rename = "applyToTier")]
    pub apply_to_tier: bool,
    /// Rule-level per-item match-mode table (wins over the document table)
    #[serde(rename = "targetMatchModes")]
    pub target_match_modes: BTreeMap<String, MatchMode>,
    /// Free-form condition predicates (`ItemLevel` → `">= 60"`, ...)
    pub conditions: BTreeMap<String, Value>,
    /// Verbatim lines appended to the block as-is
    pub raw: Option<String>,
    pub comment: Option<String>,
    pub disabled: bool,
}

/// A mapping document: category metadata, item → tier(s) table, rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingDocument {
    #[serde(rename = "_meta")]
    pub meta: CategoryMeta,
    pub mapping: BTreeMap<String, TierAssignment>,
    pub rules: Vec<OverrideRule>,
}

/// Theme reference on a tier entry (`theme.Tier` is the numeric rank).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTheme {
    #[serde(rename = "Tier")]
    pub rank: Option<u8>,
}

/// Sound reference on a tier entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierSound {
    /// Built-in client sound id; `-1` disables
    pub default_sound_id: Option<i64>,
    /// Reference into the sound catalog's `class_sounds` table
    pub custom_sound_id: Option<String>,
}

/// One tier's entry in a tier-definition document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierEntry {
    pub theme: TierTheme,
    pub sound: TierSound,
    /// Emit `Hide` blocks (and no styling) for this tier
    pub is_hide_tier: bool,
    /// Tier is locked against bulk edits (editor concern, carried through)
    pub locked: bool,
    /// Tier may be collapsed into a minimal block by the editor
    pub hideable: bool,
}

/// A tier-definition document: one category key wrapping `_meta` and the
/// per-tier entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierDocument {
    pub category: String,
    /// Category localization (`en`, `ch`, ...)
    pub localization: BTreeMap<String, String>,
    pub tiers: BTreeMap<String, TierEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct TierDocMeta {
    localization: BTreeMap<String, String>,
}

impl TierDocument {
    /// Parse the nested document shape, skipping `"//"` comment keys.
    /// The first non-comment top-level key is the category.
    pub fn from_value(value: Value) -> Result<TierDocument> {
        let root = match value {
            Value::Object(map) => map,
            other => {
                return Err(Error::Config(format!(
                    "tier document must be an object, got {}",
                    type_name(&other)
                )))
            }
        };

        let (category, body) = root
            .into_iter()
            .find(|(key, _)| !key.starts_with("//"))
            .ok_or_else(|| Error::Config("tier document has no category key".to_string()))?;

        let body = match body {
            Value::Object(map) => map,
            other => {
                return Err(Error::Config(format!(
                    "category '{}' must be an object, got {}",
                    category,
                    type_name(&other)
                )))
            }
        };

        let mut localization = BTreeMap::new();
        let mut tiers = BTreeMap::new();
        for (key, entry) in body {
            if key.starts_with("//") {
                continue;
            }
            if key == "_meta" {
                let meta: TierDocMeta = serde_json::from_value(entry)?;
                localization = meta.localization;
            } else {
                let entry: TierEntry = serde_json::from_value(entry)?;
                tiers.insert(key, entry);
            }
        }

        Ok(TierDocument {
            category,
            localization,
            tiers,
        })
    }
}

/// Per-category, per-tier default visual attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeEntry {
    #[serde(rename = "FontSize")]
    pub font_size: Option<u32>,
    #[serde(rename = "TextColor")]
    pub text_color: Option<ColorSpec>,
    #[serde(rename = "BorderColor")]
    pub border_color: Option<ColorSpec>,
    #[serde(rename = "BackgroundColor")]
    pub background_color: Option<ColorSpec>,
    #[serde(rename = "PlayEffect")]
    pub play_effect: Option<String>,
    #[serde(rename = "MinimapIcon")]
    pub minimap_icon: Option<String>,
}

/// The theme document: theme-category → `"Tier N"` → entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeDocument {
    categories: BTreeMap<String, BTreeMap<String, ThemeEntry>>,
}

/// Category every theme lookup falls back to when the requested
/// theme-category is absent.
pub const THEME_FALLBACK_CATEGORY: &str = "Currency";

impl ThemeDocument {
    /// Parse the theme document, skipping `"//"` comment keys at both
    /// levels.
    pub fn from_value(value: Value) -> Result<ThemeDocument> {
        let root = match value {
            Value::Object(map) => map,
            other => {
                return Err(Error::Config(format!(
                    "theme document must be an object, got {}",
                    type_name(&other)
                )))
            }
        };

        let mut categories = BTreeMap::new();
        for (category, body) in root {
            if category.starts_with("//") {
                continue;
            }
            let body = match body {
                Value::Object(map) => map,
                _ => continue,
            };
            let mut tiers = BTreeMap::new();
            for (tier_key, entry) in body {
                if tier_key.starts_with("//") {
                    continue;
                }
                let entry: ThemeEntry = serde_json::from_value(entry)?;
                tiers.insert(tier_key, entry);
            }
            categories.insert(category, tiers);
        }
        Ok(ThemeDocument { categories })
    }

    /// Theme entry for a category/rank pair, following the fallback chain:
    /// requested category → `"Currency"` → empty defaults.
    pub fn entry(&self, theme_category: &str, theme_key: &str) -> ThemeEntry {
        self.categories
            .get(theme_category)
            .or_else(|| self.categories.get(THEME_FALLBACK_CATEGORY))
            .and_then(|tiers| tiers.get(theme_key))
            .cloned()
            .unwrap_or_default()
    }
}

/// One catalog sound: file path (forward slashes) and playback volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundFile {
    pub file: String,
    pub volume: u32,
}

/// The sound catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundCatalog {
    /// Tier-level custom sounds, referenced by `custom_sound_id`
    pub class_sounds: BTreeMap<String, SoundFile>,
    /// Automatic per-item sounds, injected as implicit rules
    pub basetype_sounds: BTreeMap<String, SoundFile>,
}

/// A canonical item record from the (optional) item catalog. Supplied
/// externally and immutable during a run; used only for localized-name
/// fallback in headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemRecord {
    pub name: String,
    pub localized_name: Option<String>,
    pub item_class: Option<String>,
    pub drop_level: Option<u32>,
    pub required_level: Option<u32>,
    pub subtype: Option<String>,
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mapping_document_defaults_optional_fields() {
        let doc: MappingDocument = serde_json::from_value(json!({
            "mapping": {
                "Divine Orb": "Tier 0 General",
                "Chaos Orb": ["Tier 1 General", "Tier 2 General"]
            }
        }))
        .unwrap();
        assert!(doc.rules.is_empty());
        assert!(doc.meta.tier_order.is_empty());
        let chaos = &doc.mapping["Chaos Orb"];
        let labels: Vec<&str> = chaos.labels().collect();
        assert_eq!(labels, vec!["Tier 1 General", "Tier 2 General"]);
    }

    #[test]
    fn rule_fields_deserialize_with_wire_names() {
        let rule: OverrideRule = serde_json::from_value(json!({
            "targets": ["Divine Orb"],
            "applyToTier": false,
            "targetMatchModes": { "Divine Orb": "partial" },
            "overrides": { "TextColor": "#FF0000", "PlayAlertSound": ["drop.mp3", 300] },
            "conditions": { "ItemLevel": ">= 60" }
        }))
        .unwrap();
        assert_eq!(rule.target_match_modes["Divine Orb"], MatchMode::Partial);
        assert_eq!(
            rule.overrides.sound,
            Some(SoundSpec("drop.mp3".to_string(), 300))
        );
        assert!(!rule.disabled);
    }

    #[test]
    fn tier_document_skips_comment_keys() {
        let doc = TierDocument::from_value(json!({
            "//note": "editor scratch",
            "Currency General": {
                "_meta": { "localization": { "en": "General Currency", "ch": "通用通货" } },
                "//draft": { "anything": true },
                "Tier 0 General": { "theme": { "Tier": 0 }, "sound": { "default_sound_id": 6 } },
                "Hide General": { "is_hide_tier": true }
            }
        }))
        .unwrap();
        assert_eq!(doc.category, "Currency General");
        assert_eq!(doc.localization["en"], "General Currency");
        assert_eq!(doc.tiers.len(), 2);
        assert!(doc.tiers["Hide General"].is_hide_tier);
        assert_eq!(doc.tiers["Tier 0 General"].sound.default_sound_id, Some(6));
    }

    #[test]
    fn tier_document_without_category_is_rejected() {
        let err = TierDocument::from_value(json!({ "//only": "comments" })).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn theme_lookup_falls_back_to_currency() {
        let theme = ThemeDocument::from_value(json!({
            "Currency": {
                "Tier 0": { "FontSize": 45, "TextColor": "#FFD700" }
            }
        }))
        .unwrap();
        let hit = theme.entry("Currency", "Tier 0");
        assert_eq!(hit.font_size, Some(45));
        // Unknown theme-category falls back to Currency.
        let fallback = theme.entry("Gems", "Tier 0");
        assert_eq!(fallback.font_size, Some(45));
        // Unknown tier key yields empty defaults.
        let empty = theme.entry("Currency", "Tier 7");
        assert_eq!(empty, ThemeEntry::default());
    }

    #[test]
    fn localized_item_class_resolves_per_language() {
        let class: LocalizedText =
            serde_json::from_value(json!({ "en": "Stackable Currency", "ch": "可堆叠通货" }))
                .unwrap();
        assert_eq!(class.canonical("x"), "Stackable Currency");
        assert_eq!(class.display("ch", "x"), "可堆叠通货");
        assert_eq!(class.display("de", "x"), "Stackable Currency");
    }
}
