//! End-to-end generation tests
//!
//! Each test builds an isolated configuration store in a temp directory,
//! runs a full compilation over it, and asserts on the produced document
//! and sidecar text.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tempfile::TempDir;

use filtergen::{DocumentAssembler, DocumentStore, FilterOutput, GeneratorConfig};

/// Builder for an on-disk configuration store fixture.
struct FixtureStore {
    dir: TempDir,
}

impl FixtureStore {
    fn new() -> FixtureStore {
        let store = FixtureStore {
            dir: TempDir::new().unwrap(),
        };
        store.write_json("theme.json", json!({}));
        store.write_json(
            "sound_map.json",
            json!({ "class_sounds": {}, "basetype_sounds": {} }),
        );
        store
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn write_json(&self, rel: &str, value: Value) -> &Self {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
        self
    }

    fn mapping(&self, rel: &str, value: Value) -> &Self {
        self.write_json(&format!("base_mapping/{}", rel), value)
    }

    fn tiers(&self, rel: &str, value: Value) -> &Self {
        self.write_json(&format!("tier_definition/{}", rel), value)
    }

    fn compile(&self) -> FilterOutput {
        let config = GeneratorConfig::for_root(self.root());
        let store = DocumentStore::load(&config).unwrap();
        DocumentAssembler::new(&config).assemble(&store)
    }
}

/// Simple one-category store: two currency items in Tier 1, one rule
/// painting item "A" red.
fn red_rule_store() -> FixtureStore {
    let store = FixtureStore::new();
    store.mapping(
        "Currency/General.json",
        json!({
            "_meta": { "item_class": "Stackable Currency" },
            "mapping": { "A": "Tier 1 General", "B": "Tier 1 General" },
            "rules": [
                { "targets": ["A"], "overrides": { "TextColor": "#FF0000" } }
            ]
        }),
    );
    store.tiers(
        "Currency/General.json",
        json!({
            "Currency General": {
                "Tier 1 General": { "theme": { "Tier": 1 } }
            }
        }),
    );
    store
}

/// Blocks of the document: (header index, lines) per `#==[NNNNN]-` header.
fn blocks(text: &str) -> Vec<(u32, Vec<&str>)> {
    let mut out: Vec<(u32, Vec<&str>)> = Vec::new();
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("#==[") {
            let index: u32 = rest[..5].parse().unwrap();
            out.push((index, vec![line]));
        } else if let Some((_, lines)) = out.last_mut() {
            lines.push(line);
        }
    }
    out
}

#[test]
fn rule_and_base_blocks_get_consecutive_indices() {
    let output = red_rule_store().compile();
    let blocks = blocks(&output.text);

    // [00000] custom-rules anchor, [11000] category header, then the two
    // item blocks.
    let indices: Vec<u32> = blocks.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![0, 11_000, 11_001, 11_002]);

    let (_, rule_block) = &blocks[2];
    assert!(rule_block.iter().any(|l| l.trim() == "BaseType == \"A\""));
    assert!(rule_block
        .iter()
        .any(|l| l.trim() == "SetTextColor 255 0 0 255"));

    let (_, base_block) = &blocks[3];
    assert!(base_block.iter().any(|l| l.trim() == "BaseType == \"B\""));
    // Base styling falls back to global defaults.
    assert!(base_block
        .iter()
        .any(|l| l.trim() == "SetTextColor 255 255 255 255"));
}

#[test]
fn output_is_byte_identical_across_runs() {
    let store = red_rule_store();
    let first = store.compile();
    let second = store.compile();
    assert_eq!(first.text, second.text);
    assert_eq!(first.sidecar, second.sidecar);
}

#[test]
fn every_tier_item_appears_in_exactly_one_block() {
    let store = FixtureStore::new();
    store.mapping(
        "Currency/General.json",
        json!({
            "mapping": {
                "A": "Tier 1 G",
                "B": "Tier 1 G",
                "C": ["Tier 1 G", "Tier 2 G"],
                "D": "Tier 2 G"
            },
            "rules": [
                { "targets": ["A", "C"] },
                { "targets": ["C", "D"] }
            ]
        }),
    );
    store.tiers(
        "Currency/General.json",
        json!({
            "Currency General": {
                "Tier 1 G": {},
                "Tier 2 G": {}
            }
        }),
    );
    let output = store.compile();

    // Per tier: each item occurs on exactly one BaseType line. "C" belongs
    // to both tiers and must appear once per tier.
    let mut occurrences = std::collections::BTreeMap::new();
    for line in output.text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("BaseType") {
            for name in rest.split('"').filter(|s| !s.trim().is_empty() && *s != " == ") {
                *occurrences.entry(name.to_string()).or_insert(0u32) += 1;
            }
        }
    }
    assert_eq!(occurrences.get("A"), Some(&1));
    assert_eq!(occurrences.get("B"), Some(&1));
    assert_eq!(occurrences.get("C"), Some(&2));
    assert_eq!(occurrences.get("D"), Some(&1));
}

#[test]
fn tiers_emit_in_rank_order_with_hide_last() {
    let store = FixtureStore::new();
    store.mapping(
        "Currency/General.json",
        json!({
            "mapping": {
                "H": "Hide G",
                "Two": "Tier 2 G",
                "Zero": "Tier 0 G"
            }
        }),
    );
    store.tiers(
        "Currency/General.json",
        json!({
            "Currency General": {
                "Hide G": { "is_hide_tier": true },
                "Tier 2 G": {},
                "Tier 0 G": {}
            }
        }),
    );
    let text = store.compile().text;
    let zero = text.find("\"Zero\"").unwrap();
    let two = text.find("\"Two\"").unwrap();
    let hide = text.find("\"H\"").unwrap();
    assert!(zero < two && two < hide);
}

#[test]
fn hide_tier_blocks_use_hide_and_omit_styling() {
    let store = FixtureStore::new();
    store.mapping(
        "Currency/General.json",
        json!({ "mapping": { "Scroll": "Hide G" } }),
    );
    store.tiers(
        "Currency/General.json",
        json!({
            "Currency General": {
                "Hide G": { "is_hide_tier": true }
            }
        }),
    );
    let output = store.compile();
    let blocks = blocks(&output.text);
    let (_, hide_block) = blocks.last().unwrap();
    assert_eq!(hide_block[1], "Hide");
    assert!(hide_block.iter().any(|l| l.trim() == "BaseType == \"Scroll\""));
    assert!(!hide_block.iter().any(|l| l.contains("SetFontSize")));
    assert!(!hide_block.iter().any(|l| l.contains("SetTextColor")));
}

#[test]
fn partial_match_modes_split_the_base_block() {
    let store = FixtureStore::new();
    store.mapping(
        "Currency/General.json",
        json!({
            "_meta": { "match_modes": { "Splinter": "partial" } },
            "mapping": { "Splinter": "Tier 1 G", "Divine Orb": "Tier 1 G" }
        }),
    );
    store.tiers(
        "Currency/General.json",
        json!({ "Currency General": { "Tier 1 G": {} } }),
    );
    let text = store.compile().text;
    assert!(text.contains("BaseType == \"Divine Orb\""));
    assert!(text.contains("BaseType \"Splinter\""));
    assert!(!text.contains("BaseType == \"Splinter\""));
}

#[test]
fn apply_to_tier_rule_replaces_the_base_block() {
    let store = FixtureStore::new();
    store.mapping(
        "Currency/General.json",
        json!({
            "mapping": { "A": "Tier 1 G", "B": "Tier 1 G" },
            "rules": [ {
                "applyToTier": true,
                "overrides": { "Tier": "Tier 1 G", "FontSize": 45 }
            } ]
        }),
    );
    store.tiers(
        "Currency/General.json",
        json!({ "Currency General": { "Tier 1 G": {} } }),
    );
    let output = store.compile();
    assert_eq!(output.block_count, 1);
    assert!(output.text.contains("BaseType == \"A\" \"B\""));
    assert!(output.text.contains("SetFontSize 45"));
}

#[test]
fn theme_styles_flow_into_blocks_and_sidecar() {
    let store = FixtureStore::new();
    store.write_json(
        "theme.json",
        json!({
            "Currency": {
                "Tier 1": {
                    "FontSize": 44,
                    "TextColor": "#FFD700",
                    "BorderColor": -1,
                    "PlayEffect": "Yellow"
                }
            }
        }),
    );
    store.mapping(
        "Currency/General.json",
        json!({
            "_meta": { "theme_category": "Currency" },
            "mapping": { "Divine Orb": "Tier 1 G" }
        }),
    );
    store.tiers(
        "Currency/General.json",
        json!({ "Currency General": { "Tier 1 G": { "theme": { "Tier": 1 } } } }),
    );
    let output = store.compile();
    assert!(output.text.contains("SetFontSize 44"));
    assert!(output.text.contains("SetTextColor 255 215 0 255"));
    // Disabled sentinel falls through to the default border.
    assert!(output.text.contains("SetBorderColor 255 255 255 255"));
    assert!(output.text.contains("PlayEffect Yellow"));

    let entry = &output.sidecar["Divine Orb"];
    assert_eq!(entry.font_size, 44);
    assert_eq!(entry.text_color, "255 215 0 255");
    assert_eq!(entry.index, 11_001);
}

#[test]
fn auto_sound_items_get_their_own_block() {
    let store = FixtureStore::new();
    store.write_json(
        "sound_map.json",
        json!({
            "class_sounds": {},
            "basetype_sounds": {
                "Divine Orb": { "file": "drops/divine.mp3", "volume": 290 }
            }
        }),
    );
    store.mapping(
        "Currency/General.json",
        json!({ "mapping": { "Divine Orb": "Tier 1 G", "Chaos Orb": "Tier 1 G" } }),
    );
    store.tiers(
        "Currency/General.json",
        json!({ "Currency General": { "Tier 1 G": {} } }),
    );
    let output = store.compile();
    assert!(output
        .text
        .contains("CustomAlertSound \"sound_files\\drops\\divine.mp3\" 290"));
    assert!(output.text.contains("Auto-Sound: Divine Orb"));
    // The auto-sound block carries only its item; the rest stays in base.
    assert!(output.text.contains("BaseType == \"Divine Orb\""));
    assert!(output.text.contains("BaseType == \"Chaos Orb\""));
}

#[test]
fn tier_default_sound_id_renders_builtin_alert() {
    let store = FixtureStore::new();
    store.mapping(
        "Currency/General.json",
        json!({ "mapping": { "A": "Tier 0 G" } }),
    );
    store.tiers(
        "Currency/General.json",
        json!({
            "Currency General": {
                "Tier 0 G": { "sound": { "default_sound_id": 6 } }
            }
        }),
    );
    let output = store.compile();
    assert!(output.text.contains("PlayAlertSound 6 300"));
    assert_eq!(
        output.sidecar["A"].sound.as_deref(),
        Some("PlayAlertSound 6 300")
    );
}

#[test]
fn rule_conditions_and_raw_lines_render() {
    let store = FixtureStore::new();
    store.mapping(
        "Currency/General.json",
        json!({
            "mapping": { "A": "Tier 1 G" },
            "rules": [ {
                "targets": ["A"],
                "conditions": { "ItemLevel": "RANGE >= 60 <= 74", "Rarity": "== Unique" },
                "raw": "StackSize >= 5"
            } ]
        }),
    );
    store.tiers(
        "Currency/General.json",
        json!({ "Currency General": { "Tier 1 G": {} } }),
    );
    let text = store.compile().text;
    assert!(text.contains("    ItemLevel >= 60"));
    assert!(text.contains("    ItemLevel <= 74"));
    assert!(text.contains("    Rarity Unique"));
    assert!(text.contains("    StackSize >= 5"));
}

#[test]
fn document_starts_with_overview_and_custom_rules_anchor() {
    let output = red_rule_store().compile();
    let lines: Vec<&str> = output.text.lines().collect();
    assert_eq!(lines[1], "#  FILTER OVERVIEW");
    assert!(lines.iter().any(|l| l.starts_with("#  [00000] Custom Rules")));
    assert!(lines.iter().any(|l| l.starts_with("#  [10000] Currency")));
    assert!(lines.iter().any(|l| l.starts_with("#    [11000]")));
    assert!(output.text.contains("#==[00000]-Custom Rules=="));
}

#[test]
fn categories_group_under_top_level_folder_sections() {
    let store = FixtureStore::new();
    store.mapping(
        "Currency/General.json",
        json!({ "mapping": { "A": "Tier 1 G" } }),
    );
    store.mapping(
        "Currency/Shards.json",
        json!({ "mapping": { "B": "Tier 1 G" } }),
    );
    store.mapping("Gems/Skill.json", json!({ "mapping": { "C": "Tier 1 G" } }));
    for rel in ["Currency/General.json", "Currency/Shards.json", "Gems/Skill.json"] {
        store.tiers(rel, json!({ "Some Category": { "Tier 1 G": {} } }));
    }
    let output = store.compile();
    assert_eq!(output.categories, 3);
    let currency = output.text.find("# [[10000]] Currency").unwrap();
    let gems = output.text.find("# [[20000]] Gems").unwrap();
    assert!(currency < gems);
    // Two sub-sections under Currency, one under Gems.
    assert!(output.text.contains("#==[11000]-"));
    assert!(output.text.contains("#==[12000]-"));
    assert!(output.text.contains("#==[21000]-"));
}

#[test]
fn mapping_without_tier_partner_is_skipped() {
    let store = red_rule_store();
    store.mapping(
        "Currency/Orphan.json",
        json!({ "mapping": { "Lonely": "Tier 1 G" } }),
    );
    let output = store.compile();
    assert_eq!(output.categories, 1);
    assert!(!output.text.contains("Lonely"));
}

#[test]
fn malformed_mapping_is_skipped_and_run_continues() {
    let store = red_rule_store();
    fs::create_dir_all(store.root().join("base_mapping/Currency")).unwrap();
    fs::write(
        store.root().join("base_mapping/Currency/Broken.json"),
        "{ not json",
    )
    .unwrap();
    store.tiers(
        "Currency/Broken.json",
        json!({ "Broken": { "Tier 1 G": {} } }),
    );

    let config = GeneratorConfig::for_root(store.root());
    let loaded = DocumentStore::load(&config).unwrap();
    assert_eq!(loaded.pairs.len(), 1);
    assert_eq!(loaded.skipped, 1);
}

#[test]
fn missing_theme_document_is_fatal() {
    let store = FixtureStore::new();
    fs::remove_file(store.root().join("theme.json")).unwrap();
    let config = GeneratorConfig::for_root(store.root());
    let err = DocumentStore::load(&config).unwrap_err();
    assert!(matches!(
        err,
        filtergen_common::Error::MissingResource(_)
    ));
}

#[test]
fn chinese_output_localizes_headers() {
    let store = FixtureStore::new();
    store.mapping(
        "Currency/General.json",
        json!({
            "_meta": {
                "localization": {
                    "ch": { "__class_name__": "通用", "Divine Orb": "神圣石" }
                }
            },
            "mapping": { "Divine Orb": "Tier 1 G" }
        }),
    );
    store.tiers(
        "Currency/General.json",
        json!({
            "Currency General": {
                "_meta": { "localization": { "en": "General" } },
                "Tier 1 G": {}
            }
        }),
    );
    let mut config = GeneratorConfig::for_root(store.root());
    config.language = "ch".parse().unwrap();
    let loaded = DocumentStore::load(&config).unwrap();
    let output = DocumentAssembler::new(&config).assemble(&loaded);

    assert!(output.text.contains("自定义规则"));
    assert!(output.text.contains("通货 Currency"));
    assert!(output.text.contains("通用 General"));
    // Emitted conditions stay canonical regardless of language.
    assert!(output.text.contains("BaseType == \"Divine Orb\""));
}

#[test]
fn write_produces_document_and_sidecar_files() {
    let store = red_rule_store();
    let out_dir = TempDir::new().unwrap();
    let mut config = GeneratorConfig::for_root(store.root());
    config.output_path = out_dir.path().join("out/complete_filter.filter");
    config.sidecar_path = out_dir.path().join("out/complete_filter.style.json");

    let loaded = DocumentStore::load(&config).unwrap();
    let output = DocumentAssembler::new(&config).assemble(&loaded);
    output.write(&config).unwrap();

    let text = fs::read_to_string(&config.output_path).unwrap();
    assert_eq!(text, output.text);

    let sidecar: Value =
        serde_json::from_str(&fs::read_to_string(&config.sidecar_path).unwrap()).unwrap();
    assert_eq!(sidecar["A"]["textColor"], "255 0 0 255");
    assert_eq!(sidecar["A"]["index"], 11_001);
    assert!(sidecar["A"].get("sound").is_none());
}
