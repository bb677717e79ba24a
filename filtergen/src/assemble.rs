//! Document assembly
//!
//! Walks all loaded pairs in stable path order, drives rule and style
//! resolution per category/tier, and accumulates the final document: an
//! overview table of contents, the concatenated blocks, and the
//! index-and-style sidecar consumed by the external previewer.
//!
//! Section indexing reserves ranges for readability (major section =
//! position × 10000, sub section = +position × 1000) but allocation is a
//! monotonic counter clamped to those anchors, so indices stay unique and
//! strictly increasing even when a section overflows its reserved span.

use filtergen_common::docs::{ItemRecord, LocaleTable, MatchMode};
use filtergen_common::locale::folder_display;
use filtergen_common::{Language, Result, TierRank};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::config::GeneratorConfig;
use crate::emit::{header_line, Command, FilterBlock};
use crate::index::TierIndex;
use crate::loader::{CategoryPair, DocumentStore};
use crate::rules::{self, BlockSource, MatchGroup};
use crate::style::{self, ResolvedStyle};

const OVERVIEW_BAR: &str = "#========================================";
const MAJOR_BAR: &str = "#===================================================================================================================";

/// Monotonic header-index allocator with reserved section anchors.
#[derive(Debug, Default)]
pub struct BlockIndexer {
    next: u32,
    majors: u32,
    subs: u32,
}

impl BlockIndexer {
    /// Anchor for the next major (top-level folder) section.
    pub fn begin_major(&mut self) -> u32 {
        self.majors += 1;
        self.subs = 0;
        let anchor = (self.majors * 10_000).max(self.next + 1);
        self.next = anchor;
        anchor
    }

    /// Anchor for the next sub (category) section within the current major.
    pub fn begin_sub(&mut self) -> u32 {
        self.subs += 1;
        let anchor = (self.majors * 10_000 + self.subs * 1_000).max(self.next + 1);
        self.next = anchor;
        anchor
    }

    /// Index for the next emitted block.
    pub fn next_block(&mut self) -> u32 {
        self.next += 1;
        self.next
    }
}

/// Sidecar entry: the resolved style of one emitted basetype, keyed by the
/// block that carries it. An item emitted under several tiers keeps the
/// last block's entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidecarEntry {
    pub index: u32,
    pub font_size: u32,
    pub text_color: String,
    pub border_color: String,
    pub background_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
}

impl SidecarEntry {
    fn new(index: u32, style: &ResolvedStyle) -> SidecarEntry {
        SidecarEntry {
            index,
            font_size: style.font_size,
            text_color: style.text_color.clone(),
            border_color: style.border_color.clone(),
            background_color: style.background_color.clone(),
            sound: style.sound.as_ref().map(|s| s.to_string()),
        }
    }
}

/// The complete output of one compilation run.
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// The generated filter document
    pub text: String,
    /// Basetype → resolved style, for the previewer
    pub sidecar: BTreeMap<String, SidecarEntry>,
    pub block_count: usize,
    pub categories: usize,
}

impl FilterOutput {
    /// Write the filter document and the sidecar, each once, in full.
    pub fn write(&self, config: &GeneratorConfig) -> Result<()> {
        if let Some(parent) = config.output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config.output_path, &self.text)?;

        if let Some(parent) = config.sidecar_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut json = serde_json::to_string_pretty(&self.sidecar)?;
        json.push('\n');
        std::fs::write(&config.sidecar_path, json)?;
        Ok(())
    }
}

/// Drives one full compilation over a loaded store.
pub struct DocumentAssembler<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        DocumentAssembler { config }
    }

    /// Compile every loaded pair into the final document.
    pub fn assemble(&self, store: &DocumentStore) -> FilterOutput {
        let language = self.config.language;

        let mut overview = vec![
            OVERVIEW_BAR.to_string(),
            "#  FILTER OVERVIEW".to_string(),
            OVERVIEW_BAR.to_string(),
            format!("#  [00000] {}", language.custom_rules()),
        ];
        let mut body = vec![
            header_line(0, language.custom_rules()),
            format!("# {}", language.custom_rules_note()),
            String::new(),
        ];

        let mut indexer = BlockIndexer::default();
        let mut sidecar: BTreeMap<String, SidecarEntry> = BTreeMap::new();
        let mut block_count = 0usize;
        let mut current_major: Option<String> = None;

        for pair in &store.pairs {
            let folder = top_folder(&pair.rel_path);
            if current_major.as_deref() != Some(folder.as_str()) {
                let anchor = indexer.begin_major();
                let display = folder_display(&folder, language);
                body.push(String::new());
                body.push(MAJOR_BAR.to_string());
                body.push(format!("# [[{:05}]] {}", anchor, display));
                body.push(MAJOR_BAR.to_string());
                overview.push(format!("#  [{:05}] {}", anchor, display));
                current_major = Some(folder);
            }

            let ctx = CategoryContext::new(pair, store, language);
            let sub_anchor = indexer.begin_sub();
            let crumb = ctx.breadcrumbs(&pair.rel_path, language);
            overview.push(format!("#    [{:05}] {}", sub_anchor, crumb));
            body.push(String::new());
            body.push(header_line(sub_anchor, &crumb));

            rules::check_dangling_tier_refs(&pair.mapping, &pair.tiers);
            let index = TierIndex::build(&pair.mapping, &pair.tiers);

            for tier_label in &index.tier_order {
                let tier_entry = &pair.tiers.tiers[tier_label];
                let rank = TierRank::parse(tier_label);
                let theme_entry = store.theme.entry(&ctx.theme_category, &rank.theme_key());
                let tier_items = &index.items_by_tier[tier_label];

                let groups =
                    rules::resolve_tier(tier_label, tier_items, &pair.mapping, &store.sounds);
                for group in groups {
                    let resolved =
                        style::resolve(&group.overrides, &theme_entry, tier_entry, &store.sounds);
                    let idx = indexer.next_block();
                    let header = ctx.block_header(rank.display(), &group, language);
                    let command = if tier_entry.is_hide_tier {
                        Command::Hide
                    } else {
                        Command::Show
                    };
                    let block = FilterBlock {
                        index: idx,
                        header,
                        command,
                        item_class: Some(ctx.item_class.clone()),
                        basetypes: group.items,
                        match_mode: group.mode,
                        conditions: group.conditions,
                        raw: group.raw,
                        style: resolved,
                    };
                    for basetype in &block.basetypes {
                        sidecar.insert(basetype.clone(), SidecarEntry::new(idx, &block.style));
                    }
                    body.push(block.render());
                    block_count += 1;
                }
            }
        }

        overview.push(OVERVIEW_BAR.to_string());
        info!(
            categories = store.pairs.len(),
            skipped = store.skipped,
            blocks = block_count,
            "Assembly complete"
        );

        let mut text = overview.join("\n");
        text.push('\n');
        text.push_str(&body.join("\n"));
        text.push('\n');
        FilterOutput {
            text,
            sidecar,
            block_count,
            categories: store.pairs.len(),
        }
    }
}

/// Per-category localization and metadata context.
struct CategoryContext<'a> {
    /// Canonical item class for emitted `Class` conditions
    item_class: String,
    /// Localized item class for headers
    class_header: String,
    /// Localized category name
    loc_cat: String,
    /// Canonical (English) category name
    loc_en: String,
    theme_category: String,
    locale: Option<&'a LocaleTable>,
    item_catalog: &'a BTreeMap<String, ItemRecord>,
}

impl<'a> CategoryContext<'a> {
    fn new(pair: &'a CategoryPair, store: &'a DocumentStore, language: Language) -> Self {
        let category = &pair.tiers.category;
        let meta = &pair.mapping.meta;

        let loc_en = pair
            .tiers
            .localization
            .get("en")
            .cloned()
            .unwrap_or_else(|| category.clone());
        let locale = meta.localization.get(language.key());
        let loc_cat = locale
            .and_then(LocaleTable::class_name)
            .map(str::to_string)
            .or_else(|| pair.tiers.localization.get(language.key()).cloned())
            .unwrap_or_else(|| loc_en.clone());

        let item_class = meta
            .item_class
            .as_ref()
            .map(|c| c.canonical(category).to_string())
            .unwrap_or_else(|| category.clone());
        let class_header = meta
            .item_class
            .as_ref()
            .map(|c| c.display(language.key(), category).to_string())
            .unwrap_or_else(|| item_class.clone());

        let theme_category = meta
            .theme_category
            .clone()
            .unwrap_or_else(|| category.clone());

        CategoryContext {
            item_class,
            class_header,
            loc_cat,
            loc_en,
            theme_category,
            locale,
            item_catalog: &store.items,
        }
    }

    /// Localized display name for an item: mapping locale table first, then
    /// the item catalog, then the canonical name.
    fn item_display(&self, item: &str, language: Language) -> String {
        if let Some(name) = self.locale.and_then(|l| l.item(item)) {
            return name.to_string();
        }
        if language != Language::En {
            if let Some(name) = self
                .item_catalog
                .get(item)
                .and_then(|r| r.localized_name.as_deref())
            {
                return name.to_string();
            }
        }
        item.to_string()
    }

    /// Header text for one block.
    fn block_header(&self, rank: u8, group: &MatchGroup, language: Language) -> String {
        let rule_part = match &group.source {
            BlockSource::Rule { number } => format!(
                "#{} {}",
                number,
                group.comment.as_deref().unwrap_or(language.rule())
            ),
            BlockSource::AutoSound { item } => {
                let display = self.item_display(item, language);
                match language {
                    Language::En => format!("{}: {}", language.auto_sound(), display),
                    Language::Ch => format!("{}：{}", language.auto_sound(), display),
                }
            }
            BlockSource::Base => language.base().to_string(),
        };
        let mode_label = match group.mode {
            MatchMode::Exact => language.exact(),
            MatchMode::Partial => language.partial(),
        };
        format!(
            " {} -Tier {} {} - {} - {}",
            self.class_header, rank, self.loc_cat, rule_part, mode_label
        )
    }

    /// `folder - subfolder - category` breadcrumb for section headers.
    fn breadcrumbs(&self, rel_path: &Path, language: Language) -> String {
        let mut crumbs: Vec<String> = Vec::new();
        let components: Vec<&str> = rel_path
            .iter()
            .filter_map(|c| c.to_str())
            .collect();
        for component in components.iter().take(components.len().saturating_sub(1)) {
            crumbs.push(folder_display(component, language));
        }
        if self.loc_cat != self.loc_en {
            crumbs.push(format!("{} {}", self.loc_cat, self.loc_en));
        } else {
            crumbs.push(self.loc_en.clone());
        }
        crumbs.join(" - ")
    }
}

/// Grouping key for major sections: the first path component, or the file
/// stem for documents sitting at the tree root.
fn top_folder(rel_path: &Path) -> String {
    let components: Vec<&std::ffi::OsStr> = rel_path.iter().collect();
    if components.len() > 1 {
        components[0].to_string_lossy().into_owned()
    } else {
        rel_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
