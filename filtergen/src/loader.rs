//! Configuration store loading
//!
//! Reads the whole store up front: global theme and sound catalog (fatal if
//! missing), the optional item catalog, and every mapping/tier-definition
//! pair. Failure isolation is per pair: an incomplete pair or an unparsable
//! document is logged and skipped, and the run continues.

use filtergen_common::docs::{
    ItemRecord, MappingDocument, SoundCatalog, ThemeDocument, TierDocument,
};
use filtergen_common::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::GeneratorConfig;

/// One loadable mapping/tier-definition pair, keyed by the relative path
/// shared across the two parallel trees.
#[derive(Debug, Clone)]
pub struct CategoryPair {
    pub rel_path: PathBuf,
    pub mapping: MappingDocument,
    pub tiers: TierDocument,
}

/// Everything one compilation run reads, fully in memory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    pub theme: ThemeDocument,
    pub sounds: SoundCatalog,
    /// Item catalog keyed by canonical name (may be empty)
    pub items: BTreeMap<String, ItemRecord>,
    /// Loaded pairs, sorted by relative path
    pub pairs: Vec<CategoryPair>,
    /// Pairs skipped as incomplete or malformed
    pub skipped: usize,
}

impl DocumentStore {
    /// Load the store rooted at the configured paths.
    ///
    /// Fails only when a global resource (theme or sound catalog) is
    /// missing or unreadable; per-category problems are logged and the
    /// affected pair is skipped.
    pub fn load(config: &GeneratorConfig) -> Result<DocumentStore> {
        let theme_value = read_global(&config.theme_path, "theme document")?;
        let theme = ThemeDocument::from_value(theme_value)?;

        let sounds_value = read_global(&config.sound_map_path, "sound catalog")?;
        let sounds: SoundCatalog = serde_json::from_value(sounds_value)?;

        let items = load_item_catalog(&config.items_path);

        let mut pairs = Vec::new();
        let mut skipped = 0usize;
        for rel_path in discover_documents(&config.mapping_dir) {
            let mapping_path = config.mapping_dir.join(&rel_path);
            let tier_path = config.tier_dir.join(&rel_path);

            if !tier_path.is_file() {
                warn!("{}", Error::MissingPair(rel_path.clone()));
                skipped += 1;
                continue;
            }

            let mapping = match load_mapping(&mapping_path) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("{}", e);
                    skipped += 1;
                    continue;
                }
            };
            let tiers = match load_tiers(&tier_path) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("{}", e);
                    skipped += 1;
                    continue;
                }
            };

            debug!(
                path = %rel_path.display(),
                category = %tiers.category,
                items = mapping.mapping.len(),
                rules = mapping.rules.len(),
                "Loaded category pair"
            );
            pairs.push(CategoryPair {
                rel_path,
                mapping,
                tiers,
            });
        }

        // Tier-definition documents with no mapping partner are incomplete
        // pairs too; they produce no output but deserve the same warning.
        for rel_path in discover_documents(&config.tier_dir) {
            if !config.mapping_dir.join(&rel_path).is_file() {
                warn!("{}", Error::MissingPair(rel_path));
                skipped += 1;
            }
        }

        pairs.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        Ok(DocumentStore {
            theme,
            sounds,
            items,
            pairs,
            skipped,
        })
    }
}

/// Read a required global resource; absence is fatal.
fn read_global(path: &Path, what: &str) -> Result<Value> {
    if !path.is_file() {
        return Err(Error::MissingResource(format!(
            "{} not found at {}",
            what,
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load the optional item catalog; a missing or malformed catalog degrades
/// to an empty one with a warning.
fn load_item_catalog(path: &Path) -> BTreeMap<String, ItemRecord> {
    if !path.is_file() {
        return BTreeMap::new();
    }
    let records: Vec<ItemRecord> = match std::fs::read_to_string(path)
        .map_err(Error::from)
        .and_then(|content| serde_json::from_str(&content).map_err(Error::from))
    {
        Ok(records) => records,
        Err(e) => {
            warn!("Ignoring item catalog {}: {}", path.display(), e);
            return BTreeMap::new();
        }
    };
    records
        .into_iter()
        .map(|record| (record.name.clone(), record))
        .collect()
}

/// Relative paths of all `.json` documents under a tree, sorted.
fn discover_documents(dir: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Error accessing entry under {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(dir) {
            paths.push(rel.to_path_buf());
        }
    }
    paths.sort();
    paths
}

fn load_mapping(path: &Path) -> Result<MappingDocument> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| Error::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn load_tiers(path: &Path) -> Result<TierDocument> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content).map_err(|e| Error::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    TierDocument::from_value(value).map_err(|e| Error::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
