//! Configuration loading and store root resolution
//!
//! Every path the compiler touches is carried explicitly on
//! [`GeneratorConfig`]; nothing reads module-level constants, so tests can
//! point a config at an isolated fixture store.
//!
//! Store root resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. `FILTERGEN_ROOT` environment variable
//! 3. `filtergen.toml` config file in the working directory
//! 4. Compiled default (`./filter_data`)

use filtergen_common::{Error, Language, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable naming the store root
pub const ROOT_ENV_VAR: &str = "FILTERGEN_ROOT";
/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "filtergen.toml";
/// Compiled default store root
pub const DEFAULT_ROOT: &str = "filter_data";

/// Mapping-document subtree under the store root
pub const MAPPING_DIR: &str = "base_mapping";
/// Tier-definition subtree under the store root (parallel to mappings)
pub const TIER_DIR: &str = "tier_definition";

/// Optional `filtergen.toml` contents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub sidecar: Option<PathBuf>,
    pub language: Option<Language>,
}

impl TomlConfig {
    /// Parse a TOML config file.
    pub fn load(path: &Path) -> Result<TomlConfig> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// All inputs and outputs of one compilation run
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Configuration store root
    pub root: PathBuf,
    /// Mapping-document tree (`<root>/base_mapping`)
    pub mapping_dir: PathBuf,
    /// Tier-definition tree (`<root>/tier_definition`)
    pub tier_dir: PathBuf,
    /// Global theme document (fatal if missing)
    pub theme_path: PathBuf,
    /// Global sound catalog (fatal if missing)
    pub sound_map_path: PathBuf,
    /// Optional item catalog for localized-name fallback
    pub items_path: PathBuf,
    /// Generated filter document
    pub output_path: PathBuf,
    /// Generated style sidecar (JSON)
    pub sidecar_path: PathBuf,
    /// Output language for header text
    pub language: Language,
}

impl GeneratorConfig {
    /// Config with all paths derived from a store root.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        GeneratorConfig {
            mapping_dir: root.join(MAPPING_DIR),
            tier_dir: root.join(TIER_DIR),
            theme_path: root.join("theme.json"),
            sound_map_path: root.join("sound_map.json"),
            items_path: root.join("items.json"),
            output_path: root.join("complete_filter.filter"),
            sidecar_path: root.join("complete_filter.style.json"),
            language: Language::default(),
            root,
        }
    }

    /// Resolve a config from CLI overrides, the environment, and the
    /// default config file location.
    pub fn resolve(
        cli_root: Option<&Path>,
        cli_output: Option<&Path>,
        cli_sidecar: Option<&Path>,
        cli_language: Option<Language>,
    ) -> GeneratorConfig {
        let config_file = Path::new(CONFIG_FILE);
        Self::resolve_with(
            cli_root,
            cli_output,
            cli_sidecar,
            cli_language,
            config_file.exists().then_some(config_file),
        )
    }

    /// Resolution core, with an explicit config file for testability.
    ///
    /// A present-but-unparsable config file degrades to defaults with a
    /// warning rather than aborting the run.
    pub fn resolve_with(
        cli_root: Option<&Path>,
        cli_output: Option<&Path>,
        cli_sidecar: Option<&Path>,
        cli_language: Option<Language>,
        config_file: Option<&Path>,
    ) -> GeneratorConfig {
        let file_cfg = match config_file {
            Some(path) => TomlConfig::load(path).unwrap_or_else(|e| {
                warn!("Ignoring config file: {}", e);
                TomlConfig::default()
            }),
            None => TomlConfig::default(),
        };

        let root = cli_root
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ROOT_ENV_VAR).map(PathBuf::from))
            .or(file_cfg.root_folder)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));

        let mut config = GeneratorConfig::for_root(root);
        if let Some(output) = cli_output.map(Path::to_path_buf).or(file_cfg.output) {
            config.output_path = output;
        }
        if let Some(sidecar) = cli_sidecar.map(Path::to_path_buf).or(file_cfg.sidecar) {
            config.sidecar_path = sidecar;
        }
        if let Some(language) = cli_language.or(file_cfg.language) {
            config.language = language;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_root_derives_store_paths() {
        let config = GeneratorConfig::for_root("/tmp/store");
        assert_eq!(config.mapping_dir, PathBuf::from("/tmp/store/base_mapping"));
        assert_eq!(config.tier_dir, PathBuf::from("/tmp/store/tier_definition"));
        assert_eq!(config.theme_path, PathBuf::from("/tmp/store/theme.json"));
        assert_eq!(
            config.output_path,
            PathBuf::from("/tmp/store/complete_filter.filter")
        );
    }

    #[test]
    fn cli_root_wins_over_config_file() {
        let config = GeneratorConfig::resolve_with(
            Some(Path::new("/cli/root")),
            None,
            None,
            None,
            None,
        );
        assert_eq!(config.root, PathBuf::from("/cli/root"));
        assert_eq!(config.language, Language::En);
    }
}
