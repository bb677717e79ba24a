//! Output localization
//!
//! The generated document carries bilingual header text. Item and category
//! names come from the documents themselves; only the handful of fixed
//! labels (match-mode names, the base-block marker, the custom-rules
//! anchor) and the top-level folder names are built in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output language for generated header text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ch,
}

impl Language {
    /// Key used to select per-language tables inside documents
    pub fn key(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ch => "ch",
        }
    }

    /// Fixed label for an exact-match block
    pub fn exact(&self) -> &'static str {
        match self {
            Language::En => "Exact",
            Language::Ch => "精确",
        }
    }

    /// Fixed label for a partial-match block
    pub fn partial(&self) -> &'static str {
        match self {
            Language::En => "Partial",
            Language::Ch => "模糊",
        }
    }

    /// Fixed label for the base (unruled remainder) block
    pub fn base(&self) -> &'static str {
        match self {
            Language::En => "Base",
            Language::Ch => "基础",
        }
    }

    /// Fixed label prefix for a user rule block
    pub fn rule(&self) -> &'static str {
        match self {
            Language::En => "Rule",
            Language::Ch => "规则",
        }
    }

    /// Fixed label for an auto-injected sound block
    pub fn auto_sound(&self) -> &'static str {
        match self {
            Language::En => "Auto-Sound",
            Language::Ch => "自动音效",
        }
    }

    /// Title of the `[00000]` custom-rules anchor
    pub fn custom_rules(&self) -> &'static str {
        match self {
            Language::En => "Custom Rules",
            Language::Ch => "自定义规则",
        }
    }

    /// Explanatory comment under the custom-rules anchor
    pub fn custom_rules_note(&self) -> &'static str {
        match self {
            Language::En => "Add custom rules here to override all filter settings.",
            Language::Ch => "在此添加自定义规则将会覆盖所有过滤器设定.",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ch" | "zh" => Ok(Language::Ch),
            other => Err(format!("unknown language: {}", other)),
        }
    }
}

/// Built-in localization for top-level folder names
const FOLDER_NAMES: &[(&str, &str)] = &[
    ("Currency", "通货"),
    ("Equipment", "装备"),
    ("Divination Cards", "命运卡"),
    ("Gems", "宝石"),
    ("Maps", "地图"),
    ("Misc", "杂项"),
    ("Special", "特殊"),
    ("Weapons", "武器"),
    ("Armour", "防具"),
    ("Jewellery", "首饰"),
    ("Flasks", "药剂"),
    ("Quest", "任务"),
    ("Uniques", "传奇"),
];

/// Localized display text for a top-level folder.
///
/// Chinese output keeps the English name alongside the translation
/// (`"通货 Currency"`); unknown folders pass through unchanged.
pub fn folder_display(folder: &str, language: Language) -> String {
    match language {
        Language::En => folder.to_string(),
        Language::Ch => FOLDER_NAMES
            .iter()
            .find(|(en, _)| *en == folder)
            .map(|(en, ch)| format!("{} {}", ch, en))
            .unwrap_or_else(|| folder.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language_aliases() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert_eq!("CH".parse::<Language>().unwrap(), Language::Ch);
        assert_eq!("zh".parse::<Language>().unwrap(), Language::Ch);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn folder_display_is_bilingual_for_chinese() {
        assert_eq!(folder_display("Currency", Language::Ch), "通货 Currency");
        assert_eq!(folder_display("Currency", Language::En), "Currency");
        assert_eq!(folder_display("NewFolder", Language::Ch), "NewFolder");
    }
}
