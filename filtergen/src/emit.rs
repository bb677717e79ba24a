//! Block rendering
//!
//! Turns a resolved match group into the line-oriented output format. The
//! directive order is fixed and part of the output contract: command,
//! `Class`, `BaseType` (with `==` for exact-mode groups — the operator
//! changes substring-vs-exact semantics at the consuming client), expanded
//! conditions, verbatim raw lines, then styling (omitted for `Hide`
//! blocks).

use filtergen_common::docs::MatchMode;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::style::ResolvedStyle;

const INDENT: &str = "    ";

/// Block command keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Show,
    Hide,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Show => "Show",
            Command::Hide => "Hide",
        }
    }
}

/// One fully resolved output block, ready to render.
#[derive(Debug, Clone)]
pub struct FilterBlock {
    pub index: u32,
    /// Localized descriptive text for the header comment
    pub header: String,
    pub command: Command,
    pub item_class: Option<String>,
    pub basetypes: Vec<String>,
    pub match_mode: MatchMode,
    pub conditions: BTreeMap<String, Value>,
    pub raw: Option<String>,
    pub style: ResolvedStyle,
}

/// Section/block header comment with a zero-padded index.
pub fn header_line(index: u32, text: &str) -> String {
    format!("#==[{:05}]-{}==", index, text)
}

impl FilterBlock {
    /// Render the block, header comment included, terminated by a blank
    /// line.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        lines.push(header_line(self.index, &self.header));
        lines.push(self.command.as_str().to_string());

        if let Some(class) = &self.item_class {
            lines.push(format!("{}Class \"{}\"", INDENT, class));
        }

        let operator = match self.match_mode {
            MatchMode::Exact => " == ",
            MatchMode::Partial => " ",
        };
        lines.push(format!(
            "{}BaseType{}\"{}\"",
            INDENT,
            operator,
            self.basetypes.join("\" \"")
        ));

        for (key, value) in &self.conditions {
            render_condition(&mut lines, key, value);
        }

        if let Some(raw) = &self.raw {
            for line in raw.lines() {
                let line = line.trim();
                if !line.is_empty() {
                    lines.push(format!("{}{}", INDENT, line));
                }
            }
        }

        // Hide blocks carry conditions only; styling would be dead weight
        // for items the client never draws prominently.
        if self.command != Command::Hide {
            let style = &self.style;
            lines.push(format!("{}SetFontSize {}", INDENT, style.font_size));
            lines.push(format!("{}SetTextColor {}", INDENT, style.text_color));
            lines.push(format!("{}SetBorderColor {}", INDENT, style.border_color));
            lines.push(format!(
                "{}SetBackgroundColor {}",
                INDENT, style.background_color
            ));
            if let Some(sound) = &style.sound {
                lines.push(format!("{}{}", INDENT, sound));
            }
            if let Some(effect) = &style.play_effect {
                lines.push(format!("{}PlayEffect {}", INDENT, effect));
            }
            if let Some(icon) = &style.minimap_icon {
                lines.push(format!("{}MinimapIcon {}", INDENT, icon));
            }
        }

        lines.push(String::new());
        lines.join("\n")
    }
}

/// Expand one condition entry into output lines.
///
/// `"RANGE"` values describe a closed interval and expand to two comparison
/// lines: either `RANGE <op> <a> <op> <b>` (four tokens after the keyword)
/// or the shorthand `RANGE <low> <high>`. `Rarity` values have redundant
/// equality tokens stripped; everything else passes through verbatim.
fn render_condition(lines: &mut Vec<String>, key: &str, value: &Value) {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return,
    };

    if let Some(range) = text.strip_prefix("RANGE ") {
        let tokens: Vec<&str> = range.split_whitespace().collect();
        match tokens.as_slice() {
            [op_low, low, op_high, high] => {
                lines.push(format!("{}{} {} {}", INDENT, key, op_low, low));
                lines.push(format!("{}{} {} {}", INDENT, key, op_high, high));
            }
            [low, high] => {
                lines.push(format!("{}{} >= {}", INDENT, key, low));
                lines.push(format!("{}{} <= {}", INDENT, key, high));
            }
            _ => {}
        }
        return;
    }

    if key == "Rarity" {
        let cleaned = text.replace("==", "").replace('=', "");
        lines.push(format!("{}{} {}", INDENT, key, cleaned.trim()));
        return;
    }

    lines.push(format!("{}{} {}", INDENT, key, text));
}
