//! Layered style resolution
//!
//! Pure functions from (rule overrides, tier theme, tier entry, sound
//! catalog) to the effective block styling. Precedence per attribute:
//! explicit rule override (unless a disabled sentinel) → tier theme entry →
//! global default. Sound precedence: per-rule override → catalog-derived
//! custom sound → tier numeric default sound id → none.

use filtergen_common::color::{resolve_color, DEFAULT_BLACK, DEFAULT_WHITE};
use filtergen_common::docs::{SoundCatalog, SoundSpec, StyleOverrides, ThemeEntry, TierEntry};
use std::fmt;

/// Font size used when neither rule nor theme specify one
pub const DEFAULT_FONT_SIZE: u32 = 32;
/// Playback volume for tier default sounds
pub const DEFAULT_SOUND_VOLUME: u32 = 300;

/// Prefix marking a rule sound override as a built-in client sound
const BUILTIN_SOUND_PREFIX: &str = "Default/AlertSound";

/// A resolved sound directive, rendered verbatim into the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundDirective {
    /// Built-in client alert sound (`PlayAlertSound <id> <volume>`)
    BuiltIn { id: u32, volume: u32 },
    /// Sound file shipped beside the filter
    /// (`CustomAlertSound "sound_files\..." <volume>`)
    Custom { path: String, volume: u32 },
}

impl fmt::Display for SoundDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundDirective::BuiltIn { id, volume } => {
                write!(f, "PlayAlertSound {} {}", id, volume)
            }
            SoundDirective::Custom { path, volume } => {
                write!(f, "CustomAlertSound \"{}\" {}", path, volume)
            }
        }
    }
}

/// Effective styling for one block, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub font_size: u32,
    /// `"R G B A"` strings, normalized
    pub text_color: String,
    pub border_color: String,
    pub background_color: String,
    pub play_effect: Option<String>,
    pub minimap_icon: Option<String>,
    pub sound: Option<SoundDirective>,
}

/// Compute the effective style for a match group.
pub fn resolve(
    overrides: &StyleOverrides,
    theme: &ThemeEntry,
    tier: &TierEntry,
    catalog: &SoundCatalog,
) -> ResolvedStyle {
    let base_text = resolve_color(theme.text_color.as_ref(), DEFAULT_WHITE);
    let base_border = resolve_color(theme.border_color.as_ref(), DEFAULT_WHITE);
    let base_background = resolve_color(theme.background_color.as_ref(), DEFAULT_BLACK);

    ResolvedStyle {
        font_size: overrides
            .font_size
            .or(theme.font_size)
            .unwrap_or(DEFAULT_FONT_SIZE),
        text_color: resolve_color(overrides.text_color.as_ref(), &base_text),
        border_color: resolve_color(overrides.border_color.as_ref(), &base_border),
        background_color: resolve_color(overrides.background_color.as_ref(), &base_background),
        play_effect: overrides
            .play_effect
            .clone()
            .or_else(|| theme.play_effect.clone()),
        minimap_icon: overrides
            .minimap_icon
            .clone()
            .or_else(|| theme.minimap_icon.clone()),
        sound: resolve_sound(tier, catalog, overrides.sound.as_ref()),
    }
}

/// Resolve the sound layer chain.
pub fn resolve_sound(
    tier: &TierEntry,
    catalog: &SoundCatalog,
    override_sound: Option<&SoundSpec>,
) -> Option<SoundDirective> {
    if let Some(SoundSpec(file, volume)) = override_sound {
        if file.starts_with(BUILTIN_SOUND_PREFIX) {
            let id = leading_number(&file[BUILTIN_SOUND_PREFIX.len()..]).unwrap_or(1);
            return Some(SoundDirective::BuiltIn {
                id,
                volume: *volume,
            });
        }
        return Some(SoundDirective::Custom {
            path: sound_file_path(file),
            volume: *volume,
        });
    }

    if let Some(id) = tier.sound.custom_sound_id.as_deref() {
        if let Some(sound) = catalog.class_sounds.get(id) {
            return Some(SoundDirective::Custom {
                path: sound_file_path(&sound.file),
                volume: sound.volume,
            });
        }
    }

    match tier.sound.default_sound_id {
        Some(id) if id >= 0 => Some(SoundDirective::BuiltIn {
            id: id as u32,
            volume: DEFAULT_SOUND_VOLUME,
        }),
        _ => None,
    }
}

/// Catalog paths use forward slashes; the consuming client wants a Windows
/// path under its `sound_files` directory.
fn sound_file_path(file: &str) -> String {
    format!("sound_files\\{}", file.replace('/', "\\"))
}

fn leading_number(s: &str) -> Option<u32> {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
