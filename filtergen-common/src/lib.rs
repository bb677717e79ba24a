//! # Filtergen Common Library
//!
//! Shared code for the loot-filter compiler:
//! - Configuration document models (mapping, tier definition, theme, sounds)
//! - Error types
//! - Color normalization
//! - Tier label ranking and ordering
//! - Output localization helpers

pub mod color;
pub mod docs;
pub mod error;
pub mod locale;
pub mod tier;

pub use error::{Error, Result};
pub use locale::Language;
pub use tier::TierRank;
