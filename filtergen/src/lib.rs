//! filtergen - loot filter compiler
//!
//! Compiles a layered, player-authored configuration store (item→tier
//! mappings, tier definitions, theme defaults, a sound catalog and targeted
//! override rules) into one deterministic, line-oriented filter document
//! plus a style sidecar for the external previewer.
//!
//! The pipeline, leaves first: [`loader`] reads and pairs the documents,
//! [`index`] derives per-tier item sets, [`rules`] matches override rules
//! against each tier's pending set, [`style`] computes effective styling,
//! [`emit`] renders blocks, and [`assemble`] drives the whole walk and
//! accumulates the output.

pub mod assemble;
pub mod config;
pub mod emit;
pub mod index;
pub mod loader;
pub mod rules;
pub mod style;

pub use assemble::{DocumentAssembler, FilterOutput};
pub use config::GeneratorConfig;
pub use loader::DocumentStore;
