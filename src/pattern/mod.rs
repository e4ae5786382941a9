//! Recoil pattern data
//!
//! Authoring-time structures plus the read path the simulation consumes:
//! - `graph`: ordered, id-stable unit list
//! - `recoil_pattern`: kick lookup, end-of-pattern policy, tuning
//! - `clipboard`: position copy/paste between graphs

pub mod clipboard;
pub mod graph;
pub mod recoil_pattern;

pub use clipboard::UnitClipboard;
pub use graph::{RearrangePolicy, RecoilUnit, UnitGraph};
pub use recoil_pattern::{PatternEndBehavior, PatternScale, RandomRange, RecoilPattern};
