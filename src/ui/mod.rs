//! Terminal presentation layer
//!
//! This module handles:
//! - Rendering execution plans, conflicts and registry listings
//! - The end-of-run summary for `architech new`
//!
//! Everything here writes to stdout with `console` styling. Progress while a
//! run is in flight lives in [`crate::progress`].

pub mod display;
pub mod summary;

pub use display::{display_conflicts, display_modules, display_plan};
pub use summary::{display_existing_root, display_result};
