//! Command implementations for Architech CLI

pub mod cache;
pub mod helpers;
pub mod modules;
pub mod new;
pub mod plan;
pub mod validate;
