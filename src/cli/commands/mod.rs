//! CLI command implementations

pub mod claims;
pub mod config;
pub mod identity;
