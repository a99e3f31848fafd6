//! Storage layer for registry data
//!
//! Manages key derivation, the claims database and the identity keystore.

pub mod claim_storage;
pub mod identity;
pub mod keys;
pub mod models;
