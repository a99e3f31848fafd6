//! Claim Registrar
//!
//! Actor-scoped registry of property claims (e.g. domain ownership) with
//! deterministic, collision-resistant storage keys, a permanent
//! registrations namespace and a per-actor external reference slot.

pub mod cli;
pub mod config;
pub mod registrar;
pub mod storage;
