//! Critic library crate
//!
//! Exposes the review engine and the caller-side plumbing (config, store)
//! so tests and external tooling can drive them without CLI startup.

pub mod config;
pub mod review;
pub mod store;
pub mod util;
