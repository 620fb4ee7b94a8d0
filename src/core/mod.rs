// JobPulse - core/mod.rs
//
// Core business logic layer.
// Dependencies: data crates only (csv, serde, chrono, regex).
// Must NOT depend on: app, platform, or the filesystem.

pub mod classify;
pub mod export;
pub mod filter;
pub mod model;
pub mod normalizer;
pub mod reader;
pub mod summary;
