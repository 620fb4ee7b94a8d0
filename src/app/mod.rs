// JobPulse - app/mod.rs
//
// Application layer: dataset loading and caching, session state, reporting.
// Dependencies: core, platform, util.

pub mod loader;
pub mod report;
pub mod state;
