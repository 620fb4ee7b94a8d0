// JobPulse - lib.rs
//
// Library entry point, exposing all modules for integration testing and
// programmatic use. The command-line front end lives in `main.rs`.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
