//! goloop CLI library.
//!
//! The session controller, the build/run orchestrator and the interactive
//! front end of the `goloop` binary.

pub mod colors;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod repl;
pub mod runner;
pub mod session;
pub mod transcript;
