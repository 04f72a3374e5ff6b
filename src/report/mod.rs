//! Renderers for the CLI.
//!
//! - [`terminal`]: summary box for routing decisions and tables for back-ends
//!   and supported suffixes. JSON output is written directly by `main`.

pub mod terminal;
