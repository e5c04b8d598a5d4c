//! CLI subcommand implementations.

pub mod flow;
pub mod mcp;
pub mod screen;
