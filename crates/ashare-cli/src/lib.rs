//! Command implementations for the ashare CLI.
//!
//! The binary in `main.rs` parses arguments and dispatches here. Splitting
//! the commands into a library keeps them reachable from integration tests.

pub mod commands;
