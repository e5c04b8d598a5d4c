//! MCP (Model Context Protocol) server for A-share capital-flow analysis
//!
//! This crate provides a stdio-based MCP server that exposes fund-flow
//! screening and per-stock flow analysis to AI assistants via the Model
//! Context Protocol.
//!
//! # Architecture
//!
//! The server is organized into the following submodules:
//! - `server`: server state, caches, and protocol handler wiring
//! - `tools`: tool implementations (analyze_large_fund_flow, analyze_stock_fund_flow_detail)
//! - `types`: tool input/output types with JSON Schema generation
//! - `resources`: read-only documentation resources
//! - `prompts`: guided analysis workflow templates
//! - `error`: unified error type and protocol error mapping
//!
//! # Transport
//!
//! The server communicates via stdio using JSON-RPC 2.0 message framing
//! from the rmcp SDK. All logging is redirected to stderr to prevent
//! stdout protocol corruption.

pub mod error;
pub mod prompts;
pub mod resources;
pub mod server;
pub mod tools;
pub mod types;

pub use error::{Error, Result};
pub use server::FundFlowServer;
