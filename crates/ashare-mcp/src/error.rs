//! Error types for the MCP server
//!
//! This module defines a unified error type for the MCP server that
//! carries an HTTP-style code plus structured context, and converts into
//! protocol-level `rmcp` error data for tool and resource responses.

use rmcp::ErrorData as McpError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Result type for MCP operations
pub type Result<T> = std::result::Result<T, Error>;

/// MCP server error with an HTTP status-like code and optional context
#[derive(Debug, Error, Serialize, Deserialize, Clone)]
#[error("{message}")]
pub struct Error {
    /// HTTP status-like code (e.g., 400, 404, 500)
    pub code: i32,

    /// Human-readable error message
    pub message: String,

    /// Additional error context (e.g., parameter name, stock code)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl Error {
    /// Create a new error with a code and message
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Add context information as JSON
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Invalid parameter error
    pub fn invalid_param(param: impl Into<String>, reason: impl Into<String>) -> Self {
        let p = param.into();
        let r = reason.into();
        Self::new(400, format!("Invalid parameter '{}': {}", p, r)).with_context(json!({
            "parameter": p,
            "reason": r,
        }))
    }

    /// Resource or prompt not found
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(404, what.into())
    }

    /// Internal server error
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::new(500, format!("Internal server error: {}", reason.into()))
    }
}

impl From<ashare_lib::Error> for Error {
    fn from(err: ashare_lib::Error) -> Self {
        match &err {
            ashare_lib::Error::InvalidStockCode { .. }
            | ashare_lib::Error::UnknownExchange { .. }
            | ashare_lib::Error::UnknownBoard { .. } => Self::new(400, err.to_string()),
            _ => Self::new(500, err.to_string()),
        }
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        match err.code {
            400 => McpError::invalid_params(err.message, err.context),
            404 => McpError::resource_not_found(err.message, err.context),
            _ => McpError::internal_error(err.message, err.context),
        }
    }
}
