//! Response envelope returned to agent callers.
//!
//! Agent frameworks expect a flat JSON object rather than a Rust error, so
//! every outcome of a query is folded into `{status, message, result}`.

use crate::QueryResult;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub status: ToolStatus,
    pub message: String,
    /// Row array on success, empty string on error.
    pub result: Value,
}

impl ToolResponse {
    pub fn success(message: impl Into<String>, result: QueryResult) -> Self {
        Self {
            status: ToolStatus::Success,
            message: message.into(),
            result: result.into_value(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Error,
            message: message.into(),
            result: Value::String(String::new()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }
}
