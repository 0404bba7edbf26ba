//! Shared pieces of pull and push run results.

use serde::Serialize;

/// Coarse outcome of a whole run, for choosing an exit signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    /// Nothing needed doing and nothing failed.
    NothingToDo,
    /// At least one item failed.
    Partial,
    Complete,
}

impl RunStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, RunStatus::Partial)
    }
}

/// An item that could not be pulled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub message: String,
}

impl ItemFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
