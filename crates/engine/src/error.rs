// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The engine's error taxonomy (spec §7).

use logshipper_core::TemplateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A step mapping names an action the registry has no factory for.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// An action's declarative parameters don't match what its factory
    /// expects.
    #[error("invalid parameters for action '{action}': {message}")]
    InvalidParams { action: String, message: String },

    #[error("invalid regular expression: {0}")]
    Regex(#[from] regex::Error),

    /// *template-underflow* (spec §7): contained to the single action,
    /// does not drop the message.
    #[error(transparent)]
    TemplateUnderflow(TemplateError),

    /// *action-runtime-error* (spec §7): drops the message at this point.
    #[error("action failed: {0}")]
    Runtime(String),
}

impl EngineError {
    /// Whether this failure is contained to the offending action (the
    /// message proceeds to the next step unmutated) or drops the message
    /// outright (spec §7).
    pub fn is_contained(&self) -> bool {
        matches!(self, EngineError::TemplateUnderflow(_))
    }
}

impl From<TemplateError> for EngineError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::Underflow { .. } => EngineError::TemplateUnderflow(e),
            other => EngineError::Runtime(other.to_string()),
        }
    }
}
