// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

/// What an action's invocation means for the rest of the step/pipeline
/// (spec §4.2, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Proceed to the next action in the step.
    Continue,
    /// Stop the current step; proceed to the next step.
    SkipStep,
    /// Stop the pipeline entirely; the message is dropped.
    DropMessage,
}
