// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `call`, `jump`, `fork` (spec §4.2, §4.6): cross-pipeline dispatch
//! actions. The recursion bound and pipeline lookup live on the
//! [`logshipper_core::Dispatcher`] the manager installs on the context;
//! these actions only choose which dispatch entry point to call.

use crate::error::EngineError;
use crate::outcome::Outcome;
use logshipper_core::{Context, DispatchError, Message, Phase};

fn dispatcher_or_runtime_error(ctx: &Context) -> Result<&std::sync::Arc<dyn logshipper_core::Dispatcher>, EngineError> {
    ctx.dispatcher
        .as_ref()
        .ok_or_else(|| EngineError::Runtime("no dispatcher configured for this context".to_string()))
}

impl From<DispatchError> for EngineError {
    fn from(e: DispatchError) -> Self {
        EngineError::Runtime(e.to_string())
    }
}

/// Dispatches a copy of the current message synchronously, then continues
/// the current pipeline with the original, unmodified message.
pub(crate) struct CallAction {
    pub pipeline: String,
    pub phase: Phase,
}

impl super::Action for CallAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, ctx: &mut Context) -> Result<Outcome, EngineError> {
        let dispatcher = dispatcher_or_runtime_error(ctx)?;
        dispatcher.process(message.clone(), &self.pipeline)?;
        Ok(Outcome::Continue)
    }
}

/// Dispatches the current message synchronously, then stops the current
/// pipeline's traversal (spec: "returns drop-message").
pub(crate) struct JumpAction {
    pub pipeline: String,
    pub phase: Phase,
}

impl super::Action for JumpAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, ctx: &mut Context) -> Result<Outcome, EngineError> {
        let dispatcher = dispatcher_or_runtime_error(ctx)?;
        dispatcher.process(message.clone(), &self.pipeline)?;
        Ok(Outcome::DropMessage)
    }
}

/// Dispatches a copy of the current message onto the shared worker pool
/// and continues the current pipeline immediately.
pub(crate) struct ForkAction {
    pub pipeline: String,
    pub phase: Phase,
}

impl super::Action for ForkAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, ctx: &mut Context) -> Result<Outcome, EngineError> {
        let dispatcher = dispatcher_or_runtime_error(ctx)?;
        dispatcher.process_async(message.clone(), &self.pipeline);
        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
