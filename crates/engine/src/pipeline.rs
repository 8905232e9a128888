// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Step/pipeline compilation and execution (spec §4.3).

use crate::actions::Action;
use crate::error::EngineError;
use crate::registry::Registry;
use logshipper_config::PipelineDocument;
use logshipper_core::{phase::sort_by_phase, Context, Dispatcher, Message};
use std::sync::Arc;
use tracing::warn;

/// One step's handlers, already sorted by phase with declaration order
/// preserved within a phase (spec §4.3).
struct CompiledStep {
    actions: Vec<Box<dyn Action>>,
}

/// A named, ordered sequence of compiled steps (spec §3 "Pipeline"). Does
/// not own its bound inputs — those live in `logshipper-daemon`, which
/// drives this type's [`CompiledPipeline::run`] from each input's `emit`.
pub struct CompiledPipeline {
    name: String,
    steps: Vec<CompiledStep>,
}

impl CompiledPipeline {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds one step per entry of `document.steps`: asks the registry
    /// for a factory per action-name key (declaration order, per spec
    /// §4.3), then stable-sorts the resulting handlers by phase.
    pub fn compile(name: impl Into<String>, document: &PipelineDocument, registry: &Registry) -> Result<Self, EngineError> {
        let mut steps = Vec::with_capacity(document.steps.len());
        for step_def in &document.steps {
            let mut actions: Vec<Box<dyn Action>> = Vec::with_capacity(step_def.len());
            for (action_name, params) in step_def {
                actions.push(registry.build(action_name, params)?);
            }
            sort_by_phase(&mut actions, |a| a.default_phase());
            steps.push(CompiledStep { actions });
        }
        Ok(Self { name: name.into(), steps })
    }

    /// Runs `message` through every step in order (spec §4.3 algorithm).
    /// Returns `None` when the message was dropped, either by a `drop`
    /// outcome or by an uncontained action-runtime-error (spec §7).
    pub fn run(&self, mut message: Message, dispatcher: Option<Arc<dyn Dispatcher>>) -> Option<Message> {
        let mut ctx = Context::new(dispatcher);

        'steps: for step in &self.steps {
            ctx.reset_for_step();
            for action in &step.actions {
                match action.invoke(&mut message, &mut ctx) {
                    Ok(crate::outcome::Outcome::Continue) => continue,
                    Ok(crate::outcome::Outcome::SkipStep) => continue 'steps,
                    Ok(crate::outcome::Outcome::DropMessage) => return None,
                    Err(err) if err.is_contained() => {
                        warn!(pipeline = %self.name, error = %err, "template-underflow, action skipped");
                        continue;
                    }
                    Err(err) => {
                        warn!(pipeline = %self.name, error = %err, "action failed, message dropped");
                        return None;
                    }
                }
            }
        }

        Some(message)
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
