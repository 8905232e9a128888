// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in action implementations (spec §4.2).

mod dispatch;
mod r#match;
mod misc;
mod sink_actions;
mod terminal;

pub(crate) use dispatch::{CallAction, ForkAction, JumpAction};
pub(crate) use r#match::{ExtractAction, FieldPattern, MatchAction};
pub(crate) use misc::{DropAction, EdgeAction, ReplaceAction, SetAction, StrptimeAction, TimewindowAction, UnsetAction};
pub(crate) use sink_actions::{ElasticsearchAction, LoggingAction, RabbitmqAction, StatsdAction};
pub(crate) use terminal::{DebugAction, RealWriter, StdoutAction};

use crate::error::EngineError;
use crate::outcome::Outcome;
use logshipper_core::{Context, Message, Phase};

/// A handler produced by a registered factory (spec §4.2): examines and/or
/// mutates a message, given the shared per-traversal [`Context`].
pub trait Action: Send + Sync {
    /// The phase this action sorts into when its configuration didn't
    /// override it. Implementations return their documented default;
    /// `Registry::build` applies any author override.
    fn default_phase(&self) -> Phase;

    fn invoke(&self, message: &mut Message, ctx: &mut Context) -> Result<Outcome, EngineError>;
}
