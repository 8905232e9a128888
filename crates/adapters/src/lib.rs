// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Concrete inputs and sinks (spec §4.4, §6): the async/IO edge the
//! synchronous engine crate never touches directly.

pub mod emitter;
pub mod input;
pub mod sinks;

pub use emitter::{Downstream, Emitter};
pub use input::InputHandle;
