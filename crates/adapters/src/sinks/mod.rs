// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete sink implementations behind the engine's opaque sink traits
//! (spec §6). Each wraps whatever real I/O it needs and keeps its trait
//! methods synchronous, per `logshipper_engine::sinks`'s doc comment.

pub mod elasticsearch;
pub mod logging;
pub mod rabbitmq;
pub mod statsd;
