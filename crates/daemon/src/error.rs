// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Manager-level failures (spec §4.5, §7). A *config-parse-error* never
/// reaches here — the loader swallows it, logs it, and leaves the
/// previously running pipeline untouched.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("pipeline not found: {0}")]
    PipelineNotFound(String),
    #[error("recursion too deep (limit 10)")]
    RecursionTooDeep,
    #[error(transparent)]
    Config(#[from] logshipper_config::ConfigError),
    #[error(transparent)]
    Engine(#[from] logshipper_engine::EngineError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
