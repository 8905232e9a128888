// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Action registry (spec §4.2): maps action names to factories that turn
//! declarative YAML parameters into a boxed [`Action`].

use crate::actions::Action;
use crate::error::EngineError;
use std::collections::HashMap;

/// A registered action's constructor: given the step mapping's value for
/// this action's key, produce a handler.
pub type ActionFactory = Box<dyn Fn(&serde_yaml::Value) -> Result<Box<dyn Action>, EngineError> + Send + Sync>;

#[derive(Default)]
pub struct Registry {
    factories: HashMap<String, ActionFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, factory: ActionFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn build(&self, name: &str, params: &serde_yaml::Value) -> Result<Box<dyn Action>, EngineError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| EngineError::UnknownAction(name.to_string()))?;
        factory(params)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
