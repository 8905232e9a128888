// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The pipeline document shape (spec §6): a mapping with optional `inputs`
//! and `steps` keys. Both preserve declaration order — `steps` because
//! action phase ties are broken by declaration order (spec §4.3), `inputs`
//! because the spec requires the mapping-or-sequence-of-mappings forms to
//! concatenate in order.

use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// One step: an ordered `action-name → params` mapping. Order is
/// significant (spec §4.3: "Mapping-key ordering within YAML is
/// authoritative for intra-phase order").
pub type StepDef = IndexMap<String, serde_yaml::Value>;

/// One bound input: its declared name and raw parameters, prior to being
/// handed to the adapters crate's input registry.
#[derive(Debug, Clone)]
pub struct InputDef {
    pub name: String,
    pub params: serde_yaml::Value,
}

/// A parsed pipeline document, prior to compilation into a running
/// pipeline (spec §6 "Configuration document").
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineDocument {
    #[serde(default, deserialize_with = "deserialize_inputs")]
    pub inputs: Vec<InputDef>,
    #[serde(default)]
    pub steps: Vec<StepDef>,
}

/// Accepts either a single mapping `name → params`, or a sequence of such
/// mappings concatenated in order (spec §6: "either a mapping `name→params`
/// or a sequence of such mappings (concatenated preserving order)").
///
/// Mirrors the teacher's step-deserialization visitor: a bare mapping is
/// the common case, a sequence is the multi-block form.
fn deserialize_inputs<'de, D>(deserializer: D) -> Result<Vec<InputDef>, D::Error>
where
    D: Deserializer<'de>,
{
    struct InputsVisitor;

    impl<'de> Visitor<'de> for InputsVisitor {
        type Value = Vec<InputDef>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping of input name to params, or a sequence of such mappings")
        }

        fn visit_map<M>(self, map: M) -> Result<Vec<InputDef>, M::Error>
        where
            M: MapAccess<'de>,
        {
            let index_map: IndexMap<String, serde_yaml::Value> =
                IndexMap::deserialize(de::value::MapAccessDeserializer::new(map))?;
            Ok(index_map
                .into_iter()
                .map(|(name, params)| InputDef { name, params })
                .collect())
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Vec<InputDef>, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut out = Vec::new();
            while let Some(block) = seq.next_element::<IndexMap<String, serde_yaml::Value>>()? {
                out.extend(
                    block
                        .into_iter()
                        .map(|(name, params)| InputDef { name, params }),
                );
            }
            Ok(out)
        }
    }

    deserializer.deserialize_any(InputsVisitor)
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
