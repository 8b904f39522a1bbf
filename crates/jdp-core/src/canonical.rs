// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canonical map: the pipeline's principal output.

use crate::section::SemanticZone;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from zone tag to the zone's lines in document order.
///
/// A zone key is present iff it has at least one line; no key ever maps to
/// an empty list. Key order is not contractual; consumers must key by
/// zone, not position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CanonicalMap(BTreeMap<SemanticZone, Vec<String>>);

impl CanonicalMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line to a zone, creating the zone on first use.
    pub fn push(&mut self, zone: SemanticZone, line: impl Into<String>) {
        self.0.entry(zone).or_default().push(line.into());
    }

    /// Lines of a zone, if the zone is present.
    pub fn get(&self, zone: SemanticZone) -> Option<&[String]> {
        self.0.get(&zone).map(Vec::as_slice)
    }

    /// Number of populated zones.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no zone is populated.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate populated zones and their lines.
    pub fn iter(&self) -> impl Iterator<Item = (&SemanticZone, &Vec<String>)> {
        self.0.iter()
    }
}
