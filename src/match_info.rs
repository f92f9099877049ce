use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AggregateError, Result};
use crate::fixtures::Side;
use crate::sheet::parse_number;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchInfo {
    #[serde(default, alias = "managers_and_captains")]
    pub managers_captains: Vec<String>,
    #[serde(default, alias = "score_xg")]
    pub score_xgs: Vec<String>,
    #[serde(default)]
    pub formations: serde_json::Map<String, Value>,
    #[serde(default)]
    pub possession: Vec<String>,
    #[serde(default)]
    pub substitutes: BTreeMap<String, BTreeMap<String, String>>,
}

impl MatchInfo {
    pub fn from_json(raw: &str, artifact: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|err| AggregateError::malformed(artifact, err))
    }

    pub fn manager(&self, side: Side) -> Option<&str> {
        let entry = self.managers_captains.get(side.index() * 2)?;
        entry.rsplit(": ").next().map(str::trim)
    }

    pub fn formation(&self, team: &str, side: Side) -> Option<&str> {
        self.formations
            .get(team)
            .or_else(|| self.formations.values().nth(side.index()))
            .and_then(Value::as_str)
    }

    pub fn possession(&self, side: Side, artifact: &str) -> Result<f64> {
        numeric_entry(&self.possession, side, "possession", artifact)
    }

    pub fn xg(&self, side: Side, artifact: &str) -> Result<f64> {
        numeric_entry(&self.score_xgs, side, "score_xgs", artifact)
    }

    pub fn substitutions(&self, team: &str) -> Substitutions<'_> {
        Substitutions {
            pairs: self.substitutes.get(team),
        }
    }
}

fn numeric_entry(values: &[String], side: Side, field: &str, artifact: &str) -> Result<f64> {
    let raw = values.get(side.index()).ok_or_else(|| {
        AggregateError::malformed(artifact, format!("{field} has no {side:?} entry"))
    })?;
    parse_number(raw)
        .ok_or_else(|| AggregateError::malformed(artifact, format!("{field}: not a number {raw:?}")))
}

#[derive(Debug, Clone, Copy)]
pub struct Substitutions<'a> {
    pairs: Option<&'a BTreeMap<String, String>>,
}

impl Substitutions<'_> {
    pub fn came_on(&self, player: &str) -> bool {
        self.pairs.is_some_and(|p| p.values().any(|on| on == player))
    }

    pub fn went_off(&self, player: &str) -> bool {
        self.pairs.is_some_and(|p| p.contains_key(player))
    }
}
