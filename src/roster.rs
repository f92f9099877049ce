use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squad {
    #[serde(default)]
    pub outfield: Vec<String>,
    #[serde(default)]
    pub goalkeeper: Vec<String>,
}

impl Squad {
    pub fn all_players(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .outfield
            .iter()
            .chain(self.goalkeeper.iter())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn goalkeepers(&self) -> Vec<String> {
        let mut names = self.goalkeeper.clone();
        names.sort();
        names.dedup();
        names
    }

    pub fn len(&self) -> usize {
        self.all_players().len()
    }

    pub fn is_empty(&self) -> bool {
        self.outfield.is_empty() && self.goalkeeper.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamRoster {
    teams: BTreeMap<String, Squad>,
}

impl TeamRoster {
    pub fn new(teams: BTreeMap<String, Squad>) -> Self {
        Self { teams }
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn squad(&self, team: &str) -> Option<&Squad> {
        self.teams.get(team)
    }

    pub fn contains(&self, team: &str) -> bool {
        self.teams.contains_key(team)
    }

    pub fn team_names(&self) -> Vec<String> {
        self.teams.keys().cloned().collect()
    }

    pub fn insert(&mut self, team: impl Into<String>, squad: Squad) {
        self.teams.insert(team.into(), squad);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_player_info_json() {
        let raw = r#"{
            "Chelsea": {"outfield": ["N'Golo Kanté", "Eden Hazard"], "goalkeeper": ["Thibaut Courtois"]},
            "Arsenal": {"outfield": ["Mesut Özil"], "goalkeeper": []}
        }"#;
        let roster = TeamRoster::from_json(raw).unwrap();
        assert_eq!(roster.team_names(), vec!["Arsenal", "Chelsea"]);
        let chelsea = roster.squad("Chelsea").unwrap();
        assert_eq!(
            chelsea.all_players(),
            vec!["Eden Hazard", "N'Golo Kanté", "Thibaut Courtois"]
        );
        assert_eq!(chelsea.len(), 3);
        assert!(!roster.contains("Spurs"));
    }
}
