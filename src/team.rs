use crate::error::Result;
use crate::fixtures::{Score, Side};
use crate::form::{FormQueue, MatchResult};
use crate::match_info::MatchInfo;
use crate::table::Table;

pub const TEAM_COLUMNS: [&str; 34] = [
    "matches_played",
    "pts",
    "home_pts",
    "away_pts",
    "xg",
    "wins",
    "draws",
    "losses",
    "home_wins",
    "away_wins",
    "home_draws",
    "away_draws",
    "home_losses",
    "away_losses",
    "cleansheets",
    "home_cleansheets",
    "away_cleansheets",
    "conceded_2_plus",
    "number_of_players",
    "active_players",
    "goals_for",
    "goals_against",
    "home_goals_for",
    "home_goals_against",
    "away_goals_for",
    "away_goals_against",
    "pct_possession",
    "cards_yellow",
    "cards_red",
    "cards_yellow_red",
    "form_pts",
    "home_form_pts",
    "away_form_pts",
    "managers_used",
];

pub const CARD_COLUMNS: [&str; 3] = ["cards_yellow", "cards_red", "cards_yellow_red"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamRecord {
    pub matches_played: u32,
    pub pts: u32,
    pub home_pts: u32,
    pub away_pts: u32,
    pub xg: f64,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub home_wins: u32,
    pub away_wins: u32,
    pub home_draws: u32,
    pub away_draws: u32,
    pub home_losses: u32,
    pub away_losses: u32,
    pub cleansheets: u32,
    pub home_cleansheets: u32,
    pub away_cleansheets: u32,
    pub conceded_2_plus: u32,
    pub number_of_players: u32,
    pub active_players: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub home_goals_for: u32,
    pub home_goals_against: u32,
    pub away_goals_for: u32,
    pub away_goals_against: u32,
    pub pct_possession: f64,
    pub cards_yellow: f64,
    pub cards_red: f64,
    pub cards_yellow_red: f64,
    pub form: FormQueue,
    pub home_form: FormQueue,
    pub away_form: FormQueue,
    pub managers: Vec<String>,
    pub formations: Vec<String>,
}

impl TeamRecord {
    pub fn record_result(&mut self, side: Side, score: Score) {
        let (scored, conceded) = score.for_side(side);
        let result = MatchResult::from_goals(scored, conceded);
        let points = result.points();

        self.matches_played += 1;
        self.pts += points;
        self.goals_for += scored;
        self.goals_against += conceded;
        if conceded == 0 {
            self.cleansheets += 1;
        }
        if conceded >= 2 {
            self.conceded_2_plus += 1;
        }
        match result {
            MatchResult::Win => self.wins += 1,
            MatchResult::Draw => self.draws += 1,
            MatchResult::Loss => self.losses += 1,
        }
        self.form.push(result);

        match side {
            Side::Home => {
                self.home_pts += points;
                self.home_goals_for += scored;
                self.home_goals_against += conceded;
                if conceded == 0 {
                    self.home_cleansheets += 1;
                }
                match result {
                    MatchResult::Win => self.home_wins += 1,
                    MatchResult::Draw => self.home_draws += 1,
                    MatchResult::Loss => self.home_losses += 1,
                }
                self.home_form.push(result);
            }
            Side::Away => {
                self.away_pts += points;
                self.away_goals_for += scored;
                self.away_goals_against += conceded;
                if conceded == 0 {
                    self.away_cleansheets += 1;
                }
                match result {
                    MatchResult::Win => self.away_wins += 1,
                    MatchResult::Draw => self.away_draws += 1,
                    MatchResult::Loss => self.away_losses += 1,
                }
                self.away_form.push(result);
            }
        }
    }

    pub fn record_match_info(
        &mut self,
        team: &str,
        side: Side,
        info: &MatchInfo,
        artifact: &str,
    ) -> Result<()> {
        self.pct_possession += info.possession(side, artifact)?;
        self.xg += info.xg(side, artifact)?;
        if let Some(manager) = info.manager(side) {
            push_unique(&mut self.managers, manager);
        }
        if let Some(formation) = info.formation(team, side) {
            push_unique(&mut self.formations, formation);
        }
        Ok(())
    }

    pub fn numeric(&self, column: &str) -> Option<f64> {
        let v = match column {
            "matches_played" => self.matches_played as f64,
            "pts" => self.pts as f64,
            "home_pts" => self.home_pts as f64,
            "away_pts" => self.away_pts as f64,
            "xg" => self.xg,
            "wins" => self.wins as f64,
            "draws" => self.draws as f64,
            "losses" => self.losses as f64,
            "home_wins" => self.home_wins as f64,
            "away_wins" => self.away_wins as f64,
            "home_draws" => self.home_draws as f64,
            "away_draws" => self.away_draws as f64,
            "home_losses" => self.home_losses as f64,
            "away_losses" => self.away_losses as f64,
            "cleansheets" => self.cleansheets as f64,
            "home_cleansheets" => self.home_cleansheets as f64,
            "away_cleansheets" => self.away_cleansheets as f64,
            "conceded_2_plus" => self.conceded_2_plus as f64,
            "number_of_players" => self.number_of_players as f64,
            "active_players" => self.active_players as f64,
            "goals_for" => self.goals_for as f64,
            "goals_against" => self.goals_against as f64,
            "home_goals_for" => self.home_goals_for as f64,
            "home_goals_against" => self.home_goals_against as f64,
            "away_goals_for" => self.away_goals_for as f64,
            "away_goals_against" => self.away_goals_against as f64,
            "pct_possession" => self.pct_possession,
            "cards_yellow" => self.cards_yellow,
            "cards_red" => self.cards_red,
            "cards_yellow_red" => self.cards_yellow_red,
            "form_pts" => self.form.points() as f64,
            "home_form_pts" => self.home_form.points() as f64,
            "away_form_pts" => self.away_form.points() as f64,
            "managers_used" => self.managers.len() as f64,
            _ => return None,
        };
        Some(v)
    }

    pub fn set_cards(&mut self, column: &str, total: f64) {
        match column {
            "cards_yellow" => self.cards_yellow = total,
            "cards_red" => self.cards_red = total,
            "cards_yellow_red" => self.cards_yellow_red = total,
            _ => {}
        }
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamTable {
    teams: Vec<String>,
    records: Vec<TeamRecord>,
}

impl TeamTable {
    pub fn new(teams: &[String]) -> Self {
        let mut names = teams.to_vec();
        names.sort();
        names.dedup();
        let records = vec![TeamRecord::default(); names.len()];
        Self {
            teams: names,
            records,
        }
    }

    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn get(&self, team: &str) -> Option<&TeamRecord> {
        let idx = self.teams.iter().position(|t| t == team)?;
        self.records.get(idx)
    }

    pub fn get_mut(&mut self, team: &str) -> Option<&mut TeamRecord> {
        let idx = self.teams.iter().position(|t| t == team)?;
        self.records.get_mut(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TeamRecord)> {
        self.teams.iter().map(String::as_str).zip(self.records.iter())
    }

    pub fn to_table(&self) -> Table {
        let columns: Vec<String> = TEAM_COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut table = Table::zeroed(columns, self.records.len());
        for (row, record) in self.records.iter().enumerate() {
            for (col, name) in TEAM_COLUMNS.iter().enumerate() {
                table.set_value(row, col, record.numeric(name).unwrap_or(0.0));
            }
        }
        table
    }
}
