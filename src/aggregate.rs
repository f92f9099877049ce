use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::fantasy::FantasyGameweek;
use crate::fixtures::{Fixture, Season, Side};
use crate::match_info::MatchInfo;
use crate::metrics::{self, ValueChangeGuard};
use crate::position::PositionCounts;
use crate::roster::{Squad, TeamRoster};
use crate::schema::{FANTASY_ADDITIVE, Schema, VALUE, VALUE_CHANGE};
use crate::scope::Scope;
use crate::sheet::StatSheet;
use crate::store::FixtureStore;
use crate::team::{CARD_COLUMNS, TeamTable};
use crate::table::Table;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerTable {
    pub players: Vec<String>,
    pub ages: Vec<Option<String>>,
    pub positions: Vec<PositionCounts>,
    pub stats: Table,
}

impl PlayerTable {
    pub fn new(players: Vec<String>, columns: Vec<String>) -> Self {
        let n = players.len();
        Self {
            players,
            ages: vec![None; n],
            positions: vec![PositionCounts::default(); n],
            stats: Table::zeroed(columns, n),
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn row_of(&self, player: &str) -> Option<usize> {
        self.players.binary_search_by(|p| p.as_str().cmp(player)).ok()
    }

    pub fn get(&self, player: &str, column: &str) -> Option<f64> {
        self.stats.get(self.row_of(player)?, column)
    }

    fn note_age(&mut self, row: usize, raw: Option<&str>) {
        if self.ages[row].is_some() {
            return;
        }
        if let Some(age) = raw.filter(|a| !a.is_empty() && *a != "0") {
            self.ages[row] = Some(age.to_string());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamTables {
    pub player_stats: PlayerTable,
    pub gk_stats: PlayerTable,
}

impl TeamTables {
    fn new(squad: &Squad, schema: &Schema) -> Self {
        Self {
            player_stats: PlayerTable::new(squad.all_players(), schema.player_columns()),
            gk_stats: PlayerTable::new(squad.goalkeepers(), schema.goalkeeper_columns()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonAggregate {
    pub season: Season,
    pub teams: BTreeMap<String, TeamTables>,
    pub teams_stats: TeamTable,
    pub played_fixtures: Vec<Fixture>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonInputs {
    pub season: Season,
    pub roster: TeamRoster,
    pub fixtures: Vec<Fixture>,
}

impl SeasonInputs {
    pub fn load<S: FixtureStore + ?Sized>(store: &S, season: Season) -> Result<Self> {
        Ok(Self {
            season,
            roster: store.roster(season)?,
            fixtures: store.fixtures(season)?,
        })
    }
}

pub fn aggregate<S: FixtureStore + ?Sized>(
    store: &S,
    inputs: &SeasonInputs,
    schema: &Schema,
    scope: &Scope,
    guard: &ValueChangeGuard,
) -> Result<SeasonAggregate> {
    let resolved = scope.resolve(&inputs.roster, &inputs.fixtures)?;

    let mut teams: BTreeMap<String, TeamTables> = BTreeMap::new();
    let mut teams_stats = TeamTable::new(&resolved.teams);
    for team in &resolved.teams {
        let squad = inputs.roster.squad(team).cloned().unwrap_or_default();
        if let Some(record) = teams_stats.get_mut(team) {
            record.number_of_players = squad.len() as u32;
        }
        teams.insert(team.clone(), TeamTables::new(&squad, schema));
    }

    let mut fantasy: HashMap<u32, FantasyGameweek> = HashMap::new();
    for fixture in &resolved.fixtures {
        debug!(
            season = %inputs.season,
            fixture = %fixture.key(),
            score = %fixture.score,
            "fold fixture"
        );
        let match_info = store.match_info(fixture)?;
        if !fantasy.contains_key(&fixture.gameweek) {
            let gw = store.fantasy_gameweek(inputs.season, fixture.gameweek)?;
            fantasy.insert(fixture.gameweek, gw);
        }
        let gw = &fantasy[&fixture.gameweek];

        for side in [Side::Home, Side::Away] {
            let team = fixture.team(side);
            let Some(tables) = teams.get_mut(team) else {
                continue;
            };
            let sheet = store.team_sheet(fixture, team)?;
            fold_players(&mut tables.player_stats, &sheet, schema, team, &match_info, gw)?;
            let gk_sheet = store.goalkeeper_sheet(fixture, team)?;
            fold_goalkeepers(&mut tables.gk_stats, &gk_sheet, schema, team)?;

            if let Some(record) = teams_stats.get_mut(team) {
                let artifact = format!("{}/match_info", fixture.key());
                record.record_match_info(team, side, &match_info, &artifact)?;
                record.record_result(side, fixture.score);
            }
        }
    }

    for (team, tables) in teams.iter_mut() {
        metrics::finalize(&mut tables.player_stats.stats, &schema.ratios, guard);
        metrics::finalize(&mut tables.gk_stats.stats, &schema.goalkeeper_ratios, guard);

        let Some(record) = teams_stats.get_mut(team) else {
            continue;
        };
        for column in CARD_COLUMNS {
            record.set_cards(column, tables.player_stats.stats.column_sum(column));
        }
        record.active_players = tables
            .player_stats
            .stats
            .column("appearances")
            .map(|apps| apps.iter().filter(|a| **a >= 1.0).count() as u32)
            .unwrap_or(0);
    }

    info!(
        season = %inputs.season,
        fixtures = resolved.fixtures.len(),
        teams = teams.len(),
        "aggregated season"
    );
    Ok(SeasonAggregate {
        season: inputs.season,
        teams,
        teams_stats,
        played_fixtures: resolved.fixtures,
    })
}

fn fold_players(
    table: &mut PlayerTable,
    sheet: &StatSheet,
    schema: &Schema,
    team: &str,
    match_info: &MatchInfo,
    fantasy: &FantasyGameweek,
) -> Result<()> {
    sheet.require_columns(schema.accumulated_columns())?;
    let subs = match_info.substitutions(team);
    let columns: Vec<(usize, &str)> = schema
        .accumulated_columns()
        .filter_map(|c| Some((table.stats.column_index(c)?, c)))
        .collect();
    let [played_60, appearances, starts, sub_ins, sub_outs, value, value_change] = [
        "played_60",
        "appearances",
        "starts",
        "sub_ins",
        "sub_outs",
        VALUE,
        VALUE_CHANGE,
    ]
    .map(|c| table.stats.ensure_column(c));

    for player in sheet.players() {
        let Some(row) = table.row_of(player) else {
            warn!(team, player, sheet = sheet.artifact(), "player not in roster, skipped");
            continue;
        };
        let Some(line) = sheet.row(player) else {
            continue;
        };
        for &(col, name) in &columns {
            let stat = line.number(name)?;
            table.stats.add_value(row, col, stat);
            if name == "minutes" && stat > 60.0 {
                table.stats.add_value(row, played_60, 1.0);
            }
        }
        table.note_age(row, line.text("age"));
        if let Some(position) = line.text("position") {
            table.positions[row].record(position);
        }

        if subs.came_on(player) {
            table.stats.add_value(row, sub_ins, 1.0);
        } else {
            table.stats.add_value(row, starts, 1.0);
        }
        if subs.went_off(player) {
            table.stats.add_value(row, sub_outs, 1.0);
        }
        table.stats.add_value(row, appearances, 1.0);

        match fantasy.lookup(player) {
            Some(record) => {
                for field in FANTASY_ADDITIVE {
                    if let (Some(col), Some(v)) = (table.stats.column_index(field), record.field(field)) {
                        table.stats.add_value(row, col, v);
                    }
                }
                let previous = table.stats.value(row, value);
                table.stats.set_value(row, value, record.value);
                table.stats.set_value(row, value_change, record.value - previous);
            }
            None => debug!(player, gameweek = fantasy.gameweek, "no unique fantasy row"),
        }
    }
    Ok(())
}

fn fold_goalkeepers(
    table: &mut PlayerTable,
    sheet: &StatSheet,
    schema: &Schema,
    team: &str,
) -> Result<()> {
    sheet.require_columns(schema.goalkeeper_accumulated_columns())?;
    let columns: Vec<(usize, &str)> = schema
        .goalkeeper_accumulated_columns()
        .filter_map(|c| Some((table.stats.column_index(c)?, c)))
        .collect();
    let appearances = table.stats.ensure_column("appearances");

    for player in sheet.players() {
        let Some(row) = table.row_of(player) else {
            warn!(team, player, sheet = sheet.artifact(), "goalkeeper not in roster, skipped");
            continue;
        };
        let Some(line) = sheet.row(player) else {
            continue;
        };
        for &(col, name) in &columns {
            table.stats.add_value(row, col, line.number(name)?);
        }
        table.note_age(row, line.text("age"));
        table.stats.add_value(row, appearances, 1.0);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_is_set_once() {
        let mut table = PlayerTable::new(vec!["A".into(), "B".into()], vec!["minutes".into()]);
        table.note_age(0, Some("0"));
        assert_eq!(table.ages[0], None);
        table.note_age(0, Some("24-100"));
        table.note_age(0, Some("24-107"));
        assert_eq!(table.ages[0].as_deref(), Some("24-100"));
        assert_eq!(table.row_of("B"), Some(1));
        assert_eq!(table.row_of("C"), None);
    }
}
