use std::collections::HashSet;
use std::fmt;

use anyhow::{Context, Result, bail};
use once_cell::sync::OnceCell;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::aggregate::{PlayerTable, SeasonAggregate, SeasonInputs, aggregate};
use crate::error::AggregateError;
use crate::expr::{self, ColumnExpr, ExprError};
use crate::fixtures::Season;
use crate::metrics::{DEFAULT_VALUE_CHANGE_LIMIT, ValueChangeGuard};
use crate::position::Place;
use crate::schema::Schema;
use crate::scope::{GameweekRange, Scope};
use crate::store::FixtureStore;
use crate::table::Table;

pub const IDENTITY: [&str; 3] = ["season", "team", "player"];

pub const LABEL_COLUMNS: [&str; 19] = [
    "goals",
    "assists",
    "appearances",
    "starts",
    "cards_yellow",
    "cards_red",
    "minutes",
    "played_60",
    "one_goal",
    "two_goals",
    "three_goals",
    "three_goals_plus",
    "one_assist",
    "two_assists",
    "three_assists",
    "three_assists_plus",
    "played_60_plus",
    "team_conceded_2_plus",
    "team_cleansheets",
];

const PLAYER_EXPRESSIONS: &[&str] = &[
    "minutes_per_goal = minutes / goals",
    "minutes_per_assist = minutes / assists",
    "goals_xg_diff = goals - xg",
    "assists_xa_diff = assists - xa",
    "minutes_per_sca = minutes / sca",
    "minutes_per_gca = minutes / gca",
    "goals_to_shot_ratio = goals / shots_total",
    "target_to_shot_ratio = shots_on_target / shots_total",
    "dribbles_per_app = dribbles / appearances",
    "blocks_per_app = blocks / appearances",
    "clearances_per_app = clearances / appearances",
    "errors_per_app = errors / appearances",
    "points_per_app = total_points / appearances",
    "tackles_pct = tackles_won / tackles",
    "interceptions_per_app = interceptions / appearances",
    "touches_per_app = touches / appearances",
    "minutes_per_cross = minutes / crosses",
    "minutes_per_fouled = minutes / fouled",
    "minutes_per_foul = minutes / fouls",
    "minutes_per_offside = minutes / offsides",
    "ball_recoveries_per_app = ball_recoveries / appearances",
    "through_pass_ratio = through_balls / passes",
    "dist_per_carry = carry_distance / carries",
    "prog_dist_per_carry = carry_progressive_distance / progressive_carries",
    "prog_to_total_ratio = passes_progressive_distance / passes_total_distance",
    "sub_outs_per_start = sub_outs / starts",
    "sub_ins_per_app = sub_ins / appearances",
    "minutes_per_yellow = cards_yellow / minutes",
    "fouls_per_yellow = fouls / cards_yellow",
    "miscontrols_per_app = miscontrols / appearances",
    "dispossessed_per_app = dispossessed / appearances",
    "played_60_per_app = played_60 / appearances",
    "oob_per_pass = passes_oob / passes",
    "intercepted_per_pass = passes_intercepted / passes",
    "blocked_per_pass = passes_blocked / passes",
    "prog_per_pass_received = progressive_passes_received / passes_received",
    "bonus_per_app = bonus / appearances",
    "transfers_ratio = transfers_in / transfers_out",
    "carries_into_final_third_pct = carries_into_final_third / carries",
    "carries_into_pen_area_pct = carries_into_penalty_area / carries",
    "passes_pct_short = passes_completed_short / passes_short",
    "passes_pct_long = passes_completed_long / passes_long",
    "passes_pct_medium = passes_completed_medium / passes_medium",
    "touches_att_pen_area_pct = touches_att_pen_area / touches",
    "touches_att_3rd_pct = touches_att_3rd / touches",
    "touches_mid_3rd_pct = touches_mid_3rd / touches",
    "touches_def_3rd_pct = touches_def_3rd / touches",
    "touches_def_pen_area_pct = touches_def_pen_area / touches",
];

const TEAM_EXPRESSIONS: &[&str] = &[
    "pts_per_game = pts / matches_played",
    "home_pts_ratio = home_pts / pts",
    "away_pts_ratio = away_pts / pts",
    "wins_ratio = wins / matches_played",
    "draws_ratio = draws / matches_played",
    "h_cleansheets_ratio = home_cleansheets / cleansheets",
    "a_cleansheets_ratio = away_cleansheets / cleansheets",
    "pct_possession = pct_possession / matches_played",
    "goal_ratio = goals_for / goals_against",
    "home_goal_ratio = home_goals_for / home_goals_against",
    "away_goal_ratio = away_goals_for / away_goals_against",
    "home_win_ratio = home_wins / wins",
    "away_win_ratio = away_wins / wins",
    "home_draw_ratio = home_draws / draws",
    "away_draw_ratio = away_draws / draws",
    "home_loss_ratio = home_losses / losses",
    "away_loss_ratio = away_losses / losses",
];

const PLAYER_FEATURES: &[&str] = &[
    "age",
    "place",
    "value",
    "value_change",
    "minutes_per_goal",
    "minutes_per_assist",
    "goals_xg_diff",
    "assists_xa_diff",
    "minutes_per_sca",
    "minutes_per_gca",
    "goals_to_shot_ratio",
    "target_to_shot_ratio",
    "dribbles_per_app",
    "blocks_per_app",
    "clearances_per_app",
    "errors_per_app",
    "points_per_app",
    "tackles_pct",
    "interceptions_per_app",
    "touches_per_app",
    "minutes_per_cross",
    "minutes_per_fouled",
    "minutes_per_foul",
    "minutes_per_offside",
    "ball_recoveries_per_app",
    "through_pass_ratio",
    "dist_per_carry",
    "prog_dist_per_carry",
    "prog_to_total_ratio",
    "sub_outs_per_start",
    "sub_ins_per_app",
    "minutes_per_yellow",
    "fouls_per_yellow",
    "miscontrols_per_app",
    "dispossessed_per_app",
    "played_60_per_app",
    "oob_per_pass",
    "intercepted_per_pass",
    "blocked_per_pass",
    "prog_per_pass_received",
    "bonus_per_app",
    "transfers_ratio",
    "carries_into_final_third_pct",
    "carries_into_pen_area_pct",
    "touches_att_pen_area_pct",
    "touches_att_3rd_pct",
    "touches_mid_3rd_pct",
    "touches_def_3rd_pct",
    "touches_def_pen_area_pct",
    "influence",
    "creativity",
    "threat",
];

const TEAM_FEATURES: &[&str] = &[
    "pts_per_game",
    "home_pts_ratio",
    "away_pts_ratio",
    "wins_ratio",
    "draws_ratio",
    "h_cleansheets_ratio",
    "a_cleansheets_ratio",
    "goal_ratio",
    "home_goal_ratio",
    "away_goal_ratio",
    "home_win_ratio",
    "away_win_ratio",
    "home_draw_ratio",
    "away_draw_ratio",
    "home_loss_ratio",
    "away_loss_ratio",
    "team_position",
];

static STANDARD: OnceCell<FeatureSet> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSet {
    pub player_exprs: Vec<ColumnExpr>,
    pub team_exprs: Vec<ColumnExpr>,
    pub player_features: Vec<String>,
    pub team_features: Vec<String>,
}

impl FeatureSet {
    pub fn new(
        player_exprs: &[&str],
        team_exprs: &[&str],
        player_features: &[&str],
        team_features: &[&str],
    ) -> std::result::Result<Self, ExprError> {
        Ok(Self {
            player_exprs: player_exprs
                .iter()
                .map(|e| ColumnExpr::parse(e))
                .collect::<std::result::Result<_, _>>()?,
            team_exprs: team_exprs
                .iter()
                .map(|e| ColumnExpr::parse(e))
                .collect::<std::result::Result<_, _>>()?,
            player_features: player_features.iter().map(|s| s.to_string()).collect(),
            team_features: team_features.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn standard() -> std::result::Result<&'static FeatureSet, ExprError> {
        STANDARD.get_or_try_init(|| {
            Self::new(PLAYER_EXPRESSIONS, TEAM_EXPRESSIONS, PLAYER_FEATURES, TEAM_FEATURES)
        })
    }

    pub fn columns(&self) -> Vec<String> {
        IDENTITY
            .iter()
            .map(|s| s.to_string())
            .chain(self.player_features.iter().cloned())
            .chain(self.team_features.iter().cloned())
            .chain(LABEL_COLUMNS.iter().map(|s| s.to_string()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TeamPositionOrder {
    /// Fewest points ranks 1.
    #[default]
    Ascending,
    /// Most points ranks 1, as in a league table.
    Descending,
}

impl TeamPositionOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }

    pub fn rank(self, points: &[f64]) -> Vec<f64> {
        let mut order: Vec<usize> = (0..points.len()).collect();
        match self {
            Self::Ascending => order.sort_by(|a, b| points[*a].total_cmp(&points[*b])),
            Self::Descending => order.sort_by(|a, b| points[*b].total_cmp(&points[*a])),
        }
        let mut ranks = vec![0.0; points.len()];
        for (rank, row) in order.into_iter().enumerate() {
            ranks[row] = (rank + 1) as f64;
        }
        ranks
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetOptions {
    pub seasons: Vec<Season>,
    pub gameweeks: GameweekRange,
    /// Players need strictly more minutes than this in the feature window.
    pub minutes_threshold: f64,
    pub label_window: u32,
    pub value_change_limit: f64,
    pub team_position_order: TeamPositionOrder,
    pub parallel: bool,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            seasons: vec![Season::new(17), Season::new(18)],
            gameweeks: GameweekRange::Span { start: 1, end: 10 },
            minutes_threshold: 0.0,
            label_window: 1,
            value_change_limit: DEFAULT_VALUE_CHANGE_LIMIT,
            team_position_order: TeamPositionOrder::Ascending,
            parallel: true,
        }
    }
}

impl DatasetOptions {
    pub fn label_range(&self) -> GameweekRange {
        self.gameweeks.following(self.label_window.max(1))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Flag(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonSummary {
    pub season: Season,
    pub fixtures: usize,
    pub label_fixtures: usize,
    pub teams: usize,
    pub players: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub summaries: Vec<SeasonSummary>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        self.rows.get(row)?.get(self.column_index(column)?)
    }

    pub fn find(&self, season: Season, team: &str, player: &str) -> Option<usize> {
        let season = season.to_string();
        self.rows.iter().position(|row| {
            row.first().and_then(Cell::as_text) == Some(season.as_str())
                && row.get(1).and_then(Cell::as_text) == Some(team)
                && row.get(2).and_then(Cell::as_text) == Some(player)
        })
    }

    pub fn string_rows(&self) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(self.columns.clone());
        out.extend(
            self.rows
                .iter()
                .map(|row| row.iter().map(Cell::to_string).collect()),
        );
        out
    }
}

struct SeasonRows {
    rows: Vec<Vec<Cell>>,
    summary: SeasonSummary,
}

pub fn build_dataset<S: FixtureStore + ?Sized>(
    store: &S,
    schema: &Schema,
    features: &FeatureSet,
    opts: &DatasetOptions,
) -> Result<Dataset> {
    let columns = features.columns();
    let mut seen = HashSet::new();
    for column in &columns {
        if !seen.insert(column.as_str()) {
            bail!("dataset column {column} appears more than once");
        }
    }

    let run = |season: &Season| build_season(store, schema, features, opts, *season);
    let per_season: Vec<Result<SeasonRows>> = if opts.parallel && opts.seasons.len() > 1 {
        with_season_pool(opts.seasons.len(), || opts.seasons.par_iter().map(run).collect())
    } else {
        opts.seasons.iter().map(run).collect()
    };

    let mut dataset = Dataset {
        columns,
        ..Dataset::default()
    };
    for season in per_season {
        let season = season?;
        dataset.rows.extend(season.rows);
        dataset.summaries.push(season.summary);
    }
    Ok(dataset)
}

fn with_season_pool<T>(seasons: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    let threads = seasons.clamp(1, 8);
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}

fn build_season<S: FixtureStore + ?Sized>(
    store: &S,
    schema: &Schema,
    features: &FeatureSet,
    opts: &DatasetOptions,
    season: Season,
) -> Result<SeasonRows> {
    let inputs = SeasonInputs::load(store, season)
        .with_context(|| format!("failed loading season {season}"))?;
    let guard = ValueChangeGuard::new(opts.value_change_limit);

    let mut x = aggregate(store, &inputs, schema, &Scope::gameweeks(opts.gameweeks), &guard)
        .with_context(|| format!("failed aggregating {season} gameweeks {:?}", opts.gameweeks))?;

    let label_range = opts.label_range();
    let labels = match aggregate(store, &inputs, schema, &Scope::gameweeks(label_range), &guard) {
        Ok(labels) => Some(labels),
        Err(AggregateError::EmptyResult { .. }) => {
            warn!(season = %season, window = ?label_range, "no fixtures in label window; labels left at 0");
            None
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed aggregating {season} labels {label_range:?}"));
        }
    };

    let mut team_table = x.teams_stats.to_table();
    expr::apply_all(&features.team_exprs, &mut team_table)
        .with_context(|| format!("team expressions for {season}"))?;
    let points = team_table.column("pts").unwrap_or_default();
    team_table.set_column("team_position", &opts.team_position_order.rank(&points));

    let season_label = season.to_string();
    let mut rows = Vec::new();
    let team_names: Vec<String> = x.teams_stats.teams().to_vec();
    for (team_row, team) in team_names.iter().enumerate() {
        let Some(tables) = x.teams.get_mut(team) else {
            continue;
        };
        let players = &mut tables.player_stats;
        expr::apply_all(&features.player_exprs, &mut players.stats)
            .with_context(|| format!("player expressions for {team} {season}"))?;

        let team_cells = team_features(&team_table, team_row, &features.team_features)
            .with_context(|| format!("team features for {team} {season}"))?;
        let minutes = players.stats.column("minutes").unwrap_or_else(|| vec![0.0; players.len()]);

        for (row, player) in players.players.iter().enumerate() {
            if minutes[row] <= opts.minutes_threshold {
                continue;
            }
            let mut cells = vec![
                Cell::Text(season_label.clone()),
                Cell::Text(team.clone()),
                Cell::Text(player.clone()),
            ];
            cells.extend(
                player_features(players, row, &features.player_features)
                    .with_context(|| format!("player features for {player} ({team} {season})"))?,
            );
            cells.extend(team_cells.iter().cloned());
            cells.extend(label_cells(labels.as_ref(), team, player));
            rows.push(cells);
        }
    }

    let summary = SeasonSummary {
        season,
        fixtures: x.played_fixtures.len(),
        label_fixtures: labels.as_ref().map_or(0, |l| l.played_fixtures.len()),
        teams: x.teams.len(),
        players: rows.len(),
    };
    info!(
        season = %season,
        fixtures = summary.fixtures,
        label_fixtures = summary.label_fixtures,
        players = summary.players,
        "season rows built"
    );
    Ok(SeasonRows { rows, summary })
}

fn player_features(table: &PlayerTable, row: usize, columns: &[String]) -> Result<Vec<Cell>> {
    columns
        .iter()
        .map(|column| match column.as_str() {
            "age" => Ok(Cell::Number(age_years(table.ages[row].as_deref()))),
            "place" => Ok(Cell::Text(Place::classify(&table.positions[row]).to_string())),
            other => match table.stats.get(row, other) {
                Some(v) => Ok(Cell::Number(v)),
                None => bail!("player column {other} does not exist"),
            },
        })
        .collect()
}

fn team_features(table: &Table, row: usize, columns: &[String]) -> Result<Vec<Cell>> {
    columns
        .iter()
        .map(|column| match table.get(row, column) {
            Some(v) => Ok(Cell::Number(v)),
            None => bail!("team column {column} does not exist"),
        })
        .collect()
}

fn label_cells(labels: Option<&SeasonAggregate>, team: &str, player: &str) -> Vec<Cell> {
    let stat = |column: &str| {
        labels
            .and_then(|l| l.teams.get(team))
            .and_then(|t| t.player_stats.get(player, column))
            .unwrap_or(0.0)
    };
    let team_stat = |column: &str| {
        labels
            .and_then(|l| l.teams_stats.get(team))
            .and_then(|r| r.numeric(column))
            .unwrap_or(0.0)
    };
    let goals = stat("goals");
    let assists = stat("assists");
    let minutes = stat("minutes");
    vec![
        Cell::Number(goals),
        Cell::Number(assists),
        Cell::Number(stat("appearances")),
        Cell::Number(stat("starts")),
        Cell::Number(stat("cards_yellow")),
        Cell::Number(stat("cards_red")),
        Cell::Number(minutes),
        Cell::Flag(minutes >= 60.0),
        Cell::Flag(goals >= 1.0),
        Cell::Flag(goals >= 2.0),
        Cell::Flag(goals >= 3.0),
        Cell::Flag(goals > 3.0),
        Cell::Flag(assists >= 1.0),
        Cell::Flag(assists >= 2.0),
        Cell::Flag(assists >= 3.0),
        Cell::Flag(assists > 3.0),
        Cell::Flag(minutes > 60.0),
        Cell::Number(team_stat("conceded_2_plus")),
        Cell::Number(team_stat("cleansheets")),
    ]
}

/// `"25-123"` (years-days) to 25; missing or unparsable ages are 0.
pub fn age_years(raw: Option<&str>) -> f64 {
    raw.and_then(|age| age.split('-').next())
        .and_then(|years| years.trim().parse::<u32>().ok())
        .map_or(0.0, f64::from)
}
