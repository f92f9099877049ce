use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

pub const IDENTITY_COLUMNS: [&str; 3] = ["player", "position", "age"];

pub const APPEARANCE_EXTRAS: [&str; 5] = ["appearances", "starts", "sub_ins", "sub_outs", "played_60"];

pub const FANTASY_ADDITIVE: [&str; 10] = [
    "influence",
    "creativity",
    "threat",
    "ict_index",
    "total_points",
    "transfers_balance",
    "transfers_in",
    "transfers_out",
    "bonus",
    "bps",
];

pub const VALUE: &str = "value";
pub const VALUE_CHANGE: &str = "value_change";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioMetric {
    pub column: String,
    pub numerator: Vec<String>,
    pub denominator: Vec<String>,
}

impl RatioMetric {
    pub fn new(column: &str, numerator: &[&str], denominator: &[&str]) -> Self {
        Self {
            column: column.to_string(),
            numerator: numerator.iter().map(|s| s.to_string()).collect(),
            denominator: denominator.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub version: u32,
    pub outfield: Vec<String>,
    pub goalkeeper: Vec<String>,
    pub ratios: Vec<RatioMetric>,
    pub goalkeeper_ratios: Vec<RatioMetric>,
}

impl Schema {
    pub fn new(outfield: Vec<String>, goalkeeper: Vec<String>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            outfield,
            goalkeeper,
            ratios: default_ratios(),
            goalkeeper_ratios: default_goalkeeper_ratios(),
        }
    }

    pub fn from_header_groups<I, G>(groups: I, goalkeeper: Vec<String>) -> Self
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = String>,
    {
        let mut outfield = Vec::new();
        for group in groups {
            for column in group {
                if !outfield.contains(&column) {
                    outfield.push(column);
                }
            }
        }
        Self::new(outfield, goalkeeper)
    }

    pub fn premier_league() -> Self {
        Self::new(
            PREMIER_LEAGUE_OUTFIELD.iter().map(|s| s.to_string()).collect(),
            PREMIER_LEAGUE_GOALKEEPER.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn is_identity(column: &str) -> bool {
        IDENTITY_COLUMNS.contains(&column)
    }

    pub fn is_ratio(&self, column: &str) -> bool {
        self.ratios.iter().any(|r| r.column == column)
    }

    pub fn is_goalkeeper_ratio(&self, column: &str) -> bool {
        self.goalkeeper_ratios.iter().any(|r| r.column == column)
    }

    pub fn accumulated_columns(&self) -> impl Iterator<Item = &str> {
        self.outfield
            .iter()
            .map(String::as_str)
            .filter(|c| !Self::is_identity(c) && !self.is_ratio(c))
    }

    pub fn goalkeeper_accumulated_columns(&self) -> impl Iterator<Item = &str> {
        self.goalkeeper
            .iter()
            .map(String::as_str)
            .filter(|c| !Self::is_identity(c) && !self.is_goalkeeper_ratio(c))
    }

    pub fn player_columns(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .outfield
            .iter()
            .filter(|c| !Self::is_identity(c))
            .cloned()
            .collect();
        let extras = APPEARANCE_EXTRAS
            .iter()
            .chain(FANTASY_ADDITIVE.iter())
            .chain([VALUE, VALUE_CHANGE].iter());
        for extra in extras {
            if !out.iter().any(|c| c == extra) {
                out.push(extra.to_string());
            }
        }
        out
    }

    pub fn goalkeeper_columns(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .goalkeeper
            .iter()
            .filter(|c| !Self::is_identity(c))
            .cloned()
            .collect();
        if !out.iter().any(|c| c == "appearances") {
            out.push("appearances".to_string());
        }
        out
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::premier_league()
    }
}

fn default_ratios() -> Vec<RatioMetric> {
    vec![
        RatioMetric::new("aerials_won_pct", &["aerials_won"], &["aerials_won", "aerials_lost"]),
        RatioMetric::new(
            "dribble_tackles_pct",
            &["dribble_tackles"],
            &["dribble_tackles", "dribbled_past"],
        ),
        RatioMetric::new("dribbles_completed_pct", &["dribbles_completed"], &["dribbles"]),
        RatioMetric::new("passes_pct", &["passes_completed"], &["passes"]),
        RatioMetric::new("passes_pct_short", &["passes_completed_short"], &["passes_short"]),
        RatioMetric::new("passes_pct_medium", &["passes_completed_medium"], &["passes_medium"]),
        RatioMetric::new("passes_pct_long", &["passes_completed_long"], &["passes_long"]),
        RatioMetric::new("passes_received_pct", &["passes_received"], &["pass_targets"]),
        RatioMetric::new("pressure_regain_pct", &["pressure_regains"], &["pressures"]),
    ]
}

fn default_goalkeeper_ratios() -> Vec<RatioMetric> {
    vec![
        RatioMetric::new("save_pct", &["saves"], &["shots_on_target_against"]),
        RatioMetric::new("crosses_stopped_pct_gk", &["crosses_stopped_gk"], &["crosses_gk"]),
        RatioMetric::new(
            "passes_pct_launched",
            &["passes_completed_launched"],
            &["passes_launched"],
        ),
    ]
}

pub const PREMIER_LEAGUE_OUTFIELD: [&str; 111] = [
    "player",
    "position",
    "age",
    "minutes",
    "cards_yellow",
    "cards_red",
    "cards_yellow_red",
    "fouls",
    "fouled",
    "offsides",
    "pens_won",
    "pens_conceded",
    "own_goals",
    "ball_recoveries",
    "aerials_won",
    "aerials_lost",
    "aerials_won_pct",
    "passes_completed",
    "passes",
    "passes_pct",
    "passes_total_distance",
    "passes_progressive_distance",
    "passes_completed_short",
    "passes_short",
    "passes_pct_short",
    "passes_completed_medium",
    "passes_medium",
    "passes_pct_medium",
    "passes_completed_long",
    "passes_long",
    "passes_pct_long",
    "assisted_shots",
    "passes_into_final_third",
    "passes_into_penalty_area",
    "crosses_into_penalty_area",
    "progressive_passes",
    "passes_live",
    "passes_dead",
    "passes_free_kicks",
    "through_balls",
    "passes_pressure",
    "passes_switches",
    "crosses",
    "corner_kicks",
    "passes_ground",
    "passes_low",
    "passes_high",
    "passes_head",
    "throw_ins",
    "passes_other_body",
    "passes_offsides",
    "passes_oob",
    "passes_intercepted",
    "passes_blocked",
    "tackles",
    "tackles_won",
    "tackles_def_3rd",
    "tackles_mid_3rd",
    "tackles_att_3rd",
    "dribble_tackles",
    "dribbles_vs",
    "dribble_tackles_pct",
    "dribbled_past",
    "pressures",
    "pressure_regains",
    "pressure_regain_pct",
    "pressures_def_3rd",
    "pressures_mid_3rd",
    "pressures_att_3rd",
    "blocks",
    "blocked_shots",
    "blocked_shots_saves",
    "blocked_passes",
    "interceptions",
    "tackles_interceptions",
    "clearances",
    "errors",
    "goals",
    "assists",
    "pens_made",
    "pens_att",
    "shots_total",
    "shots_on_target",
    "xg",
    "npxg",
    "xa",
    "sca",
    "gca",
    "touches",
    "touches_def_pen_area",
    "touches_def_3rd",
    "touches_mid_3rd",
    "touches_att_3rd",
    "touches_att_pen_area",
    "touches_live_ball",
    "dribbles_completed",
    "dribbles",
    "dribbles_completed_pct",
    "players_dribbled_past",
    "carries",
    "carry_distance",
    "carry_progressive_distance",
    "progressive_carries",
    "carries_into_final_third",
    "carries_into_penalty_area",
    "miscontrols",
    "dispossessed",
    "pass_targets",
    "passes_received",
    "passes_received_pct",
    "progressive_passes_received",
];

pub const PREMIER_LEAGUE_GOALKEEPER: [&str; 16] = [
    "player",
    "age",
    "minutes",
    "shots_on_target_against",
    "goals_against_gk",
    "saves",
    "save_pct",
    "psxg_gk",
    "passes_completed_launched",
    "passes_launched",
    "passes_pct_launched",
    "passes_throws",
    "goal_kicks",
    "crosses_gk",
    "crosses_stopped_gk",
    "crosses_stopped_pct_gk",
];
