#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::NaiveDate;

use pl_features::fantasy::{FantasyGameweek, FantasyRecord};
use pl_features::fixtures::{Fixture, Score, Season};
use pl_features::match_info::MatchInfo;
use pl_features::roster::{Squad, TeamRoster};
use pl_features::schema::Schema;
use pl_features::sheet::StatSheet;
use pl_features::store::MemoryStore;

pub const OUTFIELD: [&str; 12] = [
    "player",
    "position",
    "age",
    "minutes",
    "goals",
    "assists",
    "cards_yellow",
    "cards_red",
    "cards_yellow_red",
    "passes_completed",
    "passes",
    "passes_pct",
];

pub const GOALKEEPER: [&str; 6] = ["player", "age", "minutes", "saves", "shots_on_target_against", "save_pct"];

pub fn schema() -> Schema {
    Schema::new(
        OUTFIELD.iter().map(|s| s.to_string()).collect(),
        GOALKEEPER.iter().map(|s| s.to_string()).collect(),
    )
}

#[derive(Debug, Clone, Copy)]
pub struct Line {
    pub player: &'static str,
    pub position: &'static str,
    pub age: &'static str,
    pub minutes: u32,
    pub goals: u32,
    pub assists: u32,
    pub yellow: u32,
    pub red: u32,
}

pub fn line(player: &'static str, position: &'static str, age: &'static str, minutes: u32) -> Line {
    Line {
        player,
        position,
        age,
        minutes,
        goals: 0,
        assists: 0,
        yellow: 0,
        red: 0,
    }
}

impl Line {
    pub fn goals(mut self, goals: u32) -> Self {
        self.goals = goals;
        self
    }

    pub fn assists(mut self, assists: u32) -> Self {
        self.assists = assists;
        self
    }

    pub fn yellow(mut self) -> Self {
        self.yellow = 1;
        self
    }

    pub fn red(mut self) -> Self {
        self.red = 1;
        self
    }
}

pub fn sheet(artifact: &str, lines: &[Line]) -> StatSheet {
    let rows = lines
        .iter()
        .map(|l| {
            vec![
                l.player.to_string(),
                l.position.to_string(),
                l.age.to_string(),
                l.minutes.to_string(),
                l.goals.to_string(),
                l.assists.to_string(),
                l.yellow.to_string(),
                l.red.to_string(),
                String::new(),
                "30".to_string(),
                "40".to_string(),
                "75.0".to_string(),
            ]
        })
        .collect();
    StatSheet::from_rows(artifact, OUTFIELD.iter().map(|s| s.to_string()).collect(), rows)
        .expect("rows match the outfield header")
}

pub fn gk_sheet(artifact: &str, player: &str, age: &str, saves: u32, against: u32) -> StatSheet {
    let row = vec![
        player.to_string(),
        age.to_string(),
        "90".to_string(),
        saves.to_string(),
        against.to_string(),
        String::new(),
    ];
    StatSheet::from_rows(artifact, GOALKEEPER.iter().map(|s| s.to_string()).collect(), vec![row])
        .expect("row matches the goalkeeper header")
}

fn manager(team: &str) -> &'static str {
    match team {
        "Arsenal" => "Arsène Wenger",
        _ => "Antonio Conte",
    }
}

pub fn match_info(fixture: &Fixture, formations: (&str, &str), subs: &[(&str, &str, &str)]) -> MatchInfo {
    let mut formation_map = serde_json::Map::new();
    formation_map.insert(fixture.home.clone(), formations.0.into());
    formation_map.insert(fixture.away.clone(), formations.1.into());
    let mut substitutes: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for (team, off, on) in subs {
        substitutes
            .entry(team.to_string())
            .or_default()
            .insert(off.to_string(), on.to_string());
    }
    MatchInfo {
        managers_captains: vec![
            format!("Manager: {}", manager(&fixture.home)),
            "Captain: Home Captain".to_string(),
            format!("Manager: {}", manager(&fixture.away)),
            "Captain: Away Captain".to_string(),
        ],
        score_xgs: vec!["1.5".to_string(), "0.5".to_string()],
        formations: formation_map,
        possession: vec!["55".to_string(), "45%".to_string()],
        substitutes,
    }
}

pub fn fixture(season: Season, gameweek: u32, day: u32, home: &str, away: &str, score: (u32, u32)) -> Fixture {
    Fixture {
        season,
        gameweek,
        date: NaiveDate::from_ymd_opt(2000 + season.start() as i32, 8, day).expect("valid date"),
        home: home.to_string(),
        away: away.to_string(),
        score: Score {
            home: score.0,
            away: score.1,
        },
        report_link: None,
    }
}

pub fn roster() -> TeamRoster {
    let mut roster = TeamRoster::default();
    roster.insert(
        "Arsenal",
        Squad {
            outfield: vec!["Mesut Özil".into(), "Alex Iwobi".into()],
            goalkeeper: vec!["Petr Cech".into()],
        },
    );
    roster.insert(
        "Chelsea",
        Squad {
            outfield: vec!["N'Golo Kanté".into(), "Eden Hazard".into()],
            goalkeeper: vec!["Thibaut Courtois".into()],
        },
    );
    roster
}

fn fantasy(gameweek: u32, rows: &[(&str, f64, f64)]) -> FantasyGameweek {
    FantasyGameweek {
        gameweek,
        records: rows
            .iter()
            .map(|(name, influence, value)| FantasyRecord {
                name: name.to_string(),
                influence: *influence,
                total_points: 2.0,
                value: *value,
                ..Default::default()
            })
            .collect(),
    }
}

/// Three gameweeks between Arsenal and Chelsea:
/// gw1 Arsenal 2–0 Chelsea, gw2 Chelsea 1–1 Arsenal, gw3 Arsenal 0–3 Chelsea.
pub fn add_season(store: &mut MemoryStore, season: Season) {
    let f1 = fixture(season, 1, 12, "Arsenal", "Chelsea", (2, 0));
    let f2 = fixture(season, 2, 19, "Chelsea", "Arsenal", (1, 1));
    let f3 = fixture(season, 3, 26, "Arsenal", "Chelsea", (0, 3));
    store.insert_season(season, vec![f1.clone(), f2.clone(), f3.clone()], roster());

    store.insert_team_sheets(
        &f1,
        "Arsenal",
        sheet(
            "gw1 Arsenal",
            &[
                line("Mesut Özil", "AM", "28-300", 90).goals(1).assists(1),
                line("Alex Iwobi", "LW", "21-120", 25).goals(1),
                line("Alexandre Lacazette", "FW", "26-80", 65),
                line("Petr Cech", "GK", "35-60", 90),
            ],
        ),
        gk_sheet("gw1 Arsenal gk", "Petr Cech", "35-60", 3, 3),
    );
    store.insert_team_sheets(
        &f1,
        "Chelsea",
        sheet(
            "gw1 Chelsea",
            &[
                line("Eden Hazard", "LW", "26-200", 90).yellow(),
                line("N'Golo Kanté", "CM", "26-150", 90),
                line("Thibaut Courtois", "GK", "25-90", 90),
            ],
        ),
        gk_sheet("gw1 Chelsea gk", "Thibaut Courtois", "25-90", 1, 3),
    );
    store.insert_match_info(
        &f1,
        match_info(&f1, ("3-4-2-1", "3-4-3"), &[("Arsenal", "Alexandre Lacazette", "Alex Iwobi")]),
    );

    store.insert_team_sheets(
        &f2,
        "Chelsea",
        sheet(
            "gw2 Chelsea",
            &[
                line("Eden Hazard", "LW", "26-207", 90).goals(1),
                line("N'Golo Kanté", "CM,DM", "26-157", 60).red(),
                line("Thibaut Courtois", "GK", "25-97", 90),
            ],
        ),
        gk_sheet("gw2 Chelsea gk", "Thibaut Courtois", "25-97", 2, 3),
    );
    store.insert_team_sheets(
        &f2,
        "Arsenal",
        sheet(
            "gw2 Arsenal",
            &[
                line("Mesut Özil", "AM", "28-307", 90).assists(1),
                line("Alex Iwobi", "LW", "21-127", 90).goals(1).yellow(),
                line("Petr Cech", "GK", "35-67", 90),
            ],
        ),
        gk_sheet("gw2 Arsenal gk", "Petr Cech", "35-67", 4, 5),
    );
    store.insert_match_info(
        &f2,
        match_info(&f2, ("3-4-3", "4-2-3-1"), &[("Chelsea", "N'Golo Kanté", "Pedro")]),
    );

    store.insert_team_sheets(
        &f3,
        "Arsenal",
        sheet(
            "gw3 Arsenal",
            &[
                line("Mesut Özil", "CM", "28-314", 70),
                line("Petr Cech", "GK", "35-74", 90),
            ],
        ),
        gk_sheet("gw3 Arsenal gk", "Petr Cech", "35-74", 2, 5),
    );
    store.insert_team_sheets(
        &f3,
        "Chelsea",
        sheet(
            "gw3 Chelsea",
            &[
                line("Eden Hazard", "LW", "26-214", 90).goals(2).assists(1),
                line("N'Golo Kanté", "CM", "26-164", 90).goals(1),
                line("Thibaut Courtois", "GK", "25-104", 90),
            ],
        ),
        gk_sheet("gw3 Chelsea gk", "Thibaut Courtois", "25-104", 0, 0),
    );
    store.insert_match_info(&f3, match_info(&f3, ("3-4-2-1", "3-4-3"), &[]));

    store.insert_fantasy(
        season,
        fantasy(1, &[("Mesut Özil", 30.0, 85.0), ("Eden Hazard", 40.0, 105.0), ("Alex Iwobi", 8.0, 55.0)]),
    );
    store.insert_fantasy(
        season,
        fantasy(
            2,
            &[
                ("Mesut Özil", 10.0, 86.0),
                ("Eden Hazard", 25.0, 105.0),
                ("Alex Iwobi", 12.0, 56.0),
                ("Alex Iwobi", 3.0, 45.0),
            ],
        ),
    );
    store.insert_fantasy(season, fantasy(3, &[("Mesut Özil", 5.0, 84.0), ("Eden Hazard", 50.0, 106.0)]));
}

pub fn season_store(seasons: &[Season]) -> MemoryStore {
    let mut store = MemoryStore::new();
    for season in seasons {
        add_season(&mut store, *season);
    }
    store
}
