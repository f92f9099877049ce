mod common;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use pl_features::aggregate::{SeasonInputs, aggregate};
use pl_features::dataset::{DatasetOptions, FeatureSet, build_dataset};
use pl_features::error::AggregateError;
use pl_features::fixtures::{Fixture, Score, Season};
use pl_features::metrics::ValueChangeGuard;
use pl_features::scope::{GameweekRange, Scope};
use pl_features::sheet::StatSheet;
use pl_features::store::{FixtureStore, FsStore, MemoryStore};

fn data_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("data");
    path
}

fn store() -> FsStore {
    FsStore::new(data_dir())
}

#[test]
fn schema_is_read_from_grouped_headers() {
    let schema = store().schema().expect("header files should parse");
    assert_eq!(schema, common::schema());
}

#[test]
fn fixture_list_keeps_played_rows() {
    let fixtures = store().fixtures(Season::new(17)).expect("fixture csv should parse");
    assert_eq!(fixtures.len(), 2);
    assert_eq!(fixtures[0].report_name(), "Arsenal v Chelsea");
    assert_eq!(fixtures[0].score, Score { home: 2, away: 0 });
    assert_eq!(fixtures[1].gameweek, 2);
    assert_eq!(
        fixtures[1].report_link.as_deref(),
        Some("/en/matches/bbb/Chelsea-Arsenal")
    );
}

#[test]
fn per_fixture_artifacts_load() {
    let store = store();
    let fixtures = store.fixtures(Season::new(17)).expect("fixtures");
    let sheet = store.team_sheet(&fixtures[1], "Chelsea").expect("team sheet");
    let kante = sheet.row("N'Golo Kanté").expect("kante row");
    assert_eq!(kante.text("position"), Some("CM,DM"));
    assert_eq!(kante.number("cards_red").expect("red"), 1.0);

    let info = store.match_info(&fixtures[0]).expect("match info");
    assert!(info.substitutions("Arsenal").came_on("Alex Iwobi"));

    let roster = store.roster(Season::new(17)).expect("roster");
    assert_eq!(roster.team_names(), vec!["Arsenal", "Chelsea"]);
}

#[test]
fn latin1_fantasy_names_match_the_roster() {
    let gw = store().fantasy_gameweek(Season::new(17), 1).expect("gw1 csv");
    let ozil = gw.lookup("Mesut Özil").expect("decoded and renamed");
    assert_eq!(ozil.influence, 30.0);
    assert_eq!(ozil.value, 85.0);
    assert!(gw.lookup("Mesut_Özil").is_none());
}

#[test]
fn season_aggregates_from_disk() {
    let store = store();
    let schema = store.schema().expect("schema");
    let inputs = SeasonInputs::load(&store, Season::new(17)).expect("inputs");
    let agg = aggregate(&store, &inputs, &schema, &Scope::all(), &ValueChangeGuard::default())
        .expect("aggregate");

    let arsenal = agg.teams_stats.get("Arsenal").expect("arsenal");
    assert_eq!((arsenal.pts, arsenal.goals_for, arsenal.goals_against), (4, 3, 1));
    assert_eq!(arsenal.pct_possession, 100.0);
    assert_eq!(arsenal.form.to_string(), "WD");

    let players = &agg.teams["Arsenal"].player_stats;
    assert_eq!(players.get("Mesut Özil", "influence"), Some(40.0));
    assert_eq!(players.get("Mesut Özil", "total_points"), Some(9.0));
    assert_eq!(players.get("Mesut Özil", "value_change"), Some(1.0));
    assert_eq!(players.get("Alex Iwobi", "value_change"), Some(1.0));

    let chelsea = &agg.teams["Chelsea"];
    let kante = chelsea.player_stats.row_of("N'Golo Kanté").expect("kante");
    assert_eq!(chelsea.player_stats.positions[kante].to_string(), "CM:2;DM:1");
    assert_eq!(chelsea.gk_stats.get("Thibaut Courtois", "save_pct"), Some(0.5));
}

#[test]
fn missing_report_folder_is_reported_with_its_path() {
    let store = store();
    let mut fixture: Fixture = store.fixtures(Season::new(17)).expect("fixtures").remove(0);
    fixture.away = "Everton".to_string();
    let err = store.team_sheet(&fixture, "Everton").unwrap_err();
    match err {
        AggregateError::MissingArtifact { path, .. } => {
            assert!(path.ends_with("gw1/Arsenal v Everton/Everton stats.csv"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn dataset_over_disk_store() {
    let store = store();
    let schema = store.schema().expect("schema");
    let features = FeatureSet::new(
        &["minutes_per_goal = minutes / goals"],
        &["pts_per_game = pts / matches_played"],
        &["age", "place", "minutes_per_goal"],
        &["pts_per_game", "team_position"],
    )
    .expect("features");
    let opts = DatasetOptions {
        seasons: vec![Season::new(17)],
        gameweeks: GameweekRange::Single(1),
        ..DatasetOptions::default()
    };
    let dataset = build_dataset(&store, &schema, &features, &opts).expect("dataset");
    assert_eq!(dataset.summaries[0].fixtures, 1);
    assert_eq!(dataset.summaries[0].label_fixtures, 1);

    let iwobi = dataset.find(Season::new(17), "Arsenal", "Alex Iwobi").expect("iwobi");
    assert_eq!(dataset.cell(iwobi, "minutes_per_goal").and_then(|c| c.as_number()), Some(25.0));
    assert_eq!(dataset.cell(iwobi, "goals").and_then(|c| c.as_number()), Some(1.0));
    assert_eq!(dataset.cell(iwobi, "played_60").and_then(|c| c.as_number()), Some(1.0));
}

fn pairing(gameweek: u32, day: u32) -> Fixture {
    Fixture {
        season: Season::new(17),
        gameweek,
        date: NaiveDate::from_ymd_opt(2017, 8, day).expect("valid date"),
        home: "Arsenal".to_string(),
        away: "Chelsea".to_string(),
        score: Score { home: 1, away: 0 },
        report_link: None,
    }
}

fn minutes_sheet(artifact: &str, minutes: &str) -> StatSheet {
    StatSheet::from_rows(
        artifact,
        vec!["player".to_string(), "minutes".to_string()],
        vec![vec!["Mesut Özil".to_string(), minutes.to_string()]],
    )
    .expect("sheet")
}

fn ozil_minutes(sheet: &StatSheet) -> f64 {
    sheet
        .row("Mesut Özil")
        .expect("ozil row")
        .number("minutes")
        .expect("minutes")
}

#[test]
fn memory_store_keeps_repeated_pairings_apart() {
    let (first, third) = (pairing(1, 12), pairing(3, 26));
    let mut store = MemoryStore::new();
    store.insert_team_sheets(&first, "Arsenal", minutes_sheet("gw1", "90"), minutes_sheet("gw1 gk", "90"));
    store.insert_team_sheets(&third, "Arsenal", minutes_sheet("gw3", "70"), minutes_sheet("gw3 gk", "90"));

    assert_eq!(ozil_minutes(&store.team_sheet(&first, "Arsenal").expect("gw1 sheet")), 90.0);
    assert_eq!(ozil_minutes(&store.team_sheet(&third, "Arsenal").expect("gw3 sheet")), 70.0);
    assert_eq!(store.goalkeeper_sheet(&third, "Arsenal").expect("gw3 gk").artifact(), "gw3 gk");
    assert!(store.team_sheet(&pairing(5, 30), "Arsenal").is_err());
}

fn write_report(root: &Path, gameweek: u32, minutes: u32) {
    let dir = root
        .join("Premier League")
        .join("reports")
        .join("2017-2018")
        .join(format!("gw{gameweek}"))
        .join("Arsenal v Chelsea");
    fs::create_dir_all(&dir).expect("report dir");
    fs::write(dir.join("Arsenal stats.csv"), format!("player,minutes\nMesut Özil,{minutes}\n"))
        .expect("write sheet");
}

#[test]
fn fs_store_reads_repeated_pairings_from_gameweek_folders() {
    let root = std::env::temp_dir().join(format!("pl_features_store_{}", std::process::id()));
    write_report(&root, 1, 90);
    write_report(&root, 3, 70);

    let store = FsStore::new(root.clone());
    let first = store.team_sheet(&pairing(1, 12), "Arsenal").expect("gw1 sheet");
    let third = store.team_sheet(&pairing(3, 26), "Arsenal").expect("gw3 sheet");
    assert_eq!(ozil_minutes(&first), 90.0);
    assert_eq!(ozil_minutes(&third), 70.0);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn header_schema_is_optional_only_when_absent() {
    let root = std::env::temp_dir().join(format!("pl_features_headers_{}", std::process::id()));
    let store = FsStore::new(root.clone());
    assert!(store.header_schema().expect("absent headers are not an error").is_none());

    let dir = root.join("Premier League").join("header information");
    fs::create_dir_all(&dir).expect("header dir");
    fs::write(dir.join("headers.json"), "{\"summary\": 3}").expect("write headers");
    let err = store.header_schema().unwrap_err();
    assert!(matches!(err, AggregateError::MalformedArtifact { .. }));

    let _ = fs::remove_dir_all(&root);
    assert_eq!(FsStore::new(data_dir()).header_schema().expect("fixture headers"), Some(common::schema()));
}
