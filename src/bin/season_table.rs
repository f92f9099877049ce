use anyhow::{Context, Result, anyhow};

use pl_features::aggregate::{SeasonInputs, aggregate};
use pl_features::config::{BuildConfig, flag_value, split_list};
use pl_features::fixtures::Season;
use pl_features::metrics::ValueChangeGuard;
use pl_features::position::Place;
use pl_features::schema::Schema;
use pl_features::scope::{Scope, ScopeFilter};
use pl_features::store::FsStore;

const SCOPE_FLAGS: [(&str, &str); 6] = [
    ("home", "home"),
    ("away", "away"),
    ("team", "team"),
    ("dates", "date_range"),
    ("matches", "match_range"),
    ("gameweeks", "gameweek_range"),
];

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut config = BuildConfig::from_env();
    if let Some(dir) = flag_value(&args, "data-dir") {
        config.data_dir = dir.into();
    }
    let season = match flag_value(&args, "season") {
        Some(raw) => Season::parse(&raw).ok_or_else(|| anyhow!("invalid season {raw:?}"))?,
        None => config
            .options
            .seasons
            .first()
            .copied()
            .unwrap_or_else(|| Season::new(17)),
    };
    let scope = parse_scope(&args)?;

    let store = FsStore::new(&config.data_dir);
    let schema = store
        .header_schema()
        .context("failed reading header schema")?
        .unwrap_or_else(Schema::premier_league);
    let inputs = SeasonInputs::load(&store, season)
        .with_context(|| format!("failed loading season {season}"))?;
    let guard = ValueChangeGuard::new(config.options.value_change_limit);
    let agg = aggregate(&store, &inputs, &schema, &scope, &guard)?;

    println!("Season {season}: {} fixtures", agg.played_fixtures.len());
    println!(
        "{:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>3} {:>6} {:>5}  {:<5} {}",
        "Team", "MP", "W", "D", "L", "GF", "GA", "Pts", "CS", "xG", "Poss", "Form", "Managers"
    );
    for (team, record) in agg.teams_stats.iter() {
        let possession = if record.matches_played > 0 {
            record.pct_possession / record.matches_played as f64
        } else {
            0.0
        };
        println!(
            "{:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>3} {:>6.2} {:>5.1}  {:<5} {}",
            team,
            record.matches_played,
            record.wins,
            record.draws,
            record.losses,
            record.goals_for,
            record.goals_against,
            record.pts,
            record.cleansheets,
            record.xg,
            possession,
            record.form.to_string(),
            record.managers.join(", ")
        );
    }

    if let Some(team) = flag_value(&args, "players") {
        let tables = agg
            .teams
            .get(&team)
            .ok_or_else(|| anyhow!("{team} has no rows in this scope"))?;
        let players = &tables.player_stats;
        println!();
        println!(
            "{:<28} {:<11} {:>4} {:>4} {:>6} {:>3} {:>3}  {}",
            "Player", "Place", "Apps", "GS", "Min", "G", "A", "Positions"
        );
        for (row, player) in players.players.iter().enumerate() {
            let stat = |column: &str| players.stats.get(row, column).unwrap_or(0.0);
            if stat("appearances") == 0.0 {
                continue;
            }
            println!(
                "{:<28} {:<11} {:>4} {:>4} {:>6} {:>3} {:>3}  {}",
                player,
                Place::classify(&players.positions[row]).as_str(),
                stat("appearances"),
                stat("starts"),
                stat("minutes"),
                stat("goals"),
                stat("assists"),
                players.positions[row]
            );
        }
    }

    Ok(())
}

fn parse_scope(args: &[String]) -> Result<Scope> {
    let mut scope = Scope::all();
    for (idx, arg) in args.iter().enumerate() {
        let Some(flag) = arg.strip_prefix("--") else {
            continue;
        };
        let (name, inline) = match flag.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (flag, None),
        };
        let value = || {
            inline
                .clone()
                .or_else(|| args.get(idx + 1).cloned())
                .ok_or_else(|| anyhow!("--{name} needs a value"))
        };
        let (key, raw) = if name == "where" {
            let raw = value()?;
            let (key, values) = raw
                .split_once('=')
                .ok_or_else(|| anyhow!("--where expects key=values, got {raw:?}"))?;
            (key.trim().to_string(), values.to_string())
        } else if let Some((_, key)) = SCOPE_FLAGS.iter().find(|(f, _)| *f == name) {
            (key.to_string(), value()?)
        } else {
            continue;
        };
        let values = split_list(&raw);
        let values: Vec<&str> = values.iter().map(String::as_str).collect();
        scope = scope.with(ScopeFilter::from_option(&key, &values)?);
    }
    Ok(scope)
}
