use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{AggregateError, Result};
use crate::fantasy::FantasyGameweek;
use crate::fixtures::{Fixture, FixtureKey, Season, parse_fixture_list};
use crate::match_info::MatchInfo;
use crate::roster::TeamRoster;
use crate::schema::Schema;
use crate::sheet::StatSheet;

pub trait FixtureStore: Sync {
    fn fixtures(&self, season: Season) -> Result<Vec<Fixture>>;
    fn roster(&self, season: Season) -> Result<TeamRoster>;
    fn team_sheet(&self, fixture: &Fixture, team: &str) -> Result<StatSheet>;
    fn goalkeeper_sheet(&self, fixture: &Fixture, team: &str) -> Result<StatSheet>;
    fn match_info(&self, fixture: &Fixture) -> Result<MatchInfo>;
    fn fantasy_gameweek(&self, season: Season, gameweek: u32) -> Result<FantasyGameweek>;
}

const LEAGUE_DIR: &str = "Premier League";
const FANTASY_DIR: &str = "Fantasy Premier League";

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn schema(&self) -> Result<Schema> {
        let dir = self.root.join(LEAGUE_DIR).join("header information");
        let headers_path = dir.join("headers.json");
        let headers: serde_json::Map<String, Value> = read_json(&headers_path)?;
        let mut groups = Vec::with_capacity(headers.len());
        for (group, columns) in headers {
            groups.push(string_list(&columns).ok_or_else(|| {
                AggregateError::malformed(
                    headers_path.display().to_string(),
                    format!("group {group} is not a list of strings"),
                )
            })?);
        }

        let gk_path = dir.join("gk_headers.json");
        let gk: Value = read_json(&gk_path)?;
        let goalkeeper = gk.get("List").and_then(string_list).ok_or_else(|| {
            AggregateError::malformed(gk_path.display().to_string(), "expected a List array")
        })?;
        Ok(Schema::from_header_groups(groups, goalkeeper))
    }

    /// `None` only when the header files do not exist.
    pub fn header_schema(&self) -> Result<Option<Schema>> {
        match self.schema() {
            Ok(schema) => Ok(Some(schema)),
            Err(AggregateError::MissingArtifact { source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// `reports/<season>/gw<N>/<home> v <away>`
    fn report_dir(&self, fixture: &Fixture) -> PathBuf {
        self.root
            .join(LEAGUE_DIR)
            .join("reports")
            .join(fixture.season.long_name())
            .join(format!("gw{}", fixture.gameweek))
            .join(fixture.report_name())
    }
}

impl FixtureStore for FsStore {
    fn fixtures(&self, season: Season) -> Result<Vec<Fixture>> {
        let path = self
            .root
            .join(LEAGUE_DIR)
            .join("scores and fixtures")
            .join(format!("{} PL Scores & Fixtures.csv", season.long_name()));
        let file = open(&path)?;
        parse_fixture_list(season, file, &path.display().to_string())
    }

    fn roster(&self, season: Season) -> Result<TeamRoster> {
        let path = self
            .root
            .join(LEAGUE_DIR)
            .join("player information")
            .join(format!("{} player_info.json", season.long_name()));
        read_json(&path)
    }

    fn team_sheet(&self, fixture: &Fixture, team: &str) -> Result<StatSheet> {
        let path = self.report_dir(fixture).join(format!("{team} stats.csv"));
        StatSheet::from_csv(open(&path)?, &path.display().to_string())
    }

    fn goalkeeper_sheet(&self, fixture: &Fixture, team: &str) -> Result<StatSheet> {
        let path = self.report_dir(fixture).join(format!("{team} gk_stats.csv"));
        StatSheet::from_csv(open(&path)?, &path.display().to_string())
    }

    fn match_info(&self, fixture: &Fixture) -> Result<MatchInfo> {
        let path = self.report_dir(fixture).join("match_info.json");
        let raw = read_to_string(&path)?;
        MatchInfo::from_json(&raw, &path.display().to_string())
    }

    fn fantasy_gameweek(&self, season: Season, gameweek: u32) -> Result<FantasyGameweek> {
        let path = self
            .root
            .join(FANTASY_DIR)
            .join(format!("{} gws", season.short_name()))
            .join(format!("gw{gameweek}.csv"));
        let mut gw = FantasyGameweek::from_csv(gameweek, open(&path)?, &path.display().to_string())?;
        gw.rename(|name| fantasy_name(season, name));
        Ok(gw)
    }
}

/// Aligns a fantasy export name with the roster's spelling. From 2018/19 the
/// exports append an id (`First_Last_123`); earlier ones only use underscores.
pub fn fantasy_name(season: Season, raw: &str) -> String {
    if season.start() >= 18 {
        let parts: Vec<&str> = raw.split('_').collect();
        if parts.len() > 1 {
            format!("{} {}", parts[0], parts[1])
        } else {
            parts[0].to_string()
        }
    } else {
        raw.replace('_', " ")
    }
}

fn open(path: &Path) -> Result<File> {
    debug!(path = %path.display(), "open artifact");
    File::open(path).map_err(|source| AggregateError::MissingArtifact {
        path: path.to_path_buf(),
        source,
    })
}

fn read_to_string(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "read artifact");
    fs::read_to_string(path).map_err(|source| AggregateError::MissingArtifact {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<D: serde::de::DeserializeOwned>(path: &Path) -> Result<D> {
    let raw = read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|err| AggregateError::malformed(path.display().to_string(), err))
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    fixtures: BTreeMap<Season, Vec<Fixture>>,
    rosters: BTreeMap<Season, TeamRoster>,
    sheets: BTreeMap<(FixtureKey, String), StatSheet>,
    gk_sheets: BTreeMap<(FixtureKey, String), StatSheet>,
    infos: BTreeMap<FixtureKey, MatchInfo>,
    fantasy: BTreeMap<(Season, u32), FantasyGameweek>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_season(&mut self, season: Season, fixtures: Vec<Fixture>, roster: TeamRoster) {
        self.fixtures.insert(season, fixtures);
        self.rosters.insert(season, roster);
    }

    pub fn insert_team_sheets(
        &mut self,
        fixture: &Fixture,
        team: &str,
        sheet: StatSheet,
        gk_sheet: StatSheet,
    ) {
        let key = (fixture.key(), team.to_string());
        self.sheets.insert(key.clone(), sheet);
        self.gk_sheets.insert(key, gk_sheet);
    }

    pub fn insert_match_info(&mut self, fixture: &Fixture, info: MatchInfo) {
        self.infos.insert(fixture.key(), info);
    }

    pub fn insert_fantasy(&mut self, season: Season, gameweek: FantasyGameweek) {
        self.fantasy.insert((season, gameweek.gameweek), gameweek);
    }
}

fn not_found(what: String) -> AggregateError {
    AggregateError::MissingArtifact {
        path: PathBuf::from(format!("memory://{what}")),
        source: io::Error::new(io::ErrorKind::NotFound, "not in memory store"),
    }
}

impl FixtureStore for MemoryStore {
    fn fixtures(&self, season: Season) -> Result<Vec<Fixture>> {
        self.fixtures
            .get(&season)
            .cloned()
            .ok_or_else(|| not_found(format!("{}/fixtures", season.long_name())))
    }

    fn roster(&self, season: Season) -> Result<TeamRoster> {
        self.rosters
            .get(&season)
            .cloned()
            .ok_or_else(|| not_found(format!("{}/roster", season.long_name())))
    }

    fn team_sheet(&self, fixture: &Fixture, team: &str) -> Result<StatSheet> {
        let key = (fixture.key(), team.to_string());
        self.sheets
            .get(&key)
            .cloned()
            .ok_or_else(|| not_found(format!("{}/{team} stats", key.0)))
    }

    fn goalkeeper_sheet(&self, fixture: &Fixture, team: &str) -> Result<StatSheet> {
        let key = (fixture.key(), team.to_string());
        self.gk_sheets
            .get(&key)
            .cloned()
            .ok_or_else(|| not_found(format!("{}/{team} gk_stats", key.0)))
    }

    fn match_info(&self, fixture: &Fixture) -> Result<MatchInfo> {
        let key = fixture.key();
        self.infos
            .get(&key)
            .cloned()
            .ok_or_else(|| not_found(format!("{key}/match_info")))
    }

    fn fantasy_gameweek(&self, season: Season, gameweek: u32) -> Result<FantasyGameweek> {
        self.fantasy
            .get(&(season, gameweek))
            .cloned()
            .ok_or_else(|| not_found(format!("{}/gw{gameweek}", season.short_name())))
    }
}
