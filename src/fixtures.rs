use std::fmt;
use std::io::Read;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{AggregateError, Result};

/// A season named by its starting year's last two digits (17 = 2017/18).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Season(u16);

impl Season {
    pub fn new(start: u16) -> Self {
        Season(start % 100)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let first = raw
            .trim()
            .split(|ch: char| !ch.is_ascii_digit())
            .find(|s| !s.is_empty())?;
        let year = first.parse::<u16>().ok()?;
        match first.len() {
            2 => Some(Season(year)),
            4 if year >= 2000 => Some(Season(year - 2000)),
            _ => None,
        }
    }

    pub fn start(self) -> u16 {
        self.0
    }

    pub fn long_name(self) -> String {
        format!("20{:02}-20{:02}", self.0, self.0 + 1)
    }

    pub fn short_name(self) -> String {
        format!("20{:02}-{:02}", self.0, self.0 + 1)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.0, self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::Home => 0,
            Side::Away => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut nums = raw
            .split(|ch: char| !ch.is_ascii_digit())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<u32>().ok());
        let home = nums.next()?;
        let away = nums.next()?;
        if nums.next().is_some() {
            return None;
        }
        Some(Score { home, away })
    }

    pub fn for_side(self, side: Side) -> (u32, u32) {
        match side {
            Side::Home => (self.home, self.away),
            Side::Away => (self.away, self.home),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.home, self.away)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub season: Season,
    pub gameweek: u32,
    pub date: NaiveDate,
    pub home: String,
    pub away: String,
    pub score: Score,
    pub report_link: Option<String>,
}

impl Fixture {
    pub fn involves(&self, team: &str) -> bool {
        self.home == team || self.away == team
    }

    pub fn team(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn report_name(&self) -> String {
        format!("{} v {}", self.home, self.away)
    }

    pub fn key(&self) -> FixtureKey {
        FixtureKey {
            season: self.season,
            gameweek: self.gameweek,
            home: self.home.clone(),
            away: self.away.clone(),
        }
    }
}

/// Identifies one fixture of a season. The same pairing can recur, so the
/// gameweek is part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixtureKey {
    pub season: Season,
    pub gameweek: u32,
    pub home: String,
    pub away: String,
}

impl fmt::Display for FixtureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/gw{}/{} v {}", self.season.long_name(), self.gameweek, self.home, self.away)
    }
}

#[derive(Debug, Deserialize)]
struct FixtureRecord {
    gameweek: String,
    #[serde(default)]
    date: String,
    squad_a: String,
    #[serde(default)]
    score: String,
    squad_b: String,
    #[serde(default)]
    match_report: Option<String>,
}

/// Reads a season's fixture list and keeps only played fixtures, stably
/// ordered by date.
pub fn parse_fixture_list<R: Read>(season: Season, rdr: R, artifact: &str) -> Result<Vec<Fixture>> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut out = Vec::new();
    for (line, record) in reader.deserialize::<FixtureRecord>().enumerate() {
        let record = record.map_err(|err| AggregateError::malformed(artifact, err))?;
        if record.score.trim().is_empty() || record.date.trim().is_empty() {
            continue;
        }
        let gameweek = parse_gameweek(&record.gameweek).ok_or_else(|| {
            AggregateError::malformed(artifact, format!("row {line}: bad gameweek {:?}", record.gameweek))
        })?;
        let date = NaiveDate::parse_from_str(record.date.trim(), "%Y-%m-%d").map_err(|err| {
            AggregateError::malformed(artifact, format!("row {line}: bad date {:?}: {err}", record.date))
        })?;
        let score = Score::parse(&record.score).ok_or_else(|| {
            AggregateError::malformed(artifact, format!("row {line}: bad score {:?}", record.score))
        })?;
        out.push(Fixture {
            season,
            gameweek,
            date,
            home: record.squad_a.trim().to_string(),
            away: record.squad_b.trim().to_string(),
            score,
            report_link: record
                .match_report
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        });
    }
    out.sort_by_key(|f| f.date);
    Ok(out)
}

fn parse_gameweek(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if let Ok(gw) = trimmed.parse::<u32>() {
        return Some(gw);
    }
    let float = trimmed.parse::<f64>().ok()?;
    (float.fract() == 0.0 && float >= 0.0).then_some(float as u32)
}
