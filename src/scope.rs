use chrono::NaiveDate;

use crate::error::{AggregateError, Result};
use crate::fixtures::Fixture;
use crate::roster::TeamRoster;

pub const VALID_OPTIONS: [&str; 6] = [
    "home",
    "away",
    "team",
    "date_range",
    "match_range",
    "gameweek_range",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    /// Fixtures strictly before the date.
    Before(NaiveDate),
    /// `start <= date < end`.
    Between { start: NaiveDate, end: NaiveDate },
}

impl DateRange {
    pub fn new(dates: &[NaiveDate]) -> Result<Self> {
        match *dates {
            [date] => Ok(DateRange::Before(date)),
            [start, end] if start < end => Ok(DateRange::Between { start, end }),
            [start, end] => Err(AggregateError::range(
                "date_range",
                format!("end {end} is not after start {start}"),
            )),
            _ => Err(AggregateError::range(
                "date_range",
                format!("expected one or two dates, got {}", dates.len()),
            )),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            DateRange::Before(limit) => date < limit,
            DateRange::Between { start, end } => start <= date && date < end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRange {
    First(usize),
    Slice { start: usize, end: usize },
}

impl MatchRange {
    pub fn new(bounds: &[usize]) -> Result<Self> {
        match *bounds {
            [0] => Err(AggregateError::range("match_range", "match count must be positive")),
            [n] => Ok(MatchRange::First(n)),
            [start, end] if start < end => Ok(MatchRange::Slice { start, end }),
            [start, end] => Err(AggregateError::range(
                "match_range",
                format!("end {end} is not after start {start}"),
            )),
            _ => Err(AggregateError::range(
                "match_range",
                format!("expected one or two bounds, got {}", bounds.len()),
            )),
        }
    }

    fn bounds(&self) -> (usize, usize) {
        match *self {
            MatchRange::First(n) => (0, n),
            MatchRange::Slice { start, end } => (start, end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameweekRange {
    Single(u32),
    /// `start <= gameweek < end`.
    Span { start: u32, end: u32 },
}

impl GameweekRange {
    pub fn new(bounds: &[u32]) -> Result<Self> {
        match *bounds {
            [gw] => Ok(GameweekRange::Single(gw)),
            [start, end] if start < end => Ok(GameweekRange::Span { start, end }),
            [start, end] => Err(AggregateError::range(
                "gameweek_range",
                format!("end {end} is not after start {start}"),
            )),
            _ => Err(AggregateError::range(
                "gameweek_range",
                format!("expected one or two gameweeks, got {}", bounds.len()),
            )),
        }
    }

    pub fn contains(&self, gameweek: u32) -> bool {
        match *self {
            GameweekRange::Single(gw) => gameweek == gw,
            GameweekRange::Span { start, end } => start <= gameweek && gameweek < end,
        }
    }

    pub fn end(&self) -> u32 {
        match *self {
            GameweekRange::Single(gw) => gw.saturating_add(1),
            GameweekRange::Span { end, .. } => end,
        }
    }

    pub fn following(&self, width: u32) -> GameweekRange {
        let start = self.end();
        if width <= 1 {
            GameweekRange::Single(start)
        } else {
            GameweekRange::Span {
                start,
                end: start.saturating_add(width),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
    Home(Vec<String>),
    Away(Vec<String>),
    Team(Vec<String>),
    DateRange(DateRange),
    MatchRange(MatchRange),
    GameweekRange(GameweekRange),
}

impl ScopeFilter {
    pub fn from_option(key: &str, values: &[&str]) -> Result<Self> {
        let teams = || values.iter().map(|v| v.trim().to_string()).collect::<Vec<_>>();
        match key {
            "home" => Ok(ScopeFilter::Home(teams())),
            "away" => Ok(ScopeFilter::Away(teams())),
            "team" => Ok(ScopeFilter::Team(teams())),
            "date_range" => {
                let dates = values
                    .iter()
                    .map(|v| {
                        NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|err| {
                            AggregateError::range("date_range", format!("{v:?}: {err}"))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(ScopeFilter::DateRange(DateRange::new(&dates)?))
            }
            "match_range" => Ok(ScopeFilter::MatchRange(MatchRange::new(&parse_numbers(
                "match_range",
                values,
            )?)?)),
            "gameweek_range" => Ok(ScopeFilter::GameweekRange(GameweekRange::new(
                &parse_numbers("gameweek_range", values)?,
            )?)),
            other => Err(AggregateError::InvalidOption {
                key: other.to_string(),
            }),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ScopeFilter::Home(_) => "home",
            ScopeFilter::Away(_) => "away",
            ScopeFilter::Team(_) => "team",
            ScopeFilter::DateRange(_) => "date_range",
            ScopeFilter::MatchRange(_) => "match_range",
            ScopeFilter::GameweekRange(_) => "gameweek_range",
        }
    }

    fn teams(&self) -> &[String] {
        match self {
            ScopeFilter::Home(t) | ScopeFilter::Away(t) | ScopeFilter::Team(t) => t,
            _ => &[],
        }
    }

    fn keep(&self, fixture: &Fixture) -> bool {
        match self {
            ScopeFilter::Home(teams) => teams.contains(&fixture.home),
            ScopeFilter::Away(teams) => teams.contains(&fixture.away),
            ScopeFilter::Team(teams) => teams.iter().any(|t| fixture.involves(t)),
            ScopeFilter::DateRange(range) => range.contains(fixture.date),
            ScopeFilter::GameweekRange(range) => range.contains(fixture.gameweek),
            ScopeFilter::MatchRange(_) => true,
        }
    }
}

fn parse_numbers<T: std::str::FromStr>(option: &'static str, values: &[&str]) -> Result<Vec<T>> {
    values
        .iter()
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|_| AggregateError::range(option, format!("{v:?} is not a whole number")))
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    filters: Vec<ScopeFilter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScope {
    pub fixtures: Vec<Fixture>,
    pub teams: Vec<String>,
}

impl Scope {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: ScopeFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn gameweeks(range: GameweekRange) -> Self {
        Self::all().with(ScopeFilter::GameweekRange(range))
    }

    pub fn filters(&self) -> &[ScopeFilter] {
        &self.filters
    }

    pub fn resolve(&self, roster: &TeamRoster, fixtures: &[Fixture]) -> Result<ResolvedScope> {
        let mut teams: Vec<String> = Vec::new();
        for filter in &self.filters {
            for team in filter.teams() {
                if !roster.contains(team) {
                    return Err(AggregateError::InvalidTeam {
                        team: team.clone(),
                        valid: roster.team_names(),
                    });
                }
                if !teams.contains(team) {
                    teams.push(team.clone());
                }
            }
        }
        if teams.is_empty() {
            teams = roster.team_names();
        }

        let mut selected: Vec<Fixture> = fixtures.to_vec();
        if selected.is_empty() {
            return Err(AggregateError::EmptyResult {
                option: "played fixtures",
            });
        }
        for filter in &self.filters {
            match filter {
                ScopeFilter::MatchRange(range) => {
                    let (start, end) = range.bounds();
                    if end > selected.len() {
                        return Err(AggregateError::range(
                            "match_range",
                            format!("{end} exceeds the {} fixtures available", selected.len()),
                        ));
                    }
                    selected = selected[start..end].to_vec();
                }
                other => selected.retain(|f| other.keep(f)),
            }
            if selected.is_empty() {
                return Err(AggregateError::EmptyResult {
                    option: filter.key(),
                });
            }
        }
        Ok(ResolvedScope {
            fixtures: selected,
            teams,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Score, Season};
    use crate::roster::Squad;

    fn fixture(gw: u32, day: u32, home: &str, away: &str) -> Fixture {
        Fixture {
            season: Season::new(17),
            gameweek: gw,
            date: NaiveDate::from_ymd_opt(2017, 8, day).unwrap(),
            home: home.to_string(),
            away: away.to_string(),
            score: Score { home: 1, away: 0 },
            report_link: None,
        }
    }

    fn season() -> (TeamRoster, Vec<Fixture>) {
        let mut roster = TeamRoster::default();
        for team in ["Arsenal", "Chelsea", "Everton"] {
            roster.insert(team, Squad::default());
        }
        let fixtures = vec![
            fixture(1, 11, "Arsenal", "Chelsea"),
            fixture(1, 12, "Everton", "Arsenal"),
            fixture(2, 19, "Chelsea", "Everton"),
            fixture(3, 26, "Chelsea", "Arsenal"),
        ];
        (roster, fixtures)
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = ScopeFilter::from_option("venue", &["x"]).unwrap_err();
        assert!(matches!(err, AggregateError::InvalidOption { .. }));
    }

    #[test]
    fn ranges_validate_arity_and_order() {
        assert!(matches!(
            ScopeFilter::from_option("gameweek_range", &["1", "2", "3"]),
            Err(AggregateError::InvalidRange { .. })
        ));
        assert!(GameweekRange::new(&[5, 5]).is_err());
        assert!(MatchRange::new(&[]).is_err());
        assert!(ScopeFilter::from_option("date_range", &["2017-13-01"]).is_err());
    }

    #[test]
    fn team_filter_is_home_or_away() {
        let (roster, fixtures) = season();
        let scope = Scope::all().with(ScopeFilter::Team(vec!["Everton".into()]));
        let resolved = scope.resolve(&roster, &fixtures).unwrap();
        assert_eq!(resolved.fixtures.len(), 2);
        assert_eq!(resolved.teams, vec!["Everton"]);
    }

    #[test]
    fn filters_compose_with_and() {
        let (roster, fixtures) = season();
        let scope = Scope::all()
            .with(ScopeFilter::Home(vec!["Chelsea".into()]))
            .with(ScopeFilter::GameweekRange(GameweekRange::new(&[1, 3]).unwrap()));
        let resolved = scope.resolve(&roster, &fixtures).unwrap();
        assert_eq!(resolved.fixtures.len(), 1);
        assert_eq!(resolved.fixtures[0].away, "Everton");
    }

    #[test]
    fn match_range_slices_positions() {
        let (roster, fixtures) = season();
        let first = Scope::all().with(ScopeFilter::MatchRange(MatchRange::First(2)));
        assert_eq!(first.resolve(&roster, &fixtures).unwrap().fixtures.len(), 2);

        let slice = Scope::all().with(ScopeFilter::MatchRange(MatchRange::new(&[1, 3]).unwrap()));
        let resolved = slice.resolve(&roster, &fixtures).unwrap();
        assert_eq!(resolved.fixtures[0].home, "Everton");
        assert_eq!(resolved.fixtures.len(), 2);
        assert_eq!(resolved.teams.len(), 3);

        let too_far = Scope::all().with(ScopeFilter::MatchRange(MatchRange::First(9)));
        assert!(matches!(
            too_far.resolve(&roster, &fixtures),
            Err(AggregateError::InvalidRange { .. })
        ));
    }

    #[test]
    fn invalid_team_and_empty_result() {
        let (roster, fixtures) = season();
        let bad = Scope::all().with(ScopeFilter::Away(vec!["Leeds".into()]));
        assert!(matches!(
            bad.resolve(&roster, &fixtures),
            Err(AggregateError::InvalidTeam { .. })
        ));

        let empty = Scope::gameweeks(GameweekRange::Single(30));
        assert!(matches!(
            empty.resolve(&roster, &fixtures),
            Err(AggregateError::EmptyResult {
                option: "gameweek_range"
            })
        ));
    }

    #[test]
    fn date_ranges() {
        let (roster, fixtures) = season();
        let before = ScopeFilter::from_option("date_range", &["2017-08-19"]).unwrap();
        let resolved = Scope::all().with(before).resolve(&roster, &fixtures).unwrap();
        assert_eq!(resolved.fixtures.len(), 2);

        let between = ScopeFilter::from_option("date_range", &["2017-08-12", "2017-08-26"]).unwrap();
        let resolved = Scope::all().with(between).resolve(&roster, &fixtures).unwrap();
        assert_eq!(resolved.fixtures.len(), 2);
    }

    #[test]
    fn following_window() {
        let x = GameweekRange::new(&[1, 10]).unwrap();
        assert_eq!(x.following(1), GameweekRange::Single(10));
        assert_eq!(x.following(3), GameweekRange::Span { start: 10, end: 13 });
        assert_eq!(GameweekRange::Single(u32::MAX).end(), u32::MAX);
        assert_eq!(
            GameweekRange::Span { start: 1, end: u32::MAX - 1 }.following(5),
            GameweekRange::Span { start: u32::MAX - 1, end: u32::MAX }
        );
    }
}
