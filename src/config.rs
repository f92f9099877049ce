use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};

use crate::dataset::{DatasetOptions, TeamPositionOrder};
use crate::fixtures::Season;
use crate::metrics::DEFAULT_VALUE_CHANGE_LIMIT;
use crate::scope::GameweekRange;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT: &str = "datasets/X_.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    pub data_dir: PathBuf,
    pub output: PathBuf,
    pub options: DatasetOptions,
}

impl BuildConfig {
    pub fn from_env() -> Self {
        let defaults = DatasetOptions::default();
        let seasons = opt_env("PL_SEASONS")
            .and_then(|raw| parse_seasons(&raw).ok())
            .unwrap_or(defaults.seasons);
        let gameweeks = opt_env("PL_GAMEWEEK_WINDOW")
            .and_then(|raw| parse_gameweeks(&raw).ok())
            .unwrap_or(defaults.gameweeks);
        let minutes_threshold = opt_env("PL_MINUTES_THRESHOLD")
            .and_then(|val| val.trim().parse::<f64>().ok())
            .unwrap_or(0.0)
            .max(0.0);
        let label_window = opt_env("PL_LABEL_WINDOW")
            .and_then(|val| val.trim().parse::<u32>().ok())
            .unwrap_or(1)
            .clamp(1, 38);
        let value_change_limit = opt_env("PL_VALUE_CHANGE_LIMIT")
            .and_then(|val| val.trim().parse::<f64>().ok())
            .unwrap_or(DEFAULT_VALUE_CHANGE_LIMIT)
            .abs();
        let team_position_order = opt_env("PL_TEAM_POSITION_ORDER")
            .and_then(|val| TeamPositionOrder::parse(&val))
            .unwrap_or_default();
        let parallel = opt_env("PL_PARALLEL_SEASONS")
            .map(|val| !matches!(val.trim().to_ascii_lowercase().as_str(), "0" | "false" | "off" | "no"))
            .unwrap_or(true);

        Self {
            data_dir: opt_env("PL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            output: opt_env("PL_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            options: DatasetOptions {
                seasons,
                gameweeks,
                minutes_threshold,
                label_window,
                value_change_limit,
                team_position_order,
                parallel,
            },
        }
    }

    /// Command-line flags override the environment. Unlike the environment,
    /// a malformed flag is an error.
    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        if let Some(dir) = flag_value(args, "data-dir") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(out) = flag_value(args, "output") {
            self.output = PathBuf::from(out);
        }
        if let Some(raw) = flag_value(args, "seasons") {
            self.options.seasons = parse_seasons(&raw)?;
        }
        if let Some(raw) = flag_value(args, "gameweeks") {
            self.options.gameweeks = parse_gameweeks(&raw)?;
        }
        if let Some(raw) = flag_value(args, "threshold") {
            let threshold = raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("--threshold expects minutes, got {raw:?}"))?;
            if !threshold.is_finite() || threshold < 0.0 {
                bail!("--threshold must be a non-negative number of minutes, got {raw:?}");
            }
            self.options.minutes_threshold = threshold;
        }
        if let Some(raw) = flag_value(args, "label-window") {
            let window = raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("--label-window expects gameweeks, got {raw:?}"))?;
            if window == 0 {
                bail!("--label-window must be at least 1");
            }
            self.options.label_window = window;
        }
        if args.iter().any(|a| a == "--sequential") {
            self.options.parallel = false;
        }
        Ok(())
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|val| {
        if val.trim().is_empty() {
            None
        } else {
            Some(val)
        }
    })
}

/// Value of `--name=value` or `--name value`; the last occurrence wins.
pub fn flag_value(args: &[String], name: &str) -> Option<String> {
    let long = format!("--{name}");
    let prefix = format!("--{name}=");
    let mut found = None;
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                found = Some(trimmed.to_string());
            }
        } else if *arg == long {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                found = Some(next.trim().to_string());
            }
        }
    }
    found
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_seasons(raw: &str) -> Result<Vec<Season>> {
    let seasons = split_list(raw)
        .iter()
        .map(|s| Season::parse(s).ok_or_else(|| anyhow!("invalid season {s:?}")))
        .collect::<Result<Vec<_>>>()?;
    if seasons.is_empty() {
        bail!("no seasons given");
    }
    Ok(seasons)
}

pub fn parse_gameweeks(raw: &str) -> Result<GameweekRange> {
    let bounds = raw
        .split([',', '-', ':'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>().with_context(|| format!("invalid gameweek {s:?}")))
        .collect::<Result<Vec<_>>>()?;
    Ok(GameweekRange::new(&bounds)?)
}
