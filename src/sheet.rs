use std::collections::HashMap;
use std::io::Read;

use crate::error::{AggregateError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatSheet {
    artifact: String,
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl StatSheet {
    pub fn from_csv<R: Read>(rdr: R, artifact: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(false).from_reader(rdr);
        let columns = reader
            .headers()
            .map_err(|err| AggregateError::malformed(artifact, err))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<_>>();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| AggregateError::malformed(artifact, err))?;
            rows.push(record.iter().map(|v| v.to_string()).collect());
        }
        let sheet = Self::from_rows(artifact, columns, rows)?;
        if !sheet.index.contains_key("player") {
            return Err(AggregateError::malformed(artifact, "no player column"));
        }
        Ok(sheet)
    }

    /// Every row must be as wide as the header.
    pub fn from_rows(artifact: &str, columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some(line) = rows.iter().position(|r| r.len() != columns.len()) {
            return Err(AggregateError::malformed(
                artifact,
                format!(
                    "row {} has {} cells, header has {}",
                    line + 1,
                    rows[line].len(),
                    columns.len()
                ),
            ));
        }
        let index = columns
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        Ok(Self {
            artifact: artifact.to_string(),
            columns,
            index,
            rows,
        })
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn require_columns<'a>(&self, columns: impl IntoIterator<Item = &'a str>) -> Result<()> {
        for column in columns {
            if !self.index.contains_key(column) {
                return Err(AggregateError::malformed(
                    &self.artifact,
                    format!("missing column {column}"),
                ));
            }
        }
        Ok(())
    }

    pub fn players(&self) -> Vec<&str> {
        let Some(col) = self.index.get("player").copied() else {
            return Vec::new();
        };
        let mut names: Vec<&str> = self.rows.iter().filter_map(|r| r.get(col)).map(|s| s.trim()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn row(&self, player: &str) -> Option<SheetRow<'_>> {
        let col = self.index.get("player").copied()?;
        let idx = self
            .rows
            .iter()
            .position(|r| r.get(col).is_some_and(|s| s.trim() == player))?;
        Some(SheetRow { sheet: self, idx })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SheetRow<'a> {
    sheet: &'a StatSheet,
    idx: usize,
}

impl<'a> SheetRow<'a> {
    pub fn text(&self, column: &str) -> Option<&'a str> {
        let col = self.sheet.index.get(column).copied()?;
        self.sheet.rows[self.idx].get(col).map(|s| s.trim())
    }

    /// Numeric cell; blank counts as 0, thousands separators are ignored.
    pub fn number(&self, column: &str) -> Result<f64> {
        let raw = self.text(column).ok_or_else(|| {
            AggregateError::malformed(&self.sheet.artifact, format!("missing column {column}"))
        })?;
        parse_number(raw).ok_or_else(|| {
            AggregateError::malformed(
                &self.sheet.artifact,
                format!("column {column}: not a number {raw:?}"),
            )
        })
    }
}

pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().trim_end_matches('%').chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Some(0.0);
    }
    cleaned.parse::<f64>().ok()
}
