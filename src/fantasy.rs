use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{AggregateError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FantasyRecord {
    pub name: String,
    #[serde(default)]
    pub influence: f64,
    #[serde(default)]
    pub creativity: f64,
    #[serde(default)]
    pub threat: f64,
    #[serde(default)]
    pub ict_index: f64,
    #[serde(default)]
    pub bonus: f64,
    #[serde(default)]
    pub bps: f64,
    #[serde(default)]
    pub total_points: f64,
    #[serde(default)]
    pub transfers_in: f64,
    #[serde(default)]
    pub transfers_out: f64,
    #[serde(default)]
    pub transfers_balance: f64,
    #[serde(default)]
    pub value: f64,
}

impl FantasyRecord {
    pub fn field(&self, column: &str) -> Option<f64> {
        let v = match column {
            "influence" => self.influence,
            "creativity" => self.creativity,
            "threat" => self.threat,
            "ict_index" => self.ict_index,
            "bonus" => self.bonus,
            "bps" => self.bps,
            "total_points" => self.total_points,
            "transfers_in" => self.transfers_in,
            "transfers_out" => self.transfers_out,
            "transfers_balance" => self.transfers_balance,
            "value" => self.value,
            _ => return None,
        };
        Some(v)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FantasyGameweek {
    pub gameweek: u32,
    pub records: Vec<FantasyRecord>,
}

impl FantasyGameweek {
    /// Reads a gameweek export; bytes that are not UTF-8 are taken as Latin-1.
    pub fn from_csv<R: Read>(gameweek: u32, mut rdr: R, artifact: &str) -> Result<Self> {
        let mut bytes = Vec::new();
        rdr.read_to_end(&mut bytes)
            .map_err(|err| AggregateError::malformed(artifact, err))?;
        let text = decode_latin1(bytes);
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let mut records = Vec::new();
        for record in reader.deserialize::<FantasyRecord>() {
            records.push(record.map_err(|err| AggregateError::malformed(artifact, err))?);
        }
        Ok(Self { gameweek, records })
    }

    pub fn rename(&mut self, normalize: impl Fn(&str) -> String) {
        for record in &mut self.records {
            record.name = normalize(&record.name);
        }
    }

    pub fn lookup(&self, player: &str) -> Option<&FantasyRecord> {
        let mut hits = self.records.iter().filter(|r| r.name == player);
        let first = hits.next()?;
        if hits.next().is_some() {
            return None;
        }
        Some(first)
    }
}

fn decode_latin1(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}
